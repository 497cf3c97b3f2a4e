//! Port for kanban task persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{KanbanTask, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by kanban repository adapters.
    pub enum KanbanRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "kanban repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "kanban repository query failed: {message}",
    }
}

/// Port for reading and writing a user's board.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KanbanRepository: Send + Sync {
    /// List a user's tasks ordered by column, position, then creation time.
    async fn list_for_user(&self, user_id: &UserId)
    -> Result<Vec<KanbanTask>, KanbanRepositoryError>;

    /// Find one task by id.
    async fn find_by_id(
        &self,
        task_id: &Uuid,
    ) -> Result<Option<KanbanTask>, KanbanRepositoryError>;

    /// Persist a new task.
    async fn insert(&self, task: &KanbanTask) -> Result<(), KanbanRepositoryError>;

    /// Replace a stored task with its mutated state.
    async fn update(&self, task: &KanbanTask) -> Result<(), KanbanRepositoryError>;

    /// Delete a task, reporting whether a row was removed.
    async fn delete(&self, task_id: &Uuid) -> Result<bool, KanbanRepositoryError>;
}

/// Fixture implementation for tests that do not exercise board persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureKanbanRepository;

#[async_trait]
impl KanbanRepository for FixtureKanbanRepository {
    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<KanbanTask>, KanbanRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _task_id: &Uuid,
    ) -> Result<Option<KanbanTask>, KanbanRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _task: &KanbanTask) -> Result<(), KanbanRepositoryError> {
        Ok(())
    }

    async fn update(&self, _task: &KanbanTask) -> Result<(), KanbanRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _task_id: &Uuid) -> Result<bool, KanbanRepositoryError> {
        Ok(false)
    }
}
