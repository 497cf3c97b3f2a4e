//! PostgreSQL-backed `KanbanRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{KanbanRepository, KanbanRepositoryError};
use crate::domain::{Column, KanbanTask, UserId};

use super::error_mapping;
use super::models::{KanbanTaskRow, KanbanTaskUpdate, NewKanbanTaskRow};
use super::pool::{DbPool, PoolError};
use super::schema::kanban_tasks;

/// Diesel-backed implementation of the kanban repository port.
#[derive(Clone)]
pub struct DieselKanbanRepository {
    pool: DbPool,
}

impl DieselKanbanRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> KanbanRepositoryError {
    error_mapping::map_pool_error(error, KanbanRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> KanbanRepositoryError {
    error_mapping::map_diesel_error(
        error,
        KanbanRepositoryError::query,
        KanbanRepositoryError::connection,
    )
}

fn row_to_task(row: KanbanTaskRow) -> Result<KanbanTask, KanbanRepositoryError> {
    let column: Column = row.board_column.parse().map_err(|_| {
        KanbanRepositoryError::query(format!("unknown column: {}", row.board_column))
    })?;
    Ok(KanbanTask::from_stored(
        row.id,
        UserId::from_uuid(row.owner_id),
        row.title,
        row.description,
        column,
        row.position,
        row.created_at,
        row.updated_at,
    ))
}

#[async_trait]
impl KanbanRepository for DieselKanbanRepository {
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<KanbanTask>, KanbanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<KanbanTaskRow> = kanban_tasks::table
            .filter(kanban_tasks::owner_id.eq(user_id.as_uuid()))
            .order((
                kanban_tasks::board_column.asc(),
                kanban_tasks::position.asc(),
                kanban_tasks::created_at.asc(),
            ))
            .select(KanbanTaskRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_task).collect()
    }

    async fn find_by_id(
        &self,
        task_id: &Uuid,
    ) -> Result<Option<KanbanTask>, KanbanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = kanban_tasks::table
            .filter(kanban_tasks::id.eq(task_id))
            .select(KanbanTaskRow::as_select())
            .first::<KanbanTaskRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_task).transpose()
    }

    async fn insert(&self, task: &KanbanTask) -> Result<(), KanbanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewKanbanTaskRow {
            id: task.id(),
            owner_id: *task.owner_id().as_uuid(),
            title: task.title(),
            description: task.description(),
            board_column: task.column().as_str(),
            position: task.position(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        };

        diesel::insert_into(kanban_tasks::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, task: &KanbanTask) -> Result<(), KanbanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = KanbanTaskUpdate {
            title: task.title(),
            description: task.description(),
            board_column: task.column().as_str(),
            position: task.position(),
            updated_at: task.updated_at(),
        };

        diesel::update(kanban_tasks::table.filter(kanban_tasks::id.eq(task.id())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, task_id: &Uuid) -> Result<bool, KanbanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(kanban_tasks::table.filter(kanban_tasks::id.eq(task_id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }
}
