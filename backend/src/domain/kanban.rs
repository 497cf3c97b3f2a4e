//! Personal kanban board tasks.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Maximum accepted task title length in characters.
pub const TASK_TITLE_MAX: usize = 120;

/// Board column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Todo,
    InProgress,
    Done,
}

impl Column {
    /// Stable string form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl FromStr for Column {
    type Err = KanbanValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(KanbanValidationError::UnknownColumn),
        }
    }
}

/// Validation errors for kanban tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KanbanValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    UnknownColumn,
    NegativePosition,
}

impl fmt::Display for KanbanValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::TitleTooLong { max } => {
                write!(f, "task title must be at most {max} characters")
            }
            Self::UnknownColumn => write!(f, "column must be todo, in_progress, or done"),
            Self::NegativePosition => write!(f, "position must not be negative"),
        }
    }
}

impl std::error::Error for KanbanValidationError {}

/// Task card on a user's board.
///
/// `position` orders cards within a column; ties are broken by creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct KanbanTask {
    id: Uuid,
    owner_id: UserId,
    title: String,
    description: Option<String>,
    column: Column,
    position: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl KanbanTask {
    /// Validate and create a new task in [`Column::Todo`].
    pub fn create(
        owner_id: UserId,
        title: impl Into<String>,
        description: Option<String>,
        position: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, KanbanValidationError> {
        let title = Self::validate_title(title.into())?;
        if position < 0 {
            return Err(KanbanValidationError::NegativePosition);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            description,
            column: Column::Todo,
            position,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a stored task.
    #[allow(clippy::too_many_arguments, reason = "flat row constructor")]
    pub fn from_stored(
        id: Uuid,
        owner_id: UserId,
        title: String,
        description: Option<String>,
        column: Column,
        position: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            title,
            description,
            column,
            position,
            created_at,
            updated_at,
        }
    }

    fn validate_title(title: String) -> Result<String, KanbanValidationError> {
        if title.trim().is_empty() {
            return Err(KanbanValidationError::EmptyTitle);
        }
        if title.chars().count() > TASK_TITLE_MAX {
            return Err(KanbanValidationError::TitleTooLong {
                max: TASK_TITLE_MAX,
            });
        }
        Ok(title)
    }

    /// Rename the task.
    pub fn set_title(
        &mut self,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), KanbanValidationError> {
        self.title = Self::validate_title(title.into())?;
        self.updated_at = now;
        Ok(())
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: Option<String>, now: DateTime<Utc>) {
        self.description = description;
        self.updated_at = now;
    }

    /// Move the task to a column at a position.
    pub fn move_to(
        &mut self,
        column: Column,
        position: i32,
        now: DateTime<Utc>,
    ) -> Result<(), KanbanValidationError> {
        if position < 0 {
            return Err(KanbanValidationError::NegativePosition);
        }
        self.column = column;
        self.position = position;
        self.updated_at = now;
        Ok(())
    }

    /// Task identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Board owner.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Card title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Optional free-form description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Current column.
    pub fn column(&self) -> Column {
        self.column
    }

    /// Ordering position within the column.
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case("Write docs", true)]
    #[case("", false)]
    #[case("  ", false)]
    fn create_validates_title(#[case] title: &str, #[case] ok: bool) {
        let result = KanbanTask::create(UserId::random(), title, None, 0, now());
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn create_rejects_overlong_title() {
        let result = KanbanTask::create(
            UserId::random(),
            "x".repeat(TASK_TITLE_MAX + 1),
            None,
            0,
            now(),
        );
        assert_eq!(
            result.map(|_| ()),
            Err(KanbanValidationError::TitleTooLong {
                max: TASK_TITLE_MAX
            })
        );
    }

    #[test]
    fn new_tasks_start_in_todo() {
        let task =
            KanbanTask::create(UserId::random(), "Write docs", None, 0, now()).expect("valid task");
        assert_eq!(task.column(), Column::Todo);
    }

    #[test]
    fn move_to_updates_column_and_position() {
        let mut task =
            KanbanTask::create(UserId::random(), "Write docs", None, 0, now()).expect("valid task");
        task.move_to(Column::InProgress, 3, now()).expect("valid move");
        assert_eq!(task.column(), Column::InProgress);
        assert_eq!(task.position(), 3);
    }

    #[test]
    fn move_to_rejects_negative_position() {
        let mut task =
            KanbanTask::create(UserId::random(), "Write docs", None, 0, now()).expect("valid task");
        assert_eq!(
            task.move_to(Column::Done, -1, now()),
            Err(KanbanValidationError::NegativePosition)
        );
    }

    #[rstest]
    #[case("todo", Ok(Column::Todo))]
    #[case("in_progress", Ok(Column::InProgress))]
    #[case("done", Ok(Column::Done))]
    #[case("archived", Err(KanbanValidationError::UnknownColumn))]
    fn column_parses_stable_strings(
        #[case] raw: &str,
        #[case] expected: Result<Column, KanbanValidationError>,
    ) {
        assert_eq!(raw.parse::<Column>(), expected);
    }
}
