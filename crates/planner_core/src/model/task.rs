//! Assignment task model.
//!
//! # Responsibility
//! - Define the canonical task record consumed by triage and reminders.
//! - Provide lifecycle helpers that keep `completed_at` consistent with `status`.
//!
//! # Invariants
//! - `title` is non-empty after trimming.
//! - `estimated_minutes` is positive.
//! - `completed_at` is set if and only if `status == TaskStatus::Completed`.

use crate::model::course::CourseId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task.
pub type TaskId = Uuid;

/// Default estimate applied to newly drafted tasks.
pub const DEFAULT_ESTIMATED_MINUTES: i64 = 60;

/// Ordered task priority. `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Numeric rank used for storage (`1..=3`).
    pub fn rank(self) -> i64 {
        self as i64
    }

    pub fn from_rank(rank: i64) -> Option<Self> {
        match rank {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Case-insensitive inverse of `as_str`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|priority| value.trim().eq_ignore_ascii_case(priority.as_str()))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Task progress state. `Completed` is terminal for notification purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    NonPositiveEstimate(i64),
    MissingCompletedAt,
    UnexpectedCompletedAt,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::NonPositiveEstimate(value) => {
                write!(f, "estimated_minutes must be positive, got {value}")
            }
            Self::MissingCompletedAt => write!(f, "completed task requires completed_at"),
            Self::UnexpectedCompletedAt => {
                write!(f, "completed_at must be empty unless task is completed")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    pub title: String,
    pub notes: String,
    /// Unix epoch milliseconds.
    pub due_at: i64,
    pub estimated_minutes: i64,
    pub priority: Priority,
    pub status: TaskStatus,
    pub course_id: Option<CourseId>,
    pub created_at: i64,
    /// Set exactly when `status == TaskStatus::Completed`.
    pub completed_at: Option<i64>,
}

impl Task {
    /// Creates a not-started, medium-priority task with a generated ID.
    pub fn new(title: impl Into<String>, due_at: i64, created_at: i64) -> Self {
        Self::with_id(Uuid::new_v4(), title, due_at, created_at)
    }

    /// Creates a task with a caller-provided stable ID.
    pub fn with_id(uuid: TaskId, title: impl Into<String>, due_at: i64, created_at: i64) -> Self {
        Self {
            uuid,
            title: title.into(),
            notes: String::new(),
            due_at,
            estimated_minutes: DEFAULT_ESTIMATED_MINUTES,
            priority: Priority::Medium,
            status: TaskStatus::NotStarted,
            course_id: None,
            created_at,
            completed_at: None,
        }
    }

    pub fn is_title_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Moves the task to `status`, stamping or clearing `completed_at`.
    ///
    /// An already-completed task keeps its original completion time.
    pub fn set_status(&mut self, status: TaskStatus, now_ms: i64) {
        self.status = status;
        self.completed_at = if status.is_completed() {
            Some(self.completed_at.unwrap_or(now_ms))
        } else {
            None
        };
    }

    /// Validates record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if !self.is_title_valid() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.estimated_minutes <= 0 {
            return Err(TaskValidationError::NonPositiveEstimate(
                self.estimated_minutes,
            ));
        }
        match (self.status.is_completed(), self.completed_at) {
            (true, None) => Err(TaskValidationError::MissingCompletedAt),
            (false, Some(_)) => Err(TaskValidationError::UnexpectedCompletedAt),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, Task, TaskStatus, TaskValidationError};

    #[test]
    fn priority_parses_labels_case_insensitively() {
        assert_eq!(Priority::parse(" HIGH "), Some(Priority::High));
        assert_eq!(Priority::parse("low"), Some(Priority::Low));
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn whitespace_title_is_rejected() {
        let task = Task::new("   \n", 1_000, 0);
        assert!(!task.is_title_valid());
        assert_eq!(task.validate(), Err(TaskValidationError::EmptyTitle));
    }

    #[test]
    fn priority_ordering_follows_rank() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert_eq!(Priority::from_rank(Priority::High.rank()), Some(Priority::High));
        assert_eq!(Priority::from_rank(0), None);
    }

    #[test]
    fn set_status_stamps_and_clears_completed_at() {
        let mut task = Task::new("essay", 10_000, 0);
        task.set_status(TaskStatus::Completed, 5_000);
        assert_eq!(task.completed_at, Some(5_000));

        task.set_status(TaskStatus::Completed, 9_000);
        assert_eq!(task.completed_at, Some(5_000));

        task.set_status(TaskStatus::InProgress, 9_000);
        assert_eq!(task.completed_at, None);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn completion_timestamp_must_match_status() {
        let mut task = Task::new("lab", 10_000, 0);
        task.status = TaskStatus::Completed;
        assert_eq!(task.validate(), Err(TaskValidationError::MissingCompletedAt));

        task.status = TaskStatus::NotStarted;
        task.completed_at = Some(1);
        assert_eq!(
            task.validate(),
            Err(TaskValidationError::UnexpectedCompletedAt)
        );
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
    }
}
