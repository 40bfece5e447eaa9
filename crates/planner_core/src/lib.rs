//! Core logic for the student planner.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod greeting;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod time;
pub mod triage;

pub use greeting::{compose_greeting, GreetingContent};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::course::{Course, CourseId, Weekday, WeekdayMask};
pub use model::profile::{StudentLevel, StudentProfile};
pub use model::task::{Priority, Task, TaskId, TaskStatus, TaskValidationError};
pub use model::term::{AcademicTerm, TermId};
pub use notify::{
    NotificationCommand, NotificationOutbox, NotificationPlatform, ReminderScheduler,
};
pub use repo::{RepoError, RepoResult};
pub use service::task_service::{TaskDraft, TaskService, TaskServiceError};
pub use time::{Calendar, Clock, SystemClock, ZonedCalendar};
pub use triage::{DefaultTriageScorer, ReminderDateCalculator, TriageBucket, TriageScorer};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
