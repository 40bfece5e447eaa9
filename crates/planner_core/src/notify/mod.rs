//! Local reminder notifications.
//!
//! # Responsibility
//! - Translate task deadlines into platform notification requests.
//! - Keep platform permission and delivery behind `NotificationPlatform`.
//!
//! # Invariants
//! - Each task owns at most one deadline and one snooze identifier.
//! - Cancelling is idempotent and keyed only by task ID.
//! - Completed tasks never keep a pending reminder.

mod outbox;
mod scheduler;

pub use outbox::{NotificationCommand, NotificationOutbox};
pub use scheduler::{
    snooze_identifier, task_identifier, ReminderScheduler, ScheduleOutcome,
    DEFAULT_SNOOZE_MINUTES,
};

use crate::model::task::TaskId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// When a platform notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTrigger {
    /// Fires at an absolute instant (epoch ms).
    At { fire_at_ms: i64 },
    /// Fires after a relative interval from registration.
    After { seconds: i64 },
}

/// One notification registration handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub identifier: String,
    pub task_id: TaskId,
    pub title: String,
    pub body: String,
    pub trigger: NotificationTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    PermissionDenied,
    Platform(String),
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::Platform(message) => write!(f, "notification platform error: {message}"),
        }
    }
}

impl Error for NotificationError {}

/// Platform notification seam.
pub trait NotificationPlatform {
    /// Prompts for permission; `true` when notifications may be delivered.
    fn request_authorization(&self) -> bool;
    fn schedule(&self, request: NotificationRequest) -> Result<(), NotificationError>;
    /// Removes pending and delivered notifications with these identifiers.
    fn cancel(&self, identifiers: &[String]);
}

impl<P: NotificationPlatform + ?Sized> NotificationPlatform for &P {
    fn request_authorization(&self) -> bool {
        (**self).request_authorization()
    }

    fn schedule(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        (**self).schedule(request)
    }

    fn cancel(&self, identifiers: &[String]) {
        (**self).cancel(identifiers)
    }
}
