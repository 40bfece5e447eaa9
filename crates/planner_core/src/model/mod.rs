//! Planner domain model.
//!
//! # Responsibility
//! - Define canonical records for tasks, courses, terms and the student profile.
//! - Own model-level validation invariants shared by repositories and services.
//!
//! # Invariants
//! - Every persisted record is identified by a stable UUID.
//! - Timestamps are Unix epoch milliseconds.

pub mod course;
pub mod profile;
pub mod task;
pub mod term;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Any model-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Task(task::TaskValidationError),
    Course(course::CourseValidationError),
    Term(term::TermValidationError),
    Profile(profile::ProfileValidationError),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Task(err) => write!(f, "{err}"),
            Self::Course(err) => write!(f, "{err}"),
            Self::Term(err) => write!(f, "{err}"),
            Self::Profile(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Task(err) => Some(err),
            Self::Course(err) => Some(err),
            Self::Term(err) => Some(err),
            Self::Profile(err) => Some(err),
        }
    }
}

impl From<task::TaskValidationError> for ValidationError {
    fn from(value: task::TaskValidationError) -> Self {
        Self::Task(value)
    }
}

impl From<course::CourseValidationError> for ValidationError {
    fn from(value: course::CourseValidationError) -> Self {
        Self::Course(value)
    }
}

impl From<term::TermValidationError> for ValidationError {
    fn from(value: term::TermValidationError) -> Self {
        Self::Term(value)
    }
}

impl From<profile::ProfileValidationError> for ValidationError {
    fn from(value: profile::ProfileValidationError) -> Self {
        Self::Profile(value)
    }
}
