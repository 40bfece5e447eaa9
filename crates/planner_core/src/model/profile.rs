//! Student profile model.
//!
//! # Invariants
//! - `default_reminder_lead_hours` is non-negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ProfileId = Uuid;

/// Lead hours used when no profile exists yet.
pub const DEFAULT_REMINDER_LEAD_HOURS: i64 = 24;

/// Display name used when the student has not provided one.
pub const FALLBACK_DISPLAY_NAME: &str = "Student";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentLevel {
    HighSchool,
    College,
}

impl StudentLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighSchool => "high_school",
            Self::College => "college",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high_school" => Some(Self::HighSchool),
            "college" => Some(Self::College),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::HighSchool => "High School",
            Self::College => "College / University",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    NegativeLeadHours(i64),
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeLeadHours(value) => {
                write!(f, "default_reminder_lead_hours must be >= 0, got {value}")
            }
        }
    }
}

impl Error for ProfileValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub uuid: ProfileId,
    pub display_name: String,
    pub student_level: StudentLevel,
    pub default_reminder_lead_hours: i64,
    pub created_at: i64,
}

impl StudentProfile {
    pub fn new(display_name: impl Into<String>, student_level: StudentLevel, created_at: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            display_name: display_name.into(),
            student_level,
            default_reminder_lead_hours: DEFAULT_REMINDER_LEAD_HOURS,
            created_at,
        }
    }

    /// Trimmed display name, or the fallback when blank.
    pub fn greeting_name(&self) -> &str {
        let trimmed = self.display_name.trim();
        if trimmed.is_empty() {
            FALLBACK_DISPLAY_NAME
        } else {
            trimmed
        }
    }

    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.default_reminder_lead_hours < 0 {
            return Err(ProfileValidationError::NegativeLeadHours(
                self.default_reminder_lead_hours,
            ));
        }
        Ok(())
    }
}

/// Resolves reminder lead hours from an optional profile.
pub fn reminder_lead_hours(profile: Option<&StudentProfile>) -> i64 {
    profile.map_or(DEFAULT_REMINDER_LEAD_HOURS, |profile| {
        profile.default_reminder_lead_hours
    })
}
