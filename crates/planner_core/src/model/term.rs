//! Academic term model.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TermId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermValidationError {
    EmptyName,
    ReversedDateRange { start_date: i64, end_date: i64 },
}

impl Display for TermValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "term name cannot be empty"),
            Self::ReversedDateRange {
                start_date,
                end_date,
            } => write!(
                f,
                "term end_date {end_date} must not be earlier than start_date {start_date}"
            ),
        }
    }
}

impl Error for TermValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicTerm {
    pub uuid: TermId,
    pub name: String,
    /// Unix epoch milliseconds.
    pub start_date: i64,
    /// Unix epoch milliseconds; `>= start_date`.
    pub end_date: i64,
    pub is_active: bool,
}

impl AcademicTerm {
    pub fn new(name: impl Into<String>, start_date: i64, end_date: i64, is_active: bool) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            start_date,
            end_date,
            is_active,
        }
    }

    pub fn is_date_range_valid(&self) -> bool {
        self.start_date <= self.end_date
    }

    pub fn validate(&self) -> Result<(), TermValidationError> {
        if self.name.trim().is_empty() {
            return Err(TermValidationError::EmptyName);
        }
        if !self.is_date_range_valid() {
            return Err(TermValidationError::ReversedDateRange {
                start_date: self.start_date,
                end_date: self.end_date,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::AcademicTerm;

    #[test]
    fn date_range_requires_start_before_or_equal_end() {
        let valid = AcademicTerm::new("Term", 1_000, 2_000, true);
        let same_day = AcademicTerm::new("Term", 1_000, 1_000, true);
        let invalid = AcademicTerm::new("Term", 2_000, 1_000, true);

        assert!(valid.is_date_range_valid());
        assert!(same_day.validate().is_ok());
        assert!(!invalid.is_date_range_valid());
        assert!(invalid.validate().is_err());
    }
}
