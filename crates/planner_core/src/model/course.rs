//! Course model and weekday meeting masks.
//!
//! # Responsibility
//! - Define course records referenced by tasks as labels.
//! - Encode weekly meeting days as a compact bitmask.
//!
//! # Invariants
//! - `name` is non-empty after trimming.
//! - `color_hex` matches `#RRGGBB`.
//! - `start_minute <= end_minute <= 1440`.
//! - Bit `n` of `meeting_days` is set for `Weekday` with index `n` (Monday = 0).

use crate::model::profile::StudentLevel;
use crate::model::term::TermId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CourseId = Uuid;

pub const DEFAULT_COURSE_COLOR: &str = "#2B66C0";
pub const MINUTES_PER_DAY: u16 = 24 * 60;

static COLOR_HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Zero-based index, Monday first.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Self::Monday => "M",
            Self::Tuesday => "T",
            Self::Wednesday => "W",
            Self::Thursday => "Th",
            Self::Friday => "F",
            Self::Saturday => "Sa",
            Self::Sunday => "Su",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        Self::ALL[value.num_days_from_monday() as usize]
    }
}

/// Weekly meeting-day bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdayMask(u8);

impl WeekdayMask {
    pub const EMPTY: WeekdayMask = WeekdayMask(0);

    /// Builds a mask from raw storage bits, ignoring bits above Sunday.
    pub fn from_bits(bits: i64) -> Self {
        Self((bits & 0x7F) as u8)
    }

    pub fn bits(self) -> i64 {
        i64::from(self.0)
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    #[must_use]
    pub fn toggle(self, day: Weekday) -> Self {
        Self(self.0 ^ (1 << day.index()))
    }

    pub fn days(self) -> Vec<Weekday> {
        Weekday::ALL
            .into_iter()
            .filter(|day| self.contains(*day))
            .collect()
    }
}

impl FromIterator<Weekday> for WeekdayMask {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY, |mask, day| Self(mask.0 | (1 << day.index())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    EmptyName,
    InvalidColor(String),
    InvalidMeetingTime { start_minute: u16, end_minute: u16 },
}

impl Display for CourseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "course name cannot be empty"),
            Self::InvalidColor(value) => write!(f, "invalid course color `{value}`"),
            Self::InvalidMeetingTime {
                start_minute,
                end_minute,
            } => write!(
                f,
                "invalid meeting time {start_minute}..{end_minute}; expected start <= end <= {MINUTES_PER_DAY}"
            ),
        }
    }
}

impl Error for CourseValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub uuid: CourseId,
    pub name: String,
    pub code: String,
    pub color_hex: String,
    pub student_level: StudentLevel,
    pub meeting_days: WeekdayMask,
    /// Minutes after local midnight.
    pub start_minute: u16,
    /// Minutes after local midnight; `>= start_minute`.
    pub end_minute: u16,
    pub location: String,
    pub term_id: Option<TermId>,
}

impl Course {
    pub fn new(name: impl Into<String>, student_level: StudentLevel) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            code: String::new(),
            color_hex: DEFAULT_COURSE_COLOR.to_string(),
            student_level,
            meeting_days: WeekdayMask::EMPTY,
            start_minute: 9 * 60,
            end_minute: 10 * 60,
            location: String::new(),
            term_id: None,
        }
    }

    pub fn meets_on(&self, day: Weekday) -> bool {
        self.meeting_days.contains(day)
    }

    pub fn validate(&self) -> Result<(), CourseValidationError> {
        if self.name.trim().is_empty() {
            return Err(CourseValidationError::EmptyName);
        }
        if !COLOR_HEX_RE.is_match(&self.color_hex) {
            return Err(CourseValidationError::InvalidColor(self.color_hex.clone()));
        }
        if self.start_minute > self.end_minute || self.end_minute > MINUTES_PER_DAY {
            return Err(CourseValidationError::InvalidMeetingTime {
                start_minute: self.start_minute,
                end_minute: self.end_minute,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Course, CourseValidationError, Weekday, WeekdayMask};
    use crate::model::profile::StudentLevel;

    #[test]
    fn mask_toggle_and_contains() {
        let mask = WeekdayMask::EMPTY
            .toggle(Weekday::Monday)
            .toggle(Weekday::Wednesday);
        assert!(mask.contains(Weekday::Monday));
        assert!(!mask.contains(Weekday::Tuesday));
        assert_eq!(mask.bits(), 0b101);
        assert_eq!(mask.days(), vec![Weekday::Monday, Weekday::Wednesday]);

        let cleared = mask.toggle(Weekday::Monday);
        assert_eq!(cleared.days(), vec![Weekday::Wednesday]);
    }

    #[test]
    fn mask_collects_from_days() {
        let mask: WeekdayMask = [Weekday::Tuesday, Weekday::Thursday, Weekday::Tuesday]
            .into_iter()
            .collect();
        assert_eq!(mask.days(), vec![Weekday::Tuesday, Weekday::Thursday]);
        assert_eq!(WeekdayMask::from_bits(0xFF).days().len(), 7);
    }

    #[test]
    fn course_validation_checks_color_and_times() {
        let mut course = Course::new("Physics", StudentLevel::College);
        assert!(course.validate().is_ok());

        course.color_hex = "blue".to_string();
        assert!(matches!(
            course.validate(),
            Err(CourseValidationError::InvalidColor(_))
        ));

        course.color_hex = "#c35a16".to_string();
        course.start_minute = 600;
        course.end_minute = 540;
        assert!(matches!(
            course.validate(),
            Err(CourseValidationError::InvalidMeetingTime { .. })
        ));
    }
}
