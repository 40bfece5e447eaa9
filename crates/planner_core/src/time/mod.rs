//! Time source and calendar arithmetic.
//!
//! # Responsibility
//! - Supply "now" through an injectable clock.
//! - Compute local day boundaries and calendar offsets for triage and reminders.
//!
//! # Invariants
//! - All public inputs and outputs are Unix epoch milliseconds.
//! - Calendar operations return `None` instead of panicking when a local time
//!   cannot be resolved (out of range, or skipped by a DST transition).

mod calendar;
mod clock;

pub use calendar::{Calendar, LocalParts, ZonedCalendar};
pub use clock::{Clock, FixedClock, SystemClock};

/// Calendar in the device's local time zone.
pub type LocalCalendar = ZonedCalendar<chrono::Local>;

pub const MS_PER_MINUTE: i64 = 60 * 1000;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
