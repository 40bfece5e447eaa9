//! Task triage and reminder trigger computation.
//!
//! # Responsibility
//! - Partition active tasks into overdue/today/upcoming buckets.
//! - Compute reminder trigger instants from due dates and lead hours.
//!
//! # Invariants
//! - Both computations are pure: no persistence, no notification side effects.
//! - Completed tasks never appear in a bucket.

pub mod reminder;
pub mod scorer;

pub use reminder::ReminderDateCalculator;
pub use scorer::{DefaultTriageScorer, TriageBucket, TriageScorer, UPCOMING_WINDOW_DAYS};
