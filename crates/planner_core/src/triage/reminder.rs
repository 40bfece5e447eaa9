//! Reminder trigger calculator.

use crate::time::MS_PER_HOUR;

/// Computes when a deadline reminder should fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReminderDateCalculator;

impl ReminderDateCalculator {
    /// Returns `due_at - lead_hours` when that instant is strictly after `now_ms`.
    ///
    /// Returns `None` for negative lead hours, past triggers, and arithmetic
    /// overflow.
    pub fn trigger_at(&self, due_at: i64, lead_hours: i64, now_ms: i64) -> Option<i64> {
        if lead_hours < 0 {
            return None;
        }
        let lead_ms = lead_hours.checked_mul(MS_PER_HOUR)?;
        let trigger = due_at.checked_sub(lead_ms)?;
        (trigger > now_ms).then_some(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::ReminderDateCalculator;
    use crate::time::{MS_PER_HOUR, MS_PER_MINUTE};

    const NOW: i64 = 1_710_000_000_000;

    #[test]
    fn returns_none_when_reminder_would_be_in_past() {
        let due = NOW + 30 * MS_PER_MINUTE;
        assert_eq!(ReminderDateCalculator.trigger_at(due, 1, NOW), None);
    }

    #[test]
    fn returns_future_trigger_when_valid() {
        let due = NOW + 10 * MS_PER_HOUR;
        assert_eq!(
            ReminderDateCalculator.trigger_at(due, 2, NOW),
            Some(NOW + 8 * MS_PER_HOUR)
        );
    }

    #[test]
    fn trigger_exactly_at_now_is_rejected() {
        let due = NOW + 3 * MS_PER_HOUR;
        assert_eq!(ReminderDateCalculator.trigger_at(due, 3, NOW), None);
        assert_eq!(
            ReminderDateCalculator.trigger_at(due, 0, NOW),
            Some(due)
        );
    }

    #[test]
    fn negative_lead_hours_are_invalid_not_clamped() {
        let due = NOW + 10 * MS_PER_HOUR;
        assert_eq!(ReminderDateCalculator.trigger_at(due, -1, NOW), None);
    }

    #[test]
    fn overflowing_inputs_yield_none() {
        assert_eq!(ReminderDateCalculator.trigger_at(i64::MIN, 1, NOW), None);
        assert_eq!(ReminderDateCalculator.trigger_at(NOW, i64::MAX, 0), None);
    }
}
