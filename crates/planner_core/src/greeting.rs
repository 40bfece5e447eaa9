//! Dashboard greeting text.

use crate::model::profile::FALLBACK_DISPLAY_NAME;
use crate::time::Calendar;

const DAY_GREETINGS: [&str; 7] = [
    "Ciao",
    "Hola",
    "Bonjour",
    "Hello",
    "Konnichiwa",
    "Ola",
    "Guten Tag",
];

const DAY_NUDGES: [&str; 7] = [
    "Kick off the week strong.",
    "Stay steady and keep building momentum.",
    "Midweek focus mode is on.",
    "Push through and finish key tasks.",
    "Wrap up the week with clarity.",
    "Use the weekend to get ahead.",
    "Plan your week with intention.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingContent {
    pub headline: String,
    pub subheadline: String,
}

/// Builds the greeting for `now_ms` in the caller's calendar.
///
/// Returns `None` when the local time of `now_ms` cannot be resolved.
pub fn compose_greeting(now_ms: i64, name: &str, calendar: &dyn Calendar) -> Option<GreetingContent> {
    let parts = calendar.local_parts(now_ms)?;
    let trimmed = name.trim();
    let display_name = if trimmed.is_empty() {
        FALLBACK_DISPLAY_NAME
    } else {
        trimmed
    };
    let index = parts.weekday.index();

    Some(GreetingContent {
        headline: format!(
            "{}, {}! {}",
            DAY_GREETINGS[index],
            display_name,
            time_of_day_greeting(parts.hour)
        ),
        subheadline: format!("{}: {}", parts.weekday.name(), DAY_NUDGES[index]),
    })
}

fn time_of_day_greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good Morning",
        12..=16 => "Good Afternoon",
        17..=20 => "Good Evening",
        _ => "Good Night",
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_greeting, time_of_day_greeting};
    use crate::time::{ZonedCalendar, MS_PER_HOUR};

    // Saturday 2024-03-09 16:00 UTC.
    const SATURDAY_4PM: i64 = 1_710_000_000_000;

    #[test]
    fn saturday_afternoon_greeting() {
        let greeting = compose_greeting(SATURDAY_4PM, " Ada ", &ZonedCalendar::utc()).unwrap();
        assert_eq!(greeting.headline, "Ola, Ada! Good Afternoon");
        assert_eq!(
            greeting.subheadline,
            "Saturday: Use the weekend to get ahead."
        );
    }

    #[test]
    fn blank_name_and_late_hour() {
        let sunday_1am = SATURDAY_4PM + 9 * MS_PER_HOUR;
        let greeting = compose_greeting(sunday_1am, "", &ZonedCalendar::utc()).unwrap();
        assert_eq!(greeting.headline, "Guten Tag, Student! Good Night");
        assert!(greeting.subheadline.starts_with("Sunday: "));
    }

    #[test]
    fn hour_boundaries() {
        assert_eq!(time_of_day_greeting(4), "Good Night");
        assert_eq!(time_of_day_greeting(5), "Good Morning");
        assert_eq!(time_of_day_greeting(12), "Good Afternoon");
        assert_eq!(time_of_day_greeting(17), "Good Evening");
        assert_eq!(time_of_day_greeting(21), "Good Night");
    }
}
