use crate::model::course::Weekday;
use chrono::{DateTime, Datelike, Days, FixedOffset, Local, Months, NaiveDateTime, TimeZone, Timelike, Utc};
use std::fmt::Display;

/// Local wall-clock components of an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalParts {
    pub weekday: Weekday,
    pub hour: u32,
    pub minute: u32,
}

impl LocalParts {
    /// Minutes after local midnight.
    pub fn minute_of_day(&self) -> u16 {
        (self.hour * 60 + self.minute) as u16
    }
}

/// Local calendar arithmetic over epoch-millisecond instants.
pub trait Calendar {
    /// First instant of the local day containing `epoch_ms`.
    fn start_of_day(&self, epoch_ms: i64) -> Option<i64>;
    /// Same local wall time shifted by `days` calendar days.
    fn add_days(&self, epoch_ms: i64, days: i64) -> Option<i64>;
    /// Same local wall time shifted by `months`, clamped to the month's last day.
    fn add_months(&self, epoch_ms: i64, months: i32) -> Option<i64>;
    /// Local date of `epoch_ms` at `hour:minute:00`.
    fn at_local_time(&self, epoch_ms: i64, hour: u32, minute: u32) -> Option<i64>;
    fn local_parts(&self, epoch_ms: i64) -> Option<LocalParts>;
    /// Short human-readable date and time, e.g. `Mar 9, 2024 at 4:00 PM`.
    fn format_date_time(&self, epoch_ms: i64) -> String;
}

impl<C: Calendar + ?Sized> Calendar for &C {
    fn start_of_day(&self, epoch_ms: i64) -> Option<i64> {
        (**self).start_of_day(epoch_ms)
    }

    fn add_days(&self, epoch_ms: i64, days: i64) -> Option<i64> {
        (**self).add_days(epoch_ms, days)
    }

    fn add_months(&self, epoch_ms: i64, months: i32) -> Option<i64> {
        (**self).add_months(epoch_ms, months)
    }

    fn at_local_time(&self, epoch_ms: i64, hour: u32, minute: u32) -> Option<i64> {
        (**self).at_local_time(epoch_ms, hour, minute)
    }

    fn local_parts(&self, epoch_ms: i64) -> Option<LocalParts> {
        (**self).local_parts(epoch_ms)
    }

    fn format_date_time(&self, epoch_ms: i64) -> String {
        (**self).format_date_time(epoch_ms)
    }
}

/// Gregorian calendar in a `chrono` time zone.
#[derive(Debug, Clone)]
pub struct ZonedCalendar<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> ZonedCalendar<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    fn local(&self, epoch_ms: i64) -> Option<DateTime<Tz>> {
        self.tz.timestamp_millis_opt(epoch_ms).single()
    }

    // Ambiguous local times (DST fall-back) resolve to the earlier instant;
    // skipped local times (DST spring-forward) do not resolve.
    fn resolve(&self, naive: NaiveDateTime) -> Option<i64> {
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp_millis())
    }
}

impl ZonedCalendar<Utc> {
    pub fn utc() -> Self {
        Self::new(Utc)
    }
}

impl ZonedCalendar<FixedOffset> {
    /// Calendar at a fixed UTC offset; `None` when the offset is out of range.
    pub fn fixed_offset_minutes(offset_minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(offset_minutes.checked_mul(60)?).map(Self::new)
    }
}

impl ZonedCalendar<Local> {
    pub fn local_zone() -> Self {
        Self::new(Local)
    }
}

impl<Tz> Calendar for ZonedCalendar<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn start_of_day(&self, epoch_ms: i64) -> Option<i64> {
        let midnight = self.local(epoch_ms)?.date_naive().and_hms_opt(0, 0, 0)?;
        self.resolve(midnight)
    }

    fn add_days(&self, epoch_ms: i64, days: i64) -> Option<i64> {
        let naive = self.local(epoch_ms)?.naive_local();
        let magnitude = Days::new(days.unsigned_abs());
        let shifted = if days >= 0 {
            naive.checked_add_days(magnitude)?
        } else {
            naive.checked_sub_days(magnitude)?
        };
        self.resolve(shifted)
    }

    fn add_months(&self, epoch_ms: i64, months: i32) -> Option<i64> {
        let naive = self.local(epoch_ms)?.naive_local();
        let magnitude = Months::new(months.unsigned_abs());
        let shifted = if months >= 0 {
            naive.checked_add_months(magnitude)?
        } else {
            naive.checked_sub_months(magnitude)?
        };
        self.resolve(shifted)
    }

    fn at_local_time(&self, epoch_ms: i64, hour: u32, minute: u32) -> Option<i64> {
        let target = self
            .local(epoch_ms)?
            .date_naive()
            .and_hms_opt(hour, minute, 0)?;
        self.resolve(target)
    }

    fn local_parts(&self, epoch_ms: i64) -> Option<LocalParts> {
        let local = self.local(epoch_ms)?;
        Some(LocalParts {
            weekday: Weekday::from(local.weekday()),
            hour: local.hour(),
            minute: local.minute(),
        })
    }

    fn format_date_time(&self, epoch_ms: i64) -> String {
        match self.local(epoch_ms) {
            Some(local) => local.format("%b %-d, %Y at %-I:%M %p").to_string(),
            None => epoch_ms.to_string(),
        }
    }
}
