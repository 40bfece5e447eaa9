//! Overdue/today/upcoming bucketing.

use crate::model::task::Task;
use crate::time::Calendar;
use log::debug;
use std::cmp::Ordering;

/// Days after start-of-today covered by the triage view, today included.
pub const UPCOMING_WINDOW_DAYS: i64 = 8;

/// Active tasks grouped relative to a reference instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageBucket {
    pub overdue: Vec<Task>,
    pub today: Vec<Task>,
    pub upcoming: Vec<Task>,
}

impl TriageBucket {
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.today.is_empty() && self.upcoming.is_empty()
    }

    pub fn len(&self) -> usize {
        self.overdue.len() + self.today.len() + self.upcoming.len()
    }
}

/// Strategy seam for task triage.
pub trait TriageScorer {
    fn bucketize(&self, tasks: Vec<Task>, now_ms: i64, calendar: &dyn Calendar) -> TriageBucket;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTriageScorer;

impl TriageScorer for DefaultTriageScorer {
    fn bucketize(&self, tasks: Vec<Task>, now_ms: i64, calendar: &dyn Calendar) -> TriageBucket {
        let Some((start_of_today, start_of_tomorrow, window_end)) = day_bounds(now_ms, calendar)
        else {
            debug!("event=triage_bucketize module=triage status=skipped reason=calendar_bounds");
            return TriageBucket::default();
        };

        let mut bucket = TriageBucket::default();
        for task in tasks.into_iter().filter(|task| !task.is_completed()) {
            if task.due_at < start_of_today {
                bucket.overdue.push(task);
            } else if task.due_at < start_of_tomorrow {
                bucket.today.push(task);
            } else if task.due_at < window_end {
                bucket.upcoming.push(task);
            }
        }

        bucket.overdue.sort_by(compare_for_triage);
        bucket.today.sort_by(compare_for_triage);
        bucket.upcoming.sort_by(compare_for_triage);
        bucket
    }
}

fn day_bounds(now_ms: i64, calendar: &dyn Calendar) -> Option<(i64, i64, i64)> {
    let start_of_today = calendar.start_of_day(now_ms)?;
    let start_of_tomorrow = calendar.add_days(start_of_today, 1)?;
    let window_end = calendar.add_days(start_of_today, UPCOMING_WINDOW_DAYS)?;
    Some((start_of_today, start_of_tomorrow, window_end))
}

/// Due ascending, then priority descending, then estimate descending, then
/// case-insensitive title ascending.
pub(crate) fn compare_for_triage(lhs: &Task, rhs: &Task) -> Ordering {
    lhs.due_at
        .cmp(&rhs.due_at)
        .then_with(|| rhs.priority.cmp(&lhs.priority))
        .then_with(|| rhs.estimated_minutes.cmp(&lhs.estimated_minutes))
        .then_with(|| lhs.title.to_lowercase().cmp(&rhs.title.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::{DefaultTriageScorer, TriageBucket, TriageScorer};
    use crate::model::task::{Priority, Task, TaskStatus};
    use crate::time::{Calendar, LocalParts, ZonedCalendar, MS_PER_DAY, MS_PER_HOUR};

    const NOW: i64 = 1_710_000_000_000;

    fn task(title: &str, due_at: i64) -> Task {
        Task::new(title, due_at, 0)
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.title.as_str()).collect()
    }

    fn start_of_today() -> i64 {
        ZonedCalendar::utc().start_of_day(NOW).unwrap()
    }

    #[test]
    fn splits_overdue_today_and_upcoming() {
        let calendar = ZonedCalendar::utc();
        let start = start_of_today();
        let tasks = vec![
            task("Upcoming", start + 3 * MS_PER_DAY),
            task("Overdue", start - 2 * MS_PER_HOUR),
            task("Today", start + 8 * MS_PER_HOUR),
        ];

        let bucket = DefaultTriageScorer.bucketize(tasks, NOW, &calendar);

        assert_eq!(titles(&bucket.overdue), vec!["Overdue"]);
        assert_eq!(titles(&bucket.today), vec!["Today"]);
        assert_eq!(titles(&bucket.upcoming), vec!["Upcoming"]);
    }

    #[test]
    fn reference_scenario_drops_far_and_completed_tasks() {
        let calendar = ZonedCalendar::utc();
        let t = start_of_today();
        let a = task("A", t - 2 * MS_PER_HOUR);
        let b = task("B", t + 8 * MS_PER_HOUR);
        let c = task("C", t + 3 * MS_PER_DAY);
        let d = task("D", t + 10 * MS_PER_DAY);
        let mut e = task("E", t + MS_PER_HOUR);
        e.set_status(TaskStatus::Completed, t);

        let bucket = DefaultTriageScorer.bucketize(vec![a, b, c, d, e], t, &calendar);

        assert_eq!(titles(&bucket.overdue), vec!["A"]);
        assert_eq!(titles(&bucket.today), vec!["B"]);
        assert_eq!(titles(&bucket.upcoming), vec!["C"]);
        assert_eq!(bucket.len(), 3);
    }

    #[test]
    fn overdue_means_before_start_of_today_not_before_now() {
        let calendar = ZonedCalendar::utc();
        let start = start_of_today();
        let earlier_today = task("earlier today", start + MS_PER_HOUR);
        let yesterday = task("yesterday", start - 1);

        let bucket = DefaultTriageScorer.bucketize(vec![earlier_today, yesterday], NOW, &calendar);

        assert_eq!(titles(&bucket.overdue), vec!["yesterday"]);
        assert_eq!(titles(&bucket.today), vec!["earlier today"]);
    }

    #[test]
    fn window_boundaries_are_half_open() {
        let calendar = ZonedCalendar::utc();
        let start = start_of_today();
        let tasks = vec![
            task("tomorrow start", start + MS_PER_DAY),
            task("last in window", start + 8 * MS_PER_DAY - 1),
            task("window end", start + 8 * MS_PER_DAY),
        ];

        let bucket = DefaultTriageScorer.bucketize(tasks, NOW, &calendar);

        assert!(bucket.today.is_empty());
        assert_eq!(
            titles(&bucket.upcoming),
            vec!["tomorrow start", "last in window"]
        );
    }

    #[test]
    fn sorting_uses_due_then_priority_then_duration_then_title() {
        let calendar = ZonedCalendar::utc();
        let due = start_of_today() + 10 * MS_PER_HOUR;

        let mut high = task("High", due);
        high.priority = Priority::High;
        high.estimated_minutes = 30;
        let mut medium_long = task("Medium long", due);
        medium_long.estimated_minutes = 120;
        let mut medium_short = task("medium short", due);
        medium_short.estimated_minutes = 60;
        let mut medium_short_b = task("Medium Short B", due);
        medium_short_b.estimated_minutes = 60;
        let earliest = task("Earliest", due - MS_PER_HOUR);

        let bucket = DefaultTriageScorer.bucketize(
            vec![medium_short_b, medium_short, high, earliest, medium_long],
            NOW,
            &calendar,
        );

        assert_eq!(
            titles(&bucket.today),
            vec![
                "Earliest",
                "High",
                "Medium long",
                "medium short",
                "Medium Short B"
            ]
        );
    }

    #[test]
    fn buckets_partition_active_in_window_tasks() {
        let calendar = ZonedCalendar::utc();
        let start = start_of_today();
        let mut tasks = Vec::new();
        for offset_hours in (-72..(10 * 24)).step_by(7) {
            let mut item = task(&format!("t{offset_hours}"), start + offset_hours * MS_PER_HOUR);
            if offset_hours % 3 == 0 {
                item.set_status(TaskStatus::Completed, NOW);
            }
            tasks.push(item);
        }
        let expected: Vec<_> = tasks
            .iter()
            .filter(|task| !task.is_completed() && task.due_at < start + 8 * MS_PER_DAY)
            .map(|task| task.uuid)
            .collect();

        let bucket = DefaultTriageScorer.bucketize(tasks, NOW, &calendar);

        let mut seen: Vec<_> = bucket
            .overdue
            .iter()
            .chain(&bucket.today)
            .chain(&bucket.upcoming)
            .map(|task| task.uuid)
            .collect();
        assert_eq!(seen.len(), expected.len());
        seen.sort();
        let mut expected_sorted = expected;
        expected_sorted.sort();
        assert_eq!(seen, expected_sorted);
    }

    #[test]
    fn empty_input_yields_empty_buckets() {
        let bucket = DefaultTriageScorer.bucketize(Vec::new(), NOW, &ZonedCalendar::utc());
        assert_eq!(bucket, TriageBucket::default());
        assert!(bucket.is_empty());
    }

    struct NoTomorrowCalendar;

    impl Calendar for NoTomorrowCalendar {
        fn start_of_day(&self, epoch_ms: i64) -> Option<i64> {
            Some(epoch_ms - epoch_ms.rem_euclid(MS_PER_DAY))
        }

        fn add_days(&self, _epoch_ms: i64, _days: i64) -> Option<i64> {
            None
        }

        fn add_months(&self, _epoch_ms: i64, _months: i32) -> Option<i64> {
            None
        }

        fn at_local_time(&self, _epoch_ms: i64, _hour: u32, _minute: u32) -> Option<i64> {
            None
        }

        fn local_parts(&self, _epoch_ms: i64) -> Option<LocalParts> {
            None
        }

        fn format_date_time(&self, epoch_ms: i64) -> String {
            epoch_ms.to_string()
        }
    }

    #[test]
    fn calendar_failure_yields_empty_buckets_not_partial_results() {
        let tasks = vec![task("overdue", NOW - 3 * MS_PER_DAY), task("today", NOW)];
        let bucket = DefaultTriageScorer.bucketize(tasks, NOW, &NoTomorrowCalendar);
        assert!(bucket.is_empty());
    }
}
