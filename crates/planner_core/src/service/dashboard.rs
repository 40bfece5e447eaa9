//! Dashboard snapshot.
//!
//! # Responsibility
//! - Gather greeting, triage buckets and today's classes for the home screen.
//! - Suggest a due date for quick-add tasks.

use crate::greeting::{compose_greeting, GreetingContent};
use crate::model::course::Course;
use crate::repo::course_repo::{CourseRepository, SqliteCourseRepository};
use crate::repo::preference_store::{AppPreferences, SqlitePreferenceStore};
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use crate::repo::RepoResult;
use crate::time::{Calendar, MS_PER_HOUR};
use crate::triage::{DefaultTriageScorer, TriageBucket, TriageScorer};
use log::debug;
use rusqlite::Connection;

/// Quick tasks created before this local hour are due a few hours later.
const QUICK_TASK_CUTOFF_HOUR: u32 = 20;
const QUICK_TASK_OFFSET_MS: i64 = 4 * MS_PER_HOUR;
const QUICK_TASK_NEXT_DAY_HOUR: u32 = 9;

/// Maximum number of class cards shown on the dashboard.
pub const FEATURED_CLASS_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub greeting: Option<GreetingContent>,
    pub triage: TriageBucket,
    /// Courses meeting today, earliest first.
    pub todays_classes: Vec<Course>,
    /// Up to three cards; falls back to all courses when none meet today.
    pub featured_classes: Vec<Course>,
}

/// Loads the dashboard state at `now_ms`.
///
/// The greeting uses the profile name, then the stored fallback name.
pub fn load_dashboard(
    conn: &Connection,
    now_ms: i64,
    calendar: &dyn Calendar,
) -> RepoResult<DashboardSnapshot> {
    let profile = SqliteProfileRepository::new(conn).primary_profile()?;
    let name = match profile {
        Some(profile) if !profile.display_name.trim().is_empty() => profile.display_name,
        _ => AppPreferences::new(SqlitePreferenceStore::new(conn)).fallback_display_name()?,
    };

    let tasks = SqliteTaskRepository::new(conn).list_tasks(&TaskListQuery::active())?;
    let triage = DefaultTriageScorer.bucketize(tasks, now_ms, calendar);

    let courses = SqliteCourseRepository::new(conn).list_courses()?;
    let todays_classes = todays_classes(&courses, now_ms, calendar);
    let featured_classes = featured_classes(&courses, &todays_classes);

    debug!(
        "event=dashboard_load module=service status=ok overdue={} today={} upcoming={} classes={}",
        triage.overdue.len(),
        triage.today.len(),
        triage.upcoming.len(),
        todays_classes.len()
    );
    Ok(DashboardSnapshot {
        greeting: compose_greeting(now_ms, &name, calendar),
        triage,
        todays_classes,
        featured_classes,
    })
}

/// Courses whose meeting days include the local weekday of `now_ms`.
pub fn todays_classes(courses: &[Course], now_ms: i64, calendar: &dyn Calendar) -> Vec<Course> {
    let Some(parts) = calendar.local_parts(now_ms) else {
        return Vec::new();
    };
    let mut today: Vec<Course> = courses
        .iter()
        .filter(|course| course.meets_on(parts.weekday))
        .cloned()
        .collect();
    today.sort_by_key(|course| course.start_minute);
    today
}

fn featured_classes(courses: &[Course], todays: &[Course]) -> Vec<Course> {
    if !todays.is_empty() {
        return todays.iter().take(FEATURED_CLASS_LIMIT).cloned().collect();
    }
    let mut all = courses.to_vec();
    all.sort_by_key(|course| course.start_minute);
    all.truncate(FEATURED_CLASS_LIMIT);
    all
}

/// Due date suggested for a quick-add task.
///
/// Before 20:00 local time this is four hours from now, otherwise 09:00
/// the next day.
pub fn recommended_quick_task_due(now_ms: i64, calendar: &dyn Calendar) -> i64 {
    let hour = calendar.local_parts(now_ms).map_or(0, |parts| parts.hour);
    if hour < QUICK_TASK_CUTOFF_HOUR {
        return now_ms.saturating_add(QUICK_TASK_OFFSET_MS);
    }
    let tomorrow = calendar.add_days(now_ms, 1).unwrap_or(now_ms);
    calendar
        .at_local_time(tomorrow, QUICK_TASK_NEXT_DAY_HOUR, 0)
        .unwrap_or(tomorrow)
}
