//! Settings screen use-cases.
//!
//! # Responsibility
//! - Report summary values (completed count, active term).
//! - Reset all local data.
//! - Seed and remove debug mock data.
//!
//! # Invariants
//! - Mock courses carry the `MOCK-` code prefix; mock tasks carry `[MOCK]`
//!   in their notes. Removal only touches records matching either marker.

use crate::model::course::{Course, Weekday};
use crate::model::profile::{StudentLevel, StudentProfile, FALLBACK_DISPLAY_NAME};
use crate::model::task::{Priority, Task, TaskId};
use crate::model::term::AcademicTerm;
use crate::notify::{NotificationPlatform, ReminderScheduler};
use crate::repo::course_repo::{CourseRepository, SqliteCourseRepository};
use crate::repo::preference_store::{AppPreferences, SqlitePreferenceStore};
use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository, TaskStatusScope};
use crate::repo::RepoResult;
use crate::time::Calendar;
use log::info;
use rusqlite::Connection;
use std::collections::HashSet;

pub const MOCK_CODE_PREFIX: &str = "MOCK-";
pub const MOCK_TASK_TAG: &str = "[MOCK]";
pub const NO_ACTIVE_TERM_LABEL: &str = "None";
const MOCK_TASK_MINUTES: i64 = 40;
const ENSURED_TERM_NAME: &str = "Current Term";
const ENSURED_TERM_MONTHS: i32 = 4;

struct MockCourseTemplate {
    name: &'static str,
    code: &'static str,
    color_hex: &'static str,
    days: &'static [Weekday],
    start_minute: u16,
    duration_minutes: u16,
    location: &'static str,
}

const MOCK_COURSES: [MockCourseTemplate; 3] = [
    MockCourseTemplate {
        name: "Physics",
        code: "MOCK-PHY101",
        color_hex: "#C35A16",
        days: &[Weekday::Monday, Weekday::Wednesday],
        start_minute: 8 * 60 + 10,
        duration_minutes: 60,
        location: "A-104",
    },
    MockCourseTemplate {
        name: "Algebra II",
        code: "MOCK-MTH210",
        color_hex: "#2B66C0",
        days: &[Weekday::Tuesday, Weekday::Thursday],
        start_minute: 9 * 60 + 20,
        duration_minutes: 75,
        location: "B-212",
    },
    MockCourseTemplate {
        name: "English Lit",
        code: "MOCK-ENG115",
        color_hex: "#7D4AB5",
        days: &[Weekday::Friday],
        start_minute: 10 * 60,
        duration_minutes: 60,
        location: "Library",
    },
];

/// Counts of records touched by a mock-data operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockDataSummary {
    pub courses: usize,
    pub tasks: usize,
}

pub struct SettingsService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SettingsService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn tasks(&self) -> SqliteTaskRepository<'conn> {
        SqliteTaskRepository::new(self.conn)
    }

    fn courses(&self) -> SqliteCourseRepository<'conn> {
        SqliteCourseRepository::new(self.conn)
    }

    fn profiles(&self) -> SqliteProfileRepository<'conn> {
        SqliteProfileRepository::new(self.conn)
    }

    pub fn completed_task_count(&self) -> RepoResult<usize> {
        let query = TaskListQuery {
            scope: TaskStatusScope::Completed,
            ..TaskListQuery::default()
        };
        Ok(self.tasks().list_tasks(&query)?.len())
    }

    /// Name of the active term, or `"None"`.
    pub fn active_term_name(&self) -> RepoResult<String> {
        Ok(self
            .courses()
            .active_term()?
            .map_or_else(|| NO_ACTIVE_TERM_LABEL.to_string(), |term| term.name))
    }

    /// Removes profiles, terms, courses and tasks, cancelling every reminder.
    ///
    /// Preferences are kept.
    pub fn reset_data<P, C>(&self, scheduler: &ReminderScheduler<P, C>) -> RepoResult<()>
    where
        P: NotificationPlatform,
        C: Calendar,
    {
        let task_ids: Vec<TaskId> = self
            .tasks()
            .list_tasks(&TaskListQuery::default())?
            .into_iter()
            .map(|task| task.uuid)
            .collect();

        let tx = self.conn.unchecked_transaction()?;
        let tasks_removed = SqliteTaskRepository::new(&tx).delete_all_tasks()?;
        SqliteCourseRepository::new(&tx).delete_all_courses_and_terms()?;
        SqliteProfileRepository::new(&tx).delete_all_profiles()?;
        tx.commit()?;

        for id in task_ids {
            scheduler.cancel(id);
        }
        info!("event=settings_reset module=service status=ok tasks={tasks_removed}");
        Ok(())
    }

    /// Returns the active term, creating a four-month "Current Term" from
    /// today when none exists.
    pub fn ensure_active_term(&self, now_ms: i64, calendar: &dyn Calendar) -> RepoResult<AcademicTerm> {
        let courses = self.courses();
        if let Some(active) = courses.active_term()? {
            return Ok(active);
        }
        let start = calendar.start_of_day(now_ms).unwrap_or(now_ms);
        let end = calendar
            .add_months(start, ENSURED_TERM_MONTHS)
            .unwrap_or(start);
        let term = AcademicTerm::new(ENSURED_TERM_NAME, start, end, true);
        courses.create_term(&term)?;
        Ok(term)
    }

    /// Returns the primary profile, creating one named after the stored
    /// fallback display name when none exists.
    pub fn ensure_profile(&self, now_ms: i64) -> RepoResult<StudentProfile> {
        let profiles = self.profiles();
        if let Some(profile) = profiles.primary_profile()? {
            return Ok(profile);
        }
        let fallback = AppPreferences::new(SqlitePreferenceStore::new(self.conn))
            .fallback_display_name()?;
        let name = match fallback.trim() {
            "" => FALLBACK_DISPLAY_NAME,
            trimmed => trimmed,
        };
        let profile = StudentProfile::new(name, StudentLevel::College, now_ms);
        profiles.save_profile(&profile)?;
        Ok(profile)
    }

    /// Updates the profile's reminder lead time, creating a profile if needed.
    pub fn set_default_lead_hours(&self, hours: i64, now_ms: i64) -> RepoResult<StudentProfile> {
        let mut profile = self.ensure_profile(now_ms)?;
        profile.default_reminder_lead_hours = hours;
        self.profiles().save_profile(&profile)?;
        Ok(profile)
    }

    /// Inserts the mock courses that are missing plus one review task each.
    pub fn add_mock_data(&self, now_ms: i64, calendar: &dyn Calendar) -> RepoResult<MockDataSummary> {
        let term = self.ensure_active_term(now_ms, calendar)?;
        let profile = self.ensure_profile(now_ms)?;

        let courses = self.courses();
        let tasks = self.tasks();
        let existing_codes: HashSet<String> = courses
            .list_courses()?
            .into_iter()
            .map(|course| course.code)
            .collect();
        let due_at = calendar.add_days(now_ms, 1).unwrap_or(now_ms);

        let mut summary = MockDataSummary::default();
        for template in MOCK_COURSES
            .iter()
            .filter(|template| !existing_codes.contains(template.code))
        {
            let mut course = Course::new(template.name, profile.student_level);
            course.code = template.code.to_string();
            course.color_hex = template.color_hex.to_string();
            course.meeting_days = template.days.iter().copied().collect();
            course.start_minute = template.start_minute;
            course.end_minute = template.start_minute + template.duration_minutes;
            course.location = template.location.to_string();
            course.term_id = Some(term.uuid);
            courses.create_course(&course)?;

            let mut task = Task::new(format!("Review {} notes", course.name), due_at, now_ms);
            task.notes = format!("{MOCK_TASK_TAG} Generated from Debug settings.");
            task.estimated_minutes = MOCK_TASK_MINUTES;
            task.priority = Priority::Medium;
            task.course_id = Some(course.uuid);
            tasks.create_task(&task)?;

            summary.courses += 1;
            summary.tasks += 1;
        }
        info!(
            "event=mock_data_add module=service status=ok courses={} tasks={}",
            summary.courses, summary.tasks
        );
        Ok(summary)
    }

    /// Deletes mock courses and every task linked to one or tagged `[MOCK]`.
    pub fn remove_mock_data<P, C>(
        &self,
        scheduler: &ReminderScheduler<P, C>,
    ) -> RepoResult<MockDataSummary>
    where
        P: NotificationPlatform,
        C: Calendar,
    {
        let courses = self.courses();
        let tasks = self.tasks();
        let mock_courses: HashSet<_> = courses
            .list_courses()?
            .into_iter()
            .filter(|course| course.code.starts_with(MOCK_CODE_PREFIX))
            .map(|course| course.uuid)
            .collect();

        let mut summary = MockDataSummary::default();
        for task in tasks.list_tasks(&TaskListQuery::default())? {
            let linked = task
                .course_id
                .is_some_and(|id| mock_courses.contains(&id));
            if linked || task.notes.contains(MOCK_TASK_TAG) {
                scheduler.cancel(task.uuid);
                if tasks.delete_task(task.uuid)? {
                    summary.tasks += 1;
                }
            }
        }
        for id in mock_courses {
            if courses.delete_course(id)? {
                summary.courses += 1;
            }
        }
        info!(
            "event=mock_data_remove module=service status=ok courses={} tasks={}",
            summary.courses, summary.tasks
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::{SettingsService, MOCK_TASK_TAG, NO_ACTIVE_TERM_LABEL};
    use crate::db::open_db_in_memory;
    use crate::model::course::Course;
    use crate::model::profile::StudentLevel;
    use crate::model::task::{Task, TaskStatus};
    use crate::notify::{NotificationCommand, NotificationOutbox, ReminderScheduler};
    use crate::repo::course_repo::{CourseRepository, SqliteCourseRepository};
    use crate::repo::preference_store::{AppPreferences, SqlitePreferenceStore};
    use crate::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
    use crate::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
    use crate::time::{ZonedCalendar, MS_PER_DAY};

    const NOW: i64 = 1_710_000_000_000;

    #[test]
    fn mock_data_round_trip_leaves_user_records() {
        let conn = open_db_in_memory().unwrap();
        let calendar = ZonedCalendar::utc();
        let settings = SettingsService::new(&conn);

        let mut own_course = Course::new("Chemistry", StudentLevel::College);
        own_course.code = "CHM100".to_string();
        SqliteCourseRepository::new(&conn)
            .create_course(&own_course)
            .unwrap();
        SqliteTaskRepository::new(&conn)
            .create_task(&Task::new("Lab report", NOW + MS_PER_DAY, NOW))
            .unwrap();

        let added = settings.add_mock_data(NOW, &calendar).unwrap();
        assert_eq!((added.courses, added.tasks), (3, 3));
        assert_eq!(settings.active_term_name().unwrap(), "Current Term");
        let profile = SqliteProfileRepository::new(&conn)
            .primary_profile()
            .unwrap()
            .unwrap();
        assert_eq!(profile.display_name, "Student");

        let again = settings.add_mock_data(NOW, &calendar).unwrap();
        assert_eq!((again.courses, again.tasks), (0, 0));

        let tasks = SqliteTaskRepository::new(&conn)
            .list_tasks(&TaskListQuery::default())
            .unwrap();
        let mock_task = tasks
            .iter()
            .find(|task| task.title == "Review Physics notes")
            .unwrap();
        assert!(mock_task.notes.starts_with(MOCK_TASK_TAG));
        assert_eq!(mock_task.estimated_minutes, 40);
        assert_eq!(mock_task.due_at, NOW + MS_PER_DAY);

        let scheduler = ReminderScheduler::new(NotificationOutbox::new(), ZonedCalendar::utc());
        let removed = settings.remove_mock_data(&scheduler).unwrap();
        assert_eq!((removed.courses, removed.tasks), (3, 3));

        let remaining: Vec<String> = SqliteTaskRepository::new(&conn)
            .list_tasks(&TaskListQuery::default())
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect();
        assert_eq!(remaining, vec!["Lab report"]);
        assert_eq!(SqliteCourseRepository::new(&conn).list_courses().unwrap().len(), 1);
    }

    #[test]
    fn ensure_profile_uses_stored_fallback_name() {
        let conn = open_db_in_memory().unwrap();
        AppPreferences::new(SqlitePreferenceStore::new(&conn))
            .set_fallback_display_name("  Grace ")
            .unwrap();
        let settings = SettingsService::new(&conn);
        let profile = settings.set_default_lead_hours(6, NOW).unwrap();
        assert_eq!(profile.display_name, "Grace");
        assert_eq!(profile.default_reminder_lead_hours, 6);

        let stored = SqliteProfileRepository::new(&conn)
            .primary_profile()
            .unwrap()
            .unwrap();
        assert_eq!(stored.uuid, profile.uuid);
        assert_eq!(stored.default_reminder_lead_hours, 6);
    }

    #[test]
    fn reset_removes_everything_and_cancels_reminders() {
        let conn = open_db_in_memory().unwrap();
        let calendar = ZonedCalendar::utc();
        let settings = SettingsService::new(&conn);
        settings.add_mock_data(NOW, &calendar).unwrap();

        let mut done = Task::new("done", NOW, NOW);
        done.set_status(TaskStatus::Completed, NOW);
        SqliteTaskRepository::new(&conn).create_task(&done).unwrap();
        assert_eq!(settings.completed_task_count().unwrap(), 1);

        let scheduler = ReminderScheduler::new(NotificationOutbox::new(), ZonedCalendar::utc());
        settings.reset_data(&scheduler).unwrap();

        assert_eq!(SqliteTaskRepository::new(&conn).count_tasks().unwrap(), 0);
        assert!(SqliteCourseRepository::new(&conn).list_courses().unwrap().is_empty());
        assert!(SqliteProfileRepository::new(&conn).primary_profile().unwrap().is_none());
        assert_eq!(settings.active_term_name().unwrap(), NO_ACTIVE_TERM_LABEL);

        let cancels = scheduler
            .platform()
            .drain()
            .into_iter()
            .filter(|command| matches!(command, NotificationCommand::Cancel(_)))
            .count();
        assert_eq!(cancels, 4);
    }
}
