//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose planner use-cases to Dart via FRB sync entry points.
//! - Hand queued notification commands back to the host for delivery.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Errors are reported as `ok=false` plus a message, never as panics.
//! - Every action response carries the notification commands it produced.

use log::warn;
use planner_core::db::open_db;
use planner_core::model::profile::reminder_lead_hours;
use planner_core::notify::NotificationTrigger;
use planner_core::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use planner_core::repo::task_repo::SqliteTaskRepository;
use planner_core::service::dashboard::{load_dashboard, recommended_quick_task_due};
use planner_core::service::settings::SettingsService;
use planner_core::service::task_service::{TaskDraft, TaskServiceError};
use planner_core::time::LocalCalendar;
use planner_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Clock, Course, NotificationCommand, NotificationOutbox, Priority, ReminderScheduler,
    SystemClock, Task, TaskService, ZonedCalendar,
};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const PLANNER_DB_FILE_NAME: &str = "planner.sqlite3";
const PLANNER_DB_PATH_ENV: &str = "PLANNER_DB_PATH";
static PLANNER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Notification command for the host to deliver to the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    /// `authorize|schedule|cancel`.
    pub kind: String,
    pub identifiers: Vec<String>,
    pub title: String,
    pub body: String,
    /// Absolute fire time for deadline reminders.
    pub fire_at_ms: Option<i64>,
    /// Relative delay for snoozed reminders.
    pub after_seconds: Option<i64>,
}

/// Task row as shown in dashboard and list cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: String,
    pub title: String,
    pub due_at_ms: i64,
    /// `low|medium|high`.
    pub priority: String,
    pub estimated_minutes: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassItem {
    pub course_id: String,
    pub name: String,
    pub code: String,
    pub location: String,
    pub start_minute: u16,
    pub end_minute: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardResponse {
    pub ok: bool,
    pub message: String,
    pub headline: String,
    pub subheadline: String,
    pub overdue: Vec<TaskItem>,
    pub today: Vec<TaskItem>,
    pub upcoming: Vec<TaskItem>,
    pub classes: Vec<ClassItem>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerActionResponse {
    pub ok: bool,
    /// Affected task ID when the action targets a single task.
    pub task_id: Option<String>,
    pub message: String,
    pub notifications: Vec<NotificationItem>,
}

impl PlannerActionResponse {
    fn success(
        message: impl Into<String>,
        task_id: Option<String>,
        notifications: Vec<NotificationItem>,
    ) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
            notifications,
        }
    }

    fn failure(operation: &str, err: impl std::fmt::Display) -> Self {
        warn!("event=ffi_call module=ffi status=error op={operation}");
        Self {
            ok: false,
            task_id: None,
            message: format!("{operation} failed: {err}"),
            notifications: Vec::new(),
        }
    }
}

/// Loads the dashboard snapshot for the current local time.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_load() -> DashboardResponse {
    let calendar = ZonedCalendar::local_zone();
    let result = open_planner_db()
        .and_then(|conn| {
            load_dashboard(&conn, SystemClock.now_ms(), &calendar).map_err(|err| err.to_string())
        });
    match result {
        Ok(snapshot) => {
            let (headline, subheadline) = snapshot
                .greeting
                .map(|greeting| (greeting.headline, greeting.subheadline))
                .unwrap_or_default();
            DashboardResponse {
                ok: true,
                message: String::new(),
                headline,
                subheadline,
                overdue: snapshot.triage.overdue.iter().map(to_task_item).collect(),
                today: snapshot.triage.today.iter().map(to_task_item).collect(),
                upcoming: snapshot.triage.upcoming.iter().map(to_task_item).collect(),
                classes: snapshot.featured_classes.iter().map(to_class_item).collect(),
            }
        }
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op=dashboard_load");
            DashboardResponse {
                ok: false,
                message: format!("dashboard_load failed: {err}"),
                headline: String::new(),
                subheadline: String::new(),
                overdue: Vec::new(),
                today: Vec::new(),
                upcoming: Vec::new(),
                classes: Vec::new(),
            }
        }
    }
}

/// Creates a task due at the recommended quick-add time.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create_quick(title: String) -> PlannerActionResponse {
    let due_at = recommended_quick_task_due(SystemClock.now_ms(), &ZonedCalendar::local_zone());
    task_create(title, due_at, None, None)
}

/// Creates a task with an explicit due time.
///
/// `priority` accepts `low|medium|high`; unknown or missing values mean
/// medium. Missing estimates default to 60 minutes.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    title: String,
    due_at_ms: i64,
    estimated_minutes: Option<i64>,
    priority: Option<String>,
) -> PlannerActionResponse {
    let mut draft = TaskDraft::new(title, due_at_ms);
    if let Some(minutes) = estimated_minutes {
        draft.estimated_minutes = minutes;
    }
    draft.priority = priority
        .as_deref()
        .and_then(Priority::parse)
        .unwrap_or(Priority::Medium);
    run_task_action("task_create", "Task created.", |service| {
        service.create_task(&draft).map(|task| Some(task.uuid))
    })
}

/// Completes an active task or reopens a completed one.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_completion(task_id: String) -> PlannerActionResponse {
    with_task_id("task_toggle_completion", &task_id, |id| {
        run_task_action("task_toggle_completion", "Task updated.", |service| {
            service.toggle_completion(id).map(|task| Some(task.uuid))
        })
    })
}

/// Moves the due date one day later.
#[flutter_rust_bridge::frb(sync)]
pub fn task_defer_one_day(task_id: String) -> PlannerActionResponse {
    with_task_id("task_defer_one_day", &task_id, |id| {
        run_task_action("task_defer_one_day", "Task deferred.", |service| {
            service.defer_one_day(id).map(|task| Some(task.uuid))
        })
    })
}

/// Registers a one-hour snooze reminder.
#[flutter_rust_bridge::frb(sync)]
pub fn task_snooze(task_id: String) -> PlannerActionResponse {
    with_task_id("task_snooze", &task_id, |id| {
        run_task_action("task_snooze", "Reminder snoozed.", |service| {
            service.snooze(id).map(|()| Some(id))
        })
    })
}

/// Deletes a task. Deleting a missing task still succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> PlannerActionResponse {
    with_task_id("task_delete", &task_id, |id| {
        run_task_action("task_delete", "Task deleted.", |service| {
            service.delete_task(id).map(|_| Some(id))
        })
    })
}

/// Deletes every completed task.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_clear_completed() -> PlannerActionResponse {
    run_task_action("tasks_clear_completed", "Completed tasks cleared.", |service| {
        service.clear_completed().map(|_| None)
    })
}

/// Removes profiles, terms, courses and tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_reset_data() -> PlannerActionResponse {
    run_settings_action("settings_reset_data", |settings, scheduler| {
        settings
            .reset_data(scheduler)
            .map(|()| "All local data removed.".to_string())
    })
}

/// Seeds mock courses and review tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_add_mock_data() -> PlannerActionResponse {
    run_settings_action("settings_add_mock_data", |settings, scheduler| {
        settings
            .add_mock_data(SystemClock.now_ms(), scheduler.calendar())
            .map(|summary| format!("Added {} course(s), {} task(s).", summary.courses, summary.tasks))
    })
}

/// Removes mock courses and tagged tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_remove_mock_data() -> PlannerActionResponse {
    run_settings_action("settings_remove_mock_data", |settings, scheduler| {
        settings
            .remove_mock_data(scheduler)
            .map(|summary| {
                format!("Removed {} course(s), {} task(s).", summary.courses, summary.tasks)
            })
    })
}

type FfiTaskService<'conn> = TaskService<
    SqliteTaskRepository<'conn>,
    &'conn NotificationOutbox,
    LocalCalendar,
    SystemClock,
>;

fn run_task_action(
    operation: &str,
    message: &str,
    f: impl FnOnce(&FfiTaskService<'_>) -> Result<Option<Uuid>, TaskServiceError>,
) -> PlannerActionResponse {
    let conn = match open_planner_db() {
        Ok(conn) => conn,
        Err(err) => return PlannerActionResponse::failure(operation, err),
    };
    let lead_hours = match SqliteProfileRepository::new(&conn).primary_profile() {
        Ok(profile) => reminder_lead_hours(profile.as_ref()),
        Err(err) => return PlannerActionResponse::failure(operation, err),
    };

    let outbox = NotificationOutbox::new();
    let service = TaskService::new(
        SqliteTaskRepository::new(&conn),
        ReminderScheduler::new(&outbox, ZonedCalendar::local_zone()),
        SystemClock,
    )
    .with_lead_hours(lead_hours);

    match f(&service) {
        Ok(task_id) => PlannerActionResponse::success(
            message,
            task_id.map(|id| id.to_string()),
            drain_notifications(&outbox),
        ),
        Err(err) => PlannerActionResponse::failure(operation, err),
    }
}

fn run_settings_action<E: std::fmt::Display>(
    operation: &str,
    f: impl FnOnce(
        &SettingsService<'_>,
        &ReminderScheduler<&NotificationOutbox, LocalCalendar>,
    ) -> Result<String, E>,
) -> PlannerActionResponse {
    let conn = match open_planner_db() {
        Ok(conn) => conn,
        Err(err) => return PlannerActionResponse::failure(operation, err),
    };
    let outbox = NotificationOutbox::new();
    let scheduler = ReminderScheduler::new(&outbox, ZonedCalendar::local_zone());
    match f(&SettingsService::new(&conn), &scheduler) {
        Ok(message) => {
            PlannerActionResponse::success(message, None, drain_notifications(&outbox))
        }
        Err(err) => PlannerActionResponse::failure(operation, err),
    }
}

fn with_task_id(
    operation: &str,
    raw: &str,
    f: impl FnOnce(Uuid) -> PlannerActionResponse,
) -> PlannerActionResponse {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => f(id),
        Err(err) => PlannerActionResponse::failure(operation, format!("invalid task id: {err}")),
    }
}

fn open_planner_db() -> Result<Connection, String> {
    open_db(resolve_planner_db_path()).map_err(|err| format!("planner DB open failed: {err}"))
}

fn resolve_planner_db_path() -> PathBuf {
    PLANNER_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(PLANNER_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(PLANNER_DB_FILE_NAME)
        })
        .clone()
}

fn drain_notifications(outbox: &NotificationOutbox) -> Vec<NotificationItem> {
    outbox.drain().into_iter().map(to_notification_item).collect()
}

fn to_notification_item(command: NotificationCommand) -> NotificationItem {
    let mut item = NotificationItem {
        kind: String::new(),
        identifiers: Vec::new(),
        title: String::new(),
        body: String::new(),
        fire_at_ms: None,
        after_seconds: None,
    };
    match command {
        NotificationCommand::RequestAuthorization => item.kind = "authorize".to_string(),
        NotificationCommand::Cancel(identifiers) => {
            item.kind = "cancel".to_string();
            item.identifiers = identifiers;
        }
        NotificationCommand::Schedule(request) => {
            item.kind = "schedule".to_string();
            item.identifiers = vec![request.identifier];
            item.title = request.title;
            item.body = request.body;
            match request.trigger {
                NotificationTrigger::At { fire_at_ms } => item.fire_at_ms = Some(fire_at_ms),
                NotificationTrigger::After { seconds } => item.after_seconds = Some(seconds),
            }
        }
    }
    item
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        task_id: task.uuid.to_string(),
        title: task.title.clone(),
        due_at_ms: task.due_at,
        priority: task.priority.as_str().to_string(),
        estimated_minutes: task.estimated_minutes,
        status: task.status.as_str().to_string(),
    }
}

fn to_class_item(course: &Course) -> ClassItem {
    ClassItem {
        course_id: course.uuid.to_string(),
        name: course.name.clone(),
        code: course.code.clone(),
        location: course.location.clone(),
        start_minute: course.start_minute,
        end_minute: course.end_minute,
    }
}
