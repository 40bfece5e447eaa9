use chrono::Utc;
use planner_core::db::open_db_in_memory;
use planner_core::model::task::{Priority, TaskStatus, TaskValidationError};
use planner_core::notify::{
    snooze_identifier, task_identifier, NotificationCommand, NotificationOutbox,
    NotificationTrigger, ReminderScheduler,
};
use planner_core::repo::task_repo::SqliteTaskRepository;
use planner_core::service::task_service::{TaskDraft, TaskService, TaskServiceError};
use planner_core::time::{FixedClock, ZonedCalendar, MS_PER_DAY, MS_PER_HOUR};
use rusqlite::Connection;
use uuid::Uuid;

// Saturday 2024-03-09 16:00:00 UTC
const NOW: i64 = 1_710_000_000_000;

type Service<'a> = TaskService<
    SqliteTaskRepository<'a>,
    &'a NotificationOutbox,
    ZonedCalendar<Utc>,
    &'a FixedClock,
>;

fn service<'a>(conn: &'a Connection, outbox: &'a NotificationOutbox, clock: &'a FixedClock) -> Service<'a> {
    TaskService::new(
        SqliteTaskRepository::new(conn),
        ReminderScheduler::new(outbox, ZonedCalendar::utc()),
        clock,
    )
}

fn scheduled(commands: &[NotificationCommand]) -> Vec<(String, NotificationTrigger)> {
    commands
        .iter()
        .filter_map(|command| match command {
            NotificationCommand::Schedule(request) => {
                Some((request.identifier.clone(), request.trigger))
            }
            _ => None,
        })
        .collect()
}

fn cancelled(commands: &[NotificationCommand]) -> Vec<Vec<String>> {
    commands
        .iter()
        .filter_map(|command| match command {
            NotificationCommand::Cancel(ids) => Some(ids.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn first_create_requests_authorization_once_and_schedules() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::new();
    let clock = FixedClock::new(NOW);
    let service = service(&conn, &outbox, &clock).with_lead_hours(2);

    let first = service
        .create_task(&TaskDraft::new("  Essay  ", NOW + 10 * MS_PER_HOUR))
        .unwrap();
    assert_eq!(first.title, "Essay");
    service
        .create_task(&TaskDraft::new("Reading", NOW + 30 * MS_PER_HOUR))
        .unwrap();

    assert_eq!(outbox.authorization_requests(), 1);
    let commands = outbox.drain();
    assert_eq!(commands[0], NotificationCommand::RequestAuthorization);
    let schedules = scheduled(&commands);
    assert_eq!(schedules.len(), 2);
    assert_eq!(
        schedules[0],
        (
            task_identifier(first.uuid),
            NotificationTrigger::At {
                fire_at_ms: NOW + 8 * MS_PER_HOUR
            }
        )
    );
}

#[test]
fn create_rejects_blank_title_without_side_effects() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::new();
    let clock = FixedClock::new(NOW);
    let service = service(&conn, &outbox, &clock);

    let err = service
        .create_task(&TaskDraft::new("   ", NOW + MS_PER_DAY))
        .unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Validation(TaskValidationError::EmptyTitle)
    ));
    assert!(outbox.pending().is_empty());
}

#[test]
fn reminder_inside_lead_window_is_skipped() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::new();
    let clock = FixedClock::new(NOW);
    let service = service(&conn, &outbox, &clock).with_lead_hours(1);

    service
        .create_task(&TaskDraft::new("Quiz", NOW + 30 * 60 * 1000))
        .unwrap();
    assert!(scheduled(&outbox.drain()).is_empty());
}

#[test]
fn denied_permission_still_commits_task() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::with_forced_authorization(false);
    let clock = FixedClock::new(NOW);
    let service = service(&conn, &outbox, &clock);

    let task = service
        .create_task(&TaskDraft::new("Project", NOW + 3 * MS_PER_DAY))
        .unwrap();
    assert!(service.get_task(task.uuid).unwrap().is_some());
    assert!(outbox.pending().is_empty());
}

#[test]
fn toggle_completion_stamps_and_cancels_then_reopens() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::new();
    let clock = FixedClock::new(NOW);
    let service = service(&conn, &outbox, &clock);
    let task = service
        .create_task(&TaskDraft::new("Essay", NOW + 2 * MS_PER_DAY))
        .unwrap();
    outbox.drain();

    clock.advance(1_000);
    let done = service.toggle_completion(task.uuid).unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(done.completed_at, Some(NOW + 1_000));
    assert_eq!(
        cancelled(&outbox.drain()),
        vec![vec![task_identifier(task.uuid), snooze_identifier(task.uuid)]]
    );

    let reopened = service.toggle_completion(task.uuid).unwrap();
    assert_eq!(reopened.status, TaskStatus::InProgress);
    assert_eq!(reopened.completed_at, None);
    assert_eq!(scheduled(&outbox.drain()).len(), 1);
}

#[test]
fn update_applies_draft_fields() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::new();
    let clock = FixedClock::new(NOW);
    let service = service(&conn, &outbox, &clock);
    let task = service
        .create_task(&TaskDraft::new("Draft", NOW + MS_PER_DAY))
        .unwrap();

    let mut draft = TaskDraft::from_task(&task);
    draft.title = "Final".to_string();
    draft.notes = "  bring printout ".to_string();
    draft.priority = Priority::High;
    draft.estimated_minutes = 15;
    let updated = service.update_task(task.uuid, &draft).unwrap();

    let stored = service.get_task(task.uuid).unwrap().unwrap();
    assert_eq!(stored, updated);
    assert_eq!(stored.title, "Final");
    assert_eq!(stored.notes, "bring printout");
    assert_eq!(stored.priority, Priority::High);

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.update_task(missing, &draft),
        Err(TaskServiceError::TaskNotFound(id)) if id == missing
    ));
}

#[test]
fn duplicate_defer_snooze_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::new();
    let clock = FixedClock::new(NOW);
    let service = service(&conn, &outbox, &clock);
    let task = service
        .create_task(&TaskDraft::new("Reading", NOW + 2 * MS_PER_DAY))
        .unwrap();
    service.set_status(task.uuid, TaskStatus::Completed).unwrap();

    let copy = service.duplicate_task(task.uuid).unwrap();
    assert_ne!(copy.uuid, task.uuid);
    assert_eq!(copy.status, TaskStatus::NotStarted);
    assert_eq!(copy.completed_at, None);
    assert_eq!(copy.title, "Reading");

    let deferred = service.defer_one_day(copy.uuid).unwrap();
    assert_eq!(deferred.due_at, copy.due_at + MS_PER_DAY);

    outbox.drain();
    service.snooze(copy.uuid).unwrap();
    assert_eq!(
        scheduled(&outbox.drain()),
        vec![(
            snooze_identifier(copy.uuid),
            NotificationTrigger::After { seconds: 3_600 }
        )]
    );

    assert!(service.delete_task(copy.uuid).unwrap());
    assert!(!service.delete_task(copy.uuid).unwrap());
    assert_eq!(cancelled(&outbox.drain()).len(), 2);
    assert!(matches!(
        service.snooze(copy.uuid),
        Err(TaskServiceError::TaskNotFound(_))
    ));
}

#[test]
fn clear_completed_cancels_each_removed_task() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::new();
    let clock = FixedClock::new(NOW);
    let service = service(&conn, &outbox, &clock);

    let keep = service
        .create_task(&TaskDraft::new("keep", NOW + MS_PER_DAY))
        .unwrap();
    for title in ["a", "b"] {
        let mut draft = TaskDraft::new(title, NOW + MS_PER_DAY);
        draft.status = TaskStatus::Completed;
        service.create_task(&draft).unwrap();
    }
    outbox.drain();

    assert_eq!(service.clear_completed().unwrap(), 2);
    assert_eq!(cancelled(&outbox.drain()).len(), 2);
    assert!(service.get_task(keep.uuid).unwrap().is_some());
}

#[test]
fn triage_uses_clock_time() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::new();
    let clock = FixedClock::new(NOW);
    let service = service(&conn, &outbox, &clock);

    service
        .create_task(&TaskDraft::new("overdue", NOW - MS_PER_DAY))
        .unwrap();
    service
        .create_task(&TaskDraft::new("today", NOW + MS_PER_HOUR))
        .unwrap();
    service
        .create_task(&TaskDraft::new("upcoming", NOW + 3 * MS_PER_DAY))
        .unwrap();
    service
        .create_task(&TaskDraft::new("far", NOW + 10 * MS_PER_DAY))
        .unwrap();

    let bucket = service.triage().unwrap();
    assert_eq!(bucket.overdue.len(), 1);
    assert_eq!(bucket.today.len(), 1);
    assert_eq!(bucket.upcoming.len(), 1);

    clock.advance(MS_PER_DAY);
    let bucket = service.triage().unwrap();
    assert_eq!(bucket.overdue.len(), 2);
    assert!(bucket.today.is_empty());
}

#[test]
fn reschedule_active_reregisters_with_new_lead() {
    let conn = open_db_in_memory().unwrap();
    let outbox = NotificationOutbox::new();
    let clock = FixedClock::new(NOW);
    service(&conn, &outbox, &clock)
        .create_task(&TaskDraft::new("Exam", NOW + 2 * MS_PER_DAY))
        .unwrap();
    outbox.drain();

    let service = service(&conn, &outbox, &clock).with_lead_hours(1);
    assert_eq!(service.reschedule_active().unwrap(), 1);
    let schedules = scheduled(&outbox.drain());
    assert_eq!(
        schedules[0].1,
        NotificationTrigger::At {
            fire_at_ms: NOW + 2 * MS_PER_DAY - MS_PER_HOUR
        }
    );
}
