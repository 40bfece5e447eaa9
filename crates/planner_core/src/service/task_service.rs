//! Task use-case service.
//!
//! # Responsibility
//! - Provide task CRUD entry points for UI/FFI callers.
//! - Keep reminders in sync with task state after every committed write.
//!
//! # Invariants
//! - The store write always commits before notification side effects run;
//!   notification failures are logged and never roll back or fail the call.
//! - Completing or deleting a task cancels its reminders.
//! - Authorization is requested lazily when the first task is created.

use crate::model::course::CourseId;
use crate::model::task::{Priority, Task, TaskId, TaskStatus, TaskValidationError, DEFAULT_ESTIMATED_MINUTES};
use crate::model::profile::DEFAULT_REMINDER_LEAD_HOURS;
use crate::notify::{NotificationPlatform, ReminderScheduler, ScheduleOutcome, DEFAULT_SNOOZE_MINUTES};
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::{RepoError, RepoResult};
use crate::time::{Calendar, Clock};
use crate::triage::{DefaultTriageScorer, TriageBucket, TriageScorer};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

#[derive(Debug)]
pub enum TaskServiceError {
    Validation(TaskValidationError),
    TaskNotFound(TaskId),
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TaskNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Editable task fields as submitted by an editor form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub notes: String,
    pub due_at: i64,
    pub estimated_minutes: i64,
    pub priority: Priority,
    pub status: TaskStatus,
    pub course_id: Option<CourseId>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, due_at: i64) -> Self {
        Self {
            title: title.into(),
            notes: String::new(),
            due_at,
            estimated_minutes: DEFAULT_ESTIMATED_MINUTES,
            priority: Priority::Medium,
            status: TaskStatus::NotStarted,
            course_id: None,
        }
    }

    /// Pre-fills a draft from an existing task for editing.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            notes: task.notes.clone(),
            due_at: task.due_at,
            estimated_minutes: task.estimated_minutes,
            priority: task.priority,
            status: task.status,
            course_id: task.course_id,
        }
    }

    fn trimmed_title(&self) -> Result<&str, TaskValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(title)
    }
}

/// Task use-cases over a repository, a reminder scheduler and a clock.
pub struct TaskService<R, P, C, K>
where
    R: TaskRepository,
    P: NotificationPlatform,
    C: Calendar,
    K: Clock,
{
    repo: R,
    scheduler: ReminderScheduler<P, C>,
    clock: K,
    scorer: DefaultTriageScorer,
    lead_hours: i64,
}

impl<R, P, C, K> TaskService<R, P, C, K>
where
    R: TaskRepository,
    P: NotificationPlatform,
    C: Calendar,
    K: Clock,
{
    pub fn new(repo: R, scheduler: ReminderScheduler<P, C>, clock: K) -> Self {
        Self {
            repo,
            scheduler,
            clock,
            scorer: DefaultTriageScorer,
            lead_hours: DEFAULT_REMINDER_LEAD_HOURS,
        }
    }

    /// Overrides reminder lead hours, normally taken from the student profile.
    pub fn with_lead_hours(mut self, lead_hours: i64) -> Self {
        self.lead_hours = lead_hours;
        self
    }

    pub fn lead_hours(&self) -> i64 {
        self.lead_hours
    }

    pub fn scheduler(&self) -> &ReminderScheduler<P, C> {
        &self.scheduler
    }

    /// Creates a task from editor input.
    ///
    /// # Contract
    /// - Title and notes are trimmed; blank titles are rejected.
    /// - `completed_at` is stamped when the draft is already completed.
    /// - The first task in an empty store triggers an authorization request.
    pub fn create_task(&self, draft: &TaskDraft) -> TaskServiceResult<Task> {
        let title = draft.trimmed_title()?;
        let now = self.clock.now_ms();
        let is_first_task = self.repo.count_tasks()? == 0;

        let mut task = Task::new(title, draft.due_at, now);
        apply_draft(&mut task, draft, title, now);
        self.repo.create_task(&task)?;
        info!("event=task_create module=service status=ok first_task={is_first_task}");

        if is_first_task {
            self.scheduler.request_authorization();
        }
        if !task.is_completed() {
            self.sync_reminder(&task, now);
        }
        Ok(task)
    }

    /// Replaces editable fields of an existing task.
    pub fn update_task(&self, id: TaskId, draft: &TaskDraft) -> TaskServiceResult<Task> {
        let title = draft.trimmed_title()?;
        let now = self.clock.now_ms();
        let mut task = self.require_task(id)?;

        apply_draft(&mut task, draft, title, now);
        self.repo.update_task(&task)?;
        info!("event=task_update module=service status=ok");

        self.sync_reminder(&task, now);
        Ok(task)
    }

    pub fn set_status(&self, id: TaskId, status: TaskStatus) -> TaskServiceResult<Task> {
        let now = self.clock.now_ms();
        let mut task = self.require_task(id)?;
        // A fresh transition restamps completion time.
        task.completed_at = None;
        task.set_status(status, now);
        self.repo.update_task(&task)?;
        info!(
            "event=task_status module=service status=ok task_status={}",
            status.as_str()
        );

        self.sync_reminder(&task, now);
        Ok(task)
    }

    /// Completed becomes in-progress; anything else becomes completed.
    pub fn toggle_completion(&self, id: TaskId) -> TaskServiceResult<Task> {
        let current = self.require_task(id)?;
        let next = if current.is_completed() {
            TaskStatus::InProgress
        } else {
            TaskStatus::Completed
        };
        self.set_status(id, next)
    }

    /// Deletes a task and cancels its reminders. Idempotent.
    pub fn delete_task(&self, id: TaskId) -> TaskServiceResult<bool> {
        self.scheduler.cancel(id);
        let removed = self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Copies a task as not-started and schedules its reminder.
    pub fn duplicate_task(&self, id: TaskId) -> TaskServiceResult<Task> {
        let now = self.clock.now_ms();
        let source = self.require_task(id)?;

        let mut copy = Task::new(source.title.clone(), source.due_at, now);
        copy.notes = source.notes.clone();
        copy.estimated_minutes = source.estimated_minutes;
        copy.priority = source.priority;
        copy.course_id = source.course_id;
        self.repo.create_task(&copy)?;
        info!("event=task_duplicate module=service status=ok");

        self.sync_reminder(&copy, now);
        Ok(copy)
    }

    /// Pushes the due date one calendar day later.
    ///
    /// The due date is left unchanged when the calendar cannot resolve the
    /// shifted local time.
    pub fn defer_one_day(&self, id: TaskId) -> TaskServiceResult<Task> {
        let now = self.clock.now_ms();
        let mut task = self.require_task(id)?;
        task.due_at = self
            .scheduler
            .calendar()
            .add_days(task.due_at, 1)
            .unwrap_or(task.due_at);
        self.repo.update_task(&task)?;
        info!("event=task_defer module=service status=ok");

        if !task.is_completed() {
            self.sync_reminder(&task, now);
        }
        Ok(task)
    }

    /// Registers a one-off reminder `DEFAULT_SNOOZE_MINUTES` from now.
    pub fn snooze(&self, id: TaskId) -> TaskServiceResult<()> {
        let task = self.require_task(id)?;
        if let Err(err) = self.scheduler.schedule_snooze(&task, DEFAULT_SNOOZE_MINUTES) {
            warn!("event=reminder_snooze module=service status=error error={err}");
        }
        Ok(())
    }

    /// Deletes all completed tasks, cancelling their reminders.
    pub fn clear_completed(&self) -> TaskServiceResult<usize> {
        let removed = self.repo.delete_completed()?;
        for id in &removed {
            self.scheduler.cancel(*id);
        }
        info!(
            "event=task_clear_completed module=service status=ok removed={}",
            removed.len()
        );
        Ok(removed.len())
    }

    /// Re-registers reminders for all active tasks, e.g. after a lead-hours change.
    pub fn reschedule_active(&self) -> TaskServiceResult<usize> {
        let now = self.clock.now_ms();
        let tasks = self.repo.list_tasks(&TaskListQuery::active())?;
        for task in &tasks {
            self.scheduler.cancel(task.uuid);
            self.sync_reminder(task, now);
        }
        Ok(tasks.len())
    }

    /// Buckets active tasks relative to the clock's current time.
    pub fn triage(&self) -> TaskServiceResult<TriageBucket> {
        let tasks = self.repo.list_tasks(&TaskListQuery::active())?;
        Ok(self
            .scorer
            .bucketize(tasks, self.clock.now_ms(), self.scheduler.calendar()))
    }

    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    pub fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(query)
    }

    fn require_task(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }

    fn sync_reminder(&self, task: &Task, now: i64) {
        match self.scheduler.schedule_if_needed(task, self.lead_hours, now) {
            Ok(ScheduleOutcome::Scheduled(_)) => {
                debug!("event=reminder_sync module=service status=ok outcome=scheduled")
            }
            Ok(ScheduleOutcome::Skipped) => {
                debug!("event=reminder_sync module=service status=ok outcome=skipped")
            }
            Ok(ScheduleOutcome::Cancelled) => {
                debug!("event=reminder_sync module=service status=ok outcome=cancelled")
            }
            Err(err) => warn!("event=reminder_sync module=service status=error error={err}"),
        }
    }
}

fn apply_draft(task: &mut Task, draft: &TaskDraft, title: &str, now: i64) {
    task.title = title.to_string();
    task.notes = draft.notes.trim().to_string();
    task.due_at = draft.due_at;
    task.estimated_minutes = draft.estimated_minutes;
    task.priority = draft.priority;
    task.course_id = draft.course_id;
    task.set_status(draft.status, now);
}
