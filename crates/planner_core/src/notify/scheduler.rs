use super::{NotificationError, NotificationPlatform, NotificationRequest, NotificationTrigger};
use crate::model::task::{Task, TaskId};
use crate::time::Calendar;
use crate::triage::ReminderDateCalculator;
use log::{debug, info};
use once_cell::unsync::OnceCell;

pub const DEFAULT_SNOOZE_MINUTES: i64 = 60;

const DEADLINE_TITLE: &str = "Upcoming deadline";
const SNOOZE_TITLE: &str = "Snoozed reminder";

/// Result of a scheduling attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled(NotificationTrigger),
    /// No valid future trigger; nothing registered.
    Skipped,
    /// Task is completed; pending reminders were removed instead.
    Cancelled,
}

pub fn task_identifier(task_id: TaskId) -> String {
    format!("planner.task.{task_id}")
}

pub fn snooze_identifier(task_id: TaskId) -> String {
    format!("planner.task.snooze.{task_id}")
}

/// Converts tasks into platform reminders.
///
/// Authorization is requested at most once per scheduler and cached.
pub struct ReminderScheduler<P: NotificationPlatform, C: Calendar> {
    platform: P,
    calendar: C,
    calculator: ReminderDateCalculator,
    authorization: OnceCell<bool>,
}

impl<P: NotificationPlatform, C: Calendar> ReminderScheduler<P, C> {
    pub fn new(platform: P, calendar: C) -> Self {
        Self {
            platform,
            calendar,
            calculator: ReminderDateCalculator,
            authorization: OnceCell::new(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    pub fn request_authorization(&self) -> bool {
        *self.authorization.get_or_init(|| {
            let granted = self.platform.request_authorization();
            info!(
                "event=notify_authorization module=notify status=ok granted={}",
                granted
            );
            granted
        })
    }

    /// Registers the deadline reminder for `task`, or cancels it when completed.
    pub fn schedule_if_needed(
        &self,
        task: &Task,
        lead_hours: i64,
        now_ms: i64,
    ) -> Result<ScheduleOutcome, NotificationError> {
        if task.is_completed() {
            self.cancel(task.uuid);
            return Ok(ScheduleOutcome::Cancelled);
        }

        let Some(fire_at_ms) = self.calculator.trigger_at(task.due_at, lead_hours, now_ms) else {
            debug!(
                "event=notify_schedule module=notify status=skipped reason=no_future_trigger lead_hours={}",
                lead_hours
            );
            return Ok(ScheduleOutcome::Skipped);
        };

        let trigger = NotificationTrigger::At { fire_at_ms };
        self.platform.schedule(NotificationRequest {
            identifier: task_identifier(task.uuid),
            task_id: task.uuid,
            title: DEADLINE_TITLE.to_string(),
            body: format!(
                "{} is due at {}.",
                task.title,
                self.calendar.format_date_time(task.due_at)
            ),
            trigger,
        })?;
        Ok(ScheduleOutcome::Scheduled(trigger))
    }

    /// Registers a one-off reminder `after_minutes` from now.
    pub fn schedule_snooze(
        &self,
        task: &Task,
        after_minutes: i64,
    ) -> Result<ScheduleOutcome, NotificationError> {
        if after_minutes <= 0 {
            return Ok(ScheduleOutcome::Skipped);
        }
        let Some(seconds) = after_minutes.checked_mul(60) else {
            return Ok(ScheduleOutcome::Skipped);
        };

        let trigger = NotificationTrigger::After { seconds };
        self.platform.schedule(NotificationRequest {
            identifier: snooze_identifier(task.uuid),
            task_id: task.uuid,
            title: SNOOZE_TITLE.to_string(),
            body: format!(
                "{} is still due at {}.",
                task.title,
                self.calendar.format_date_time(task.due_at)
            ),
            trigger,
        })?;
        Ok(ScheduleOutcome::Scheduled(trigger))
    }

    /// Removes deadline and snooze reminders for `task_id`.
    pub fn cancel(&self, task_id: TaskId) {
        self.platform
            .cancel(&[task_identifier(task_id), snooze_identifier(task_id)]);
    }
}
