use super::{NotificationError, NotificationPlatform, NotificationRequest};
use std::cell::{Cell, RefCell};

/// Command recorded for a host shell to deliver to the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationCommand {
    RequestAuthorization,
    Schedule(NotificationRequest),
    Cancel(Vec<String>),
}

/// Queue-backed platform: core decides, the host drains and delivers.
///
/// Without a forced answer, authorization is reported optimistically and a
/// `RequestAuthorization` command is queued so the host can prompt.
#[derive(Debug, Default)]
pub struct NotificationOutbox {
    commands: RefCell<Vec<NotificationCommand>>,
    forced_authorization: Option<bool>,
    authorization_requests: Cell<u32>,
}

impl NotificationOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outbox that answers authorization with `authorized` and refuses to
    /// queue schedules when it is `false`.
    pub fn with_forced_authorization(authorized: bool) -> Self {
        Self {
            forced_authorization: Some(authorized),
            ..Self::default()
        }
    }

    pub fn authorization_requests(&self) -> u32 {
        self.authorization_requests.get()
    }

    pub fn pending(&self) -> Vec<NotificationCommand> {
        self.commands.borrow().clone()
    }

    /// Takes all queued commands in insertion order.
    pub fn drain(&self) -> Vec<NotificationCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }
}

impl NotificationPlatform for NotificationOutbox {
    fn request_authorization(&self) -> bool {
        self.authorization_requests
            .set(self.authorization_requests.get() + 1);
        match self.forced_authorization {
            Some(authorized) => authorized,
            None => {
                self.commands
                    .borrow_mut()
                    .push(NotificationCommand::RequestAuthorization);
                true
            }
        }
    }

    fn schedule(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        if self.forced_authorization == Some(false) {
            return Err(NotificationError::PermissionDenied);
        }
        self.commands
            .borrow_mut()
            .push(NotificationCommand::Schedule(request));
        Ok(())
    }

    fn cancel(&self, identifiers: &[String]) {
        self.commands
            .borrow_mut()
            .push(NotificationCommand::Cancel(identifiers.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationCommand, NotificationOutbox};
    use crate::notify::{NotificationError, NotificationPlatform, NotificationRequest, NotificationTrigger};
    use uuid::Uuid;

    fn request() -> NotificationRequest {
        let task_id = Uuid::new_v4();
        NotificationRequest {
            identifier: format!("planner.task.{task_id}"),
            task_id,
            title: "Upcoming deadline".to_string(),
            body: "essay is due".to_string(),
            trigger: NotificationTrigger::At { fire_at_ms: 1 },
        }
    }

    #[test]
    fn drain_returns_commands_in_order_and_empties_queue() {
        let outbox = NotificationOutbox::new();
        assert!(outbox.request_authorization());
        outbox.schedule(request()).unwrap();
        outbox.cancel(&["a".to_string()]);

        let drained = outbox.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0], NotificationCommand::RequestAuthorization);
        assert!(matches!(drained[1], NotificationCommand::Schedule(_)));
        assert_eq!(drained[2], NotificationCommand::Cancel(vec!["a".to_string()]));
        assert!(outbox.drain().is_empty());
    }

    #[test]
    fn forced_denial_rejects_schedules() {
        let outbox = NotificationOutbox::with_forced_authorization(false);
        assert!(!outbox.request_authorization());
        assert_eq!(
            outbox.schedule(request()),
            Err(NotificationError::PermissionDenied)
        );
        assert!(outbox.pending().is_empty());
        assert_eq!(outbox.authorization_requests(), 1);
    }
}
