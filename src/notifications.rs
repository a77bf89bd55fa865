use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::actions::{Action, Payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Danger,
}

/// A toast shown to the user; dismissed automatically after `dismiss_after_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub dismiss_after_ms: u64,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind, dismiss_after: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            dismiss_after_ms: dismiss_after.as_millis() as u64,
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_ms)
    }
}

/// Visible notifications, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationsState {
    pub items: Vec<Notification>,
}

impl NotificationsState {
    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }
}

pub fn reduce(state: &mut NotificationsState, action: &Action) {
    match &action.payload {
        Payload::NotifSend(notification) => {
            state.items.retain(|n| n.id != notification.id);
            state.items.push(notification.clone());
        }
        Payload::NotifDismiss { id } => state.items.retain(|n| n.id != *id),
        _ => {}
    }
}
