//! User-facing notifications

use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Notification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Error,
    Success,
    Warning,
}

/// A dismissible notification that expires on its own
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Shows one notification at a time; showing a new one replaces the old
pub struct Notifier {
    current: RwLock<Option<Notification>>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: RwLock::new(None),
            ttl,
        }
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.show(NotificationLevel::Error, message.into())
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.show(NotificationLevel::Success, message.into())
    }

    pub fn show(&self, level: NotificationLevel, message: String) -> Notification {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::seconds(5));
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            message,
            expires_at: Utc::now() + ttl,
        };
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Some(notification.clone());
        notification
    }

    /// Dismiss a notification; returns whether it was still shown
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        if current.as_ref().is_some_and(|n| n.id == id) {
            *current = None;
            return true;
        }
        false
    }

    /// The notification currently shown, if it has not expired
    pub fn active(&self) -> Option<Notification> {
        self.active_at(Utc::now())
    }

    pub fn active_at(&self, now: DateTime<Utc>) -> Option<Notification> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        current.as_ref().filter(|n| now < n.expires_at).cloned()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
