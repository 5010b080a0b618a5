//! Advisory notifications attached to results for presentation.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub header: String,
    pub message: String,
    pub severity: NotificationSeverity,
}

impl Notification {
    pub fn success(header: String, message: String) -> Self {
        Self {
            header,
            message,
            severity: NotificationSeverity::Success,
        }
    }
}

/// A value plus the notifications to show alongside it.
#[derive(Debug)]
pub struct WithNotifications<T> {
    pub value: T,
    pub notifications: Vec<Notification>,
}

impl<T> WithNotifications<T> {
    pub fn with_notifications(value: T, notifications: Vec<Notification>) -> Self {
        Self {
            value,
            notifications,
        }
    }
}
