//! Transient user-facing notifications (toasts)

use std::time::Duration;

/// Fixed lifetime of a notification
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Notification kind - drives styling only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Success,
}

/// A transient status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Fixed notification texts
pub mod messages {
    pub const KEY_ACCEPTED: &str = "Key accepted. Forge ready.";
    pub const KEY_CLEARED: &str = "Key cleared. Workspace locked.";
    pub const ENHANCED: &str = "Prompt successfully refined!";
    pub const COPIED: &str = "Copied to clipboard!";
    pub const COPY_FAILED: &str = "Could not copy to clipboard.";
}
