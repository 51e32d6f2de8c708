//! Session: credential lifecycle, notifications and the controller state
//! machine that drives enhancement requests.

pub mod clipboard;
pub mod controller;
pub mod credential;
pub mod events;
pub mod notification;
pub mod stats;

// Re-exports
pub use clipboard::{Clipboard, ClipboardError, SystemClipboard};
pub use controller::{EnhanceStart, Session, SessionState};
pub use credential::{ApiKey, CredentialStore, FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use events::SessionEvent;
pub use notification::{messages, Notification, NotificationKind, NOTIFICATION_TTL};
pub use stats::PromptStats;
