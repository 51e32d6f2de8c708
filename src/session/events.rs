//! Session events
//!
//! Sent from spawned tasks back to the session owner over an mpsc channel.
//! The owner drains them each UI tick; nothing else mutates session state.

use crate::llm::EnhanceError;
use tokio::sync::mpsc;

/// Channel sender for session events
pub type SessionSender = mpsc::UnboundedSender<SessionEvent>;
/// Channel receiver for session events
pub type SessionReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Event delivered to the session owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// An enhancement call finished (either way)
    EnhanceFinished {
        request_id: u64,
        result: Result<String, EnhanceError>,
    },
    /// A notification's expiry timer fired
    NotificationExpired { generation: u64 },
}
