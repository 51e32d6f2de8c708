//! Terminal UI for the prompt workspace
//!
//! UI is a deterministic surface over `Session`:
//! - Key events become `Action`s (`input`)
//! - `App` applies them to the session (`state`)
//! - `view` draws whatever the session currently holds
//!
//! Background work (enhancement calls, toast expiry) runs on tokio tasks
//! owned by the session; the UI only drains their events once per tick.

pub mod input;
pub mod state;
pub mod view;

// Re-exports
pub use input::{map_key, render_help, Action};
pub use state::{App, AppState};
pub use view::{draw_ui, render};

/// UI result type
pub type Result<T> = std::result::Result<T, Error>;

/// UI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
