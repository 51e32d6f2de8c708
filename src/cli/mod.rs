//! CLI module
//!
//! Provides:
//! - Argument parsing
//! - Session wiring from settings (credential storage, enhancer, clipboard)
//! - Non-interactive mode dispatch (enhance, reset-key)

pub mod args;
pub mod dispatch;

// Re-exports
pub use args::{parse_args, Args, Mode};
pub use dispatch::{build_credential_store, build_session, run_cli_mode, run_enhance, ExitCode};

use crate::config::ConfigError;
use crate::llm::{AdapterError, EnhanceError};

/// Environment variable consulted by `enhance` when no key is stored
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Adapter setup failed: {0}")]
    Adapter(#[from] AdapterError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No API key: unlock the workspace in the TUI or set GEMINI_API_KEY")]
    MissingCredential,

    #[error("{0}")]
    Enhance(#[from] EnhanceError),
}

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;
