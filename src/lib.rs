//! PromptAlchemy: turns rough prompt drafts into structured prompts
//!
//! The library holds everything but terminal setup:
//! - `llm`: the Gemini enhancement client behind the `Enhancer` trait
//! - `session`: credential store and the session state machine
//! - `ui`: ratatui rendering and key mapping
//! - `cli`, `config`, `logging`: process plumbing

pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;
pub mod session;
pub mod ui;

// Re-export the types most callers need
pub use config::Settings;
pub use llm::{EnhanceError, Enhancer, GeminiAdapter};
pub use session::{ApiKey, CredentialStore, Session, SessionState};
