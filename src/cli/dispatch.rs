//! CLI mode dispatch
//!
//! Wires a `Session` from settings and runs the non-interactive modes:
//! - enhance: one enhancement, result on stdout
//! - reset-key: forget the stored key
//!
//! The TUI mode is driven by the binary itself.

use crate::cli::{Error, Mode, Result, API_KEY_ENV, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::{SessionSettings, Settings, StorageKind};
use crate::llm::{EnhanceError, GeminiAdapter};
use crate::session::{
    messages, ApiKey, CredentialStore, EnhanceStart, FileStorage, Session, SystemClipboard,
};
use std::io::Read;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

/// Exit code wrapper for CLI operations
pub type ExitCode = i32;

/// Credential store according to `session.storage`
///
/// Falls back to in-memory storage when the platform has no runtime
/// directory and no explicit path is configured.
pub fn build_credential_store(settings: &SessionSettings) -> CredentialStore {
    match settings.storage {
        StorageKind::Memory => CredentialStore::in_memory(),
        StorageKind::File => match settings.path.clone().or_else(FileStorage::default_path) {
            Some(path) => {
                debug!(path = %path.display(), "file credential storage");
                CredentialStore::new(Box::new(FileStorage::new(path)))
            }
            None => {
                warn!("no runtime directory; API key will be kept in memory only");
                CredentialStore::in_memory()
            }
        },
    }
}

/// Session backed by the Gemini adapter and the system clipboard
pub fn build_session(settings: &Settings, credentials: CredentialStore) -> Result<Session> {
    let adapter = GeminiAdapter::from_settings(&settings.llm)?;
    info!(model = adapter.model(), "enhancer ready");
    Ok(Session::new(
        credentials,
        Arc::new(adapter),
        Box::new(SystemClipboard::new()),
    ))
}

/// Enhance `draft` once and wait for the outcome
///
/// The session must already hold a credential.
pub async fn run_enhance(session: &mut Session, draft: &str) -> Result<String> {
    session.set_draft(draft);
    match session.start_enhance() {
        EnhanceStart::Started(_) => session.wait_for_enhancement().await,
        EnhanceStart::Busy => {
            return Err(Error::Enhance(EnhanceError::Unknown(
                "An enhancement is already in progress.".to_string(),
            )))
        }
        EnhanceStart::Rejected(EnhanceError::MissingCredential) => {
            return Err(Error::MissingCredential)
        }
        EnhanceStart::Rejected(err) => return Err(Error::Enhance(err)),
    }

    match session.last_error() {
        Some(err) => Err(Error::Enhance(err.clone())),
        None => Ok(session.enhanced().to_string()),
    }
}

/// Run a non-interactive mode and return exit code
pub fn run_cli_mode(mode: Mode, settings: &Settings, runtime: &Runtime) -> ExitCode {
    match run_mode(mode, settings, runtime) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                Error::Config(_) | Error::Adapter(_) => EXIT_CONFIG_ERROR,
                _ => EXIT_FAILURE,
            }
        }
    }
}

fn run_mode(mode: Mode, settings: &Settings, runtime: &Runtime) -> Result<()> {
    match mode {
        Mode::Tui => {
            debug!("tui mode is handled by the binary");
            Ok(())
        }
        Mode::Enhance { draft } => {
            let draft = match draft {
                Some(draft) => draft,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let credentials = credentials_for_enhance(&settings.session);
            let mut session = build_session(settings, credentials)?;
            if !session.load_credential() {
                return Err(Error::MissingCredential);
            }

            let enhanced = runtime.block_on(run_enhance(&mut session, &draft))?;
            println!("{}", enhanced);
            Ok(())
        }
        Mode::ResetKey => {
            let mut credentials = build_credential_store(&settings.session);
            credentials.clear();
            println!("{}", messages::KEY_CLEARED);
            Ok(())
        }
    }
}

/// Stored key if any, else a memory-only store seeded from the environment
///
/// A key taken from the environment is never written to session storage.
fn credentials_for_enhance(settings: &SessionSettings) -> CredentialStore {
    let mut stored = build_credential_store(settings);
    if stored.load().is_some() {
        return stored;
    }
    match std::env::var(API_KEY_ENV).ok().as_deref().and_then(ApiKey::parse) {
        Some(key) => {
            debug!("using API key from {}", API_KEY_ENV);
            let mut from_env = CredentialStore::in_memory();
            from_env.set(key);
            from_env
        }
        None => stored,
    }
}
