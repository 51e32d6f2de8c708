//! Credential Store
//!
//! Session-scoped holder of the single API key. This is a convenience cache,
//! not a secrets vault: no encryption, no expiry beyond the login session.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name used by `FileStorage` inside its directory
const KEY_FILE: &str = "session-key";

/// API key for the generation service
///
/// Always non-blank. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Trim and validate raw input; blank input yields `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ApiKey(trimmed.to_string()))
        }
    }

    /// Raw key text, for request headers only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Session-scoped key-value slot for a single string
pub trait SessionStorage: Send {
    fn get(&self) -> Result<Option<String>, StorageError>;
    fn put(&mut self, value: &str) -> Result<(), StorageError>;
    fn delete(&mut self) -> Result<(), StorageError>;
}

/// In-process storage; dies with the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    value: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(self.value.clone())
    }

    fn put(&mut self, value: &str) -> Result<(), StorageError> {
        self.value = Some(value.to_string());
        Ok(())
    }

    fn delete(&mut self) -> Result<(), StorageError> {
        self.value = None;
        Ok(())
    }
}

/// File-backed storage
///
/// Meant to live in the per-login runtime directory (`$XDG_RUNTIME_DIR`),
/// which the OS wipes at logout.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store the key at an explicit path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location under the runtime directory, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::runtime_dir().map(|dir| dir.join("promptalchemy").join(KEY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn get(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    fn put(&mut self, value: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.write_all(value.as_bytes())
            .map_err(|e| StorageError::io(&self.path, e))?;
        Ok(())
    }

    fn delete(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }
}

/// Holds the current key and mirrors it into session storage
///
/// Storage failures are logged and never block the in-process session:
/// a key that could not be persisted still unlocks the current run.
pub struct CredentialStore {
    storage: Box<dyn SessionStorage>,
    current: Option<ApiKey>,
}

impl CredentialStore {
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Self {
            storage,
            current: None,
        }
    }

    /// In-memory store
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Restore a previously set key, if the session still has one
    pub fn load(&mut self) -> Option<ApiKey> {
        let restored = match self.storage.get() {
            Ok(value) => value.as_deref().and_then(ApiKey::parse),
            Err(e) => {
                warn!(error = %e, "could not read stored API key");
                None
            }
        };
        debug!(restored = restored.is_some(), "credential load");
        self.current = restored.clone();
        restored
    }

    /// Remember `key` for the rest of the session
    pub fn set(&mut self, key: ApiKey) {
        if let Err(e) = self.storage.put(key.expose()) {
            warn!(error = %e, "could not persist API key; keeping it in memory only");
        }
        self.current = Some(key);
    }

    /// Forget the key
    pub fn clear(&mut self) {
        if let Err(e) = self.storage.delete() {
            warn!(error = %e, "could not remove stored API key");
        }
        self.current = None;
    }

    /// Current key, if any
    pub fn current(&self) -> Option<&ApiKey> {
        self.current.as_ref()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
