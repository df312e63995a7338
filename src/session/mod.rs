//! Session token storage.
//!
//! The session is a single opaque bearer token. Controllers read it once when
//! they are built and pass it explicitly on every API call.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to persist session: {0}")]
    Io(#[from] std::io::Error),
}

/// Get/set contract over the session token
pub trait SessionStore: Send + Sync {
    /// Current token, `None` when absent or blank
    fn get_session_token(&self) -> Option<String>;

    fn set_session_token(&self, token: &str) -> Result<(), SessionError>;

    fn clear_session(&self) -> Result<(), SessionError>;

    fn has_session(&self) -> bool {
        self.get_session_token().is_some()
    }
}

fn normalize(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Process-lifetime session, the analogue of browser session storage
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(normalize(token)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get_session_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_session_token(&self, token: &str) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = normalize(token);
        Ok(())
    }

    fn clear_session(&self) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Session persisted in a single file, so separate CLI runs share a login
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get_session_token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => normalize(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Could not read session file {}: {}", self.path.display(), e);
                None
            },
        }
    }

    fn set_session_token(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token.trim())?;
        log::debug!("Session stored in {}", self.path.display());
        Ok(())
    }

    fn clear_session(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
