//! Persisted session artifacts.
//!
//! Flows never touch storage directly; they are handed a [`SessionStore`]
//! and read, write or clear a typed [`Session`] through it.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::models::{TokenPair, UserProfile};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    /// Registered but not yet verified account, awaiting its OTP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_user_id: Option<i64>,
    /// Email or mobile a password reset was requested for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_identifier: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn store_tokens(&mut self, tokens: &TokenPair) {
        self.access_token = Some(tokens.access_token.clone());
        if let Some(refresh) = &tokens.refresh_token {
            self.refresh_token = Some(refresh.clone());
        }
    }

    /// Drops credentials and the cached profile. Pending flow state survives.
    pub fn sign_out(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.user = None;
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse session file {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode session: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

pub trait SessionStore {
    fn load(&self) -> Result<Session, SessionError>;
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;

    fn update(&self, f: &mut dyn FnMut(&mut Session)) -> Result<Session, SessionError> {
        let mut session = self.load()?;
        f(&mut session);
        self.save(&session)?;
        Ok(session)
    }
}

/// JSON file store used by the command-line front end.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, SessionError> {
        if !self.path.exists() {
            log::debug!("no session file at {}", self.path.display());
            return Ok(Session::default());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if raw.trim().is_empty() {
            return Ok(Session::default());
        }
        let session = serde_json::from_str(&raw).map_err(|source| SessionError::Decode {
            path: self.path.display().to_string(),
            source,
        })?;
        log::debug!("session loaded from {}", self.path.display());
        Ok(session)
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let mut body = serde_json::to_string_pretty(session)
            .map_err(|source| SessionError::Encode { source })?;
        body.push('\n');
        let mut file = open_private(&self.path).map_err(|e| self.io_error(e))?;
        restrict_permissions(&self.path).map_err(|e| self.io_error(e))?;
        file.write_all(body.as_bytes()).map_err(|e| self.io_error(e))?;
        log::debug!("session saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("session file {} removed", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Opens the session file for rewriting. A new file is created owner-only,
/// so tokens are never on disk with wider permissions.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Session>,
}

impl MemorySessionStore {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session, SessionError> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Session::default();
        Ok(())
    }
}
