//! Admin session context for the back-office pages.
//!
//! The session is a single flag persisted between page visits. It is read
//! once when navigation starts and only written by [`SessionStore::login`]
//! and [`SessionStore::logout`].

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Route that guarded pages redirect to.
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("login required")]
    LoginRequired,

    #[error("session storage at {path} failed: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Username and password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Who is looking at the pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "is_admin_authenticated", default)]
    admin: bool,
}

impl Session {
    pub const fn anonymous() -> Self {
        Self { admin: false }
    }

    pub const fn admin() -> Self {
        Self { admin: true }
    }

    pub const fn is_admin(&self) -> bool {
        self.admin
    }

    /// Guard for back-office pages.
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.admin {
            Ok(())
        } else {
            Err(AuthError::LoginRequired)
        }
    }
}

/// File-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted session. A missing or unreadable file is an
    /// anonymous session.
    pub fn load(&self) -> Result<Session, AuthError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Session::anonymous()),
            Err(err) => return Err(self.storage_error(err.into())),
        };

        match serde_json::from_slice(&raw) {
            Ok(session) => Ok(session),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "session file is corrupt; treating visitor as anonymous"
                );
                Ok(Session::anonymous())
            }
        }
    }

    /// Check `given` against the configured admin credentials and persist an
    /// admin session on success. A failed attempt leaves storage untouched.
    pub fn login(&self, given: &Credentials, expected: &Credentials) -> Result<Session, AuthError> {
        if given != expected {
            tracing::warn!(username = %given.username, "rejected admin login");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session::admin();
        self.save(&session)?;
        tracing::info!(username = %given.username, "admin logged in");
        Ok(session)
    }

    /// Forget the admin flag.
    pub fn logout(&self) -> Result<Session, AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(self.storage_error(err.into())),
        }
        tracing::info!("admin logged out");
        Ok(Session::anonymous())
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.storage_error(err.into()))?;
        }
        let raw = serde_json::to_vec(session).map_err(|err| self.storage_error(err.into()))?;
        fs::write(&self.path, raw).map_err(|err| self.storage_error(err.into()))
    }

    fn storage_error(&self, source: anyhow::Error) -> AuthError {
        AuthError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}
