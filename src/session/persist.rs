//! Caller-owned persistence for the access token.
//!
//! The orchestrator never reads or writes this on its own: the caller
//! decides whether the token outlives the process, saves it after a
//! successful login, and feeds it back through [`AuthClient::restore`]
//! on the next start.
//!
//! [`AuthClient::restore`]: crate::client::AuthClient::restore

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Storage abstraction for the persisted access token.
pub trait TokenCache: Send + Sync {
    fn load(&self) -> Result<Option<String>, AuthError>;
    fn save(&self, access_token: &str) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// File-backed token cache using a versioned TOML document.
///
/// # Example
/// ```no_run
/// use twofold::session::{FileTokenCache, TokenCache};
///
/// let cache = FileTokenCache::new_default();
/// cache.save("access-token")?;
/// assert!(cache.load()?.is_some());
/// # Ok::<(), twofold::error::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenCache {
    base_dir: PathBuf,
}

impl FileTokenCache {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_twofold_dir(),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.base_dir.join("session.toml")
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl TokenCache for FileTokenCache {
    fn load(&self) -> Result<Option<String>, AuthError> {
        let path = self.session_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: SessionFile = toml::from_str(&raw)?;
        Ok(Some(file.access_token))
    }

    fn save(&self, access_token: &str) -> Result<(), AuthError> {
        let path = self.session_path();
        Self::ensure_parent(&path)?;
        let file = SessionFile {
            version: 1,
            access_token: access_token.to_string(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(self.session_path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    access_token: String,
    saved_at: DateTime<Utc>,
}

fn default_twofold_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".twofold"))
        .unwrap_or_else(|| PathBuf::from(".twofold"))
}
