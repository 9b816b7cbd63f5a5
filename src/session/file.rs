//! File-backed token store
//!
//! Persists the session as a small JSON document holding the
//! `access_token` and `refresh_token` keys. Writes go through a temp file
//! and a rename so a crash never leaves a half-written session behind.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::{SessionError, SessionResult};
use super::store::{TokenPair, TokenStore};

/// On-disk layout. Both keys are optional so a damaged file can be detected
/// instead of failing to parse.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Token store persisted to a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location
    pub fn default_location() -> SessionResult<Self> {
        default_session_path()
            .map(Self::new)
            .ok_or(SessionError::NoLocation)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, error: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            error,
        }
    }

    async fn remove(&self) -> SessionResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// `<data_local_dir>/advision/session.json`
pub fn default_session_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("advision").join("session.json"))
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> SessionResult<Option<TokenPair>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let file: SessionFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Discarding unreadable session file");
                self.remove().await?;
                return Ok(None);
            }
        };

        match (file.access_token, file.refresh_token) {
            (Some(access), Some(refresh)) => Ok(Some(TokenPair { access, refresh })),
            (None, None) => Ok(None),
            _ => {
                tracing::warn!(path = ?self.path, "Discarding session file with a single token");
                self.remove().await?;
                Ok(None)
            }
        }
    }

    async fn set(&self, tokens: &TokenPair) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let file = SessionFile {
            access_token: Some(tokens.access.clone()),
            refresh_token: Some(tokens.refresh.clone()),
        };
        let content = serde_json::to_vec_pretty(&file)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| self.io_error(e))?;
        }

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }

    async fn clear(&self) -> SessionResult<()> {
        self.remove().await
    }
}
