//! Refresh token persistence
//!
//! The refresh token is the only long-lived credential an authorizing client
//! needs. `RefreshTokenFile` keeps it in a plain text file: loaded once at
//! startup, written after a successful code exchange. Writes go through a
//! temp file + rename so a crash never leaves a truncated token behind.

use std::path::{Path, PathBuf};

use common::Secret;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// A refresh token stored on disk, one token per file.
#[derive(Debug, Clone)]
pub struct RefreshTokenFile {
    path: PathBuf,
}

impl RefreshTokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token. Surrounding whitespace is trimmed; an empty file is an
    /// error.
    pub async fn load(&self) -> Result<Secret<String>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Io(format!(
                "reading refresh token file {}: {e}",
                self.path.display()
            ))
        })?;
        let contents = Secret::new(contents);
        let token = contents.expose().trim();
        if token.is_empty() {
            return Err(Error::Config(format!(
                "refresh token file {} is empty",
                self.path.display()
            )));
        }
        info!(path = %self.path.display(), "loaded refresh token");
        Ok(Secret::new(token.to_string()))
    }

    /// Persist the token atomically with 0600 permissions.
    pub async fn save(&self, token: &Secret<String>) -> Result<()> {
        if token.is_empty() {
            return Err(Error::Config("refusing to save an empty refresh token".into()));
        }

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            Some(_) => Path::new("."),
            None => {
                return Err(Error::Io(
                    "refresh token path has no parent directory".into(),
                ));
            }
        };
        let tmp_path = dir.join(format!(".refresh_token.tmp.{}", std::process::id()));

        let mut contents = token.expose().clone();
        contents.push('\n');
        let contents = Secret::new(contents);

        if let Err(e) = self.replace_with(&tmp_path, contents.expose().as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e);
        }

        debug!(path = %self.path.display(), "persisted refresh token");
        Ok(())
    }

    /// Write `bytes` to a fresh owner-only `tmp_path`, then move it over the
    /// token file.
    async fn replace_with(&self, tmp_path: &Path, bytes: &[u8]) -> Result<()> {
        // A stale temp file from a crashed run would keep its old mode.
        match tokio::fs::remove_file(tmp_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::Io(format!("removing stale temp refresh token file: {e}"))),
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(tmp_path)
            .await
            .map_err(|e| Error::Io(format!("creating temp refresh token file: {e}")))?;
        file.write_all(bytes)
            .await
            .map_err(|e| Error::Io(format!("writing temp refresh token file: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| Error::Io(format!("syncing temp refresh token file: {e}")))?;
        drop(file);

        tokio::fs::rename(tmp_path, &self.path)
            .await
            .map_err(|e| Error::Io(format!("renaming temp refresh token file: {e}")))
    }
}
