//! Where exported payloads go and imported payloads come from.
//!
//! [`PayloadStore`] is the boundary for import/export files. [`DialogStore`] asks the
//! user through native dialogs; [`DirectoryStore`] reads and writes a fixed directory
//! (headless use and tests).

use crate::error::{StarrError, StarrResult};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Persist `bytes`, returning the path written.
    async fn write(&self, suggested_name: &str, bytes: Vec<u8>) -> StarrResult<Utf8PathBuf>;

    /// Load a payload, returning where it came from.
    async fn read(&self, suggested_name: &str) -> StarrResult<(Utf8PathBuf, Vec<u8>)>;
}

/// Reads and writes `<dir>/<suggested_name>`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: Utf8PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }
}

#[async_trait]
impl PayloadStore for DirectoryStore {
    async fn write(&self, suggested_name: &str, bytes: Vec<u8>) -> StarrResult<Utf8PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(suggested_name);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Wrote payload to {}", path);
        Ok(path)
    }

    async fn read(&self, suggested_name: &str) -> StarrResult<(Utf8PathBuf, Vec<u8>)> {
        let path = self.dir.join(suggested_name);
        let bytes = tokio::fs::read(&path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path);
        Ok((path, bytes))
    }
}

/// Native save/open dialogs, starting in `default_dir`.
///
/// Dialogs run on a blocking thread so the async runtime keeps serving other calls.
#[derive(Debug, Clone)]
pub struct DialogStore {
    default_dir: Utf8PathBuf,
}

impl DialogStore {
    pub fn new(default_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            default_dir: default_dir.into(),
        }
    }

    /// Show a JSON file dialog on a blocking thread and return the chosen path.
    async fn ask(
        &self,
        title: &'static str,
        suggested_name: &str,
        save: bool,
    ) -> StarrResult<Utf8PathBuf> {
        let dir = self.default_dir.clone();
        let file_name = suggested_name.to_string();

        let picked = tokio::task::spawn_blocking(move || {
            let dialog = rfd::FileDialog::new()
                .set_title(title)
                .set_directory(dir.as_std_path())
                .set_file_name(&file_name)
                .add_filter("JSON", &["json"]);
            if save {
                dialog.save_file()
            } else {
                dialog.pick_file()
            }
        })
        .await
        .map_err(|e| StarrError::Io(std::io::Error::other(e)))?;

        utf8_path(picked.ok_or(StarrError::Cancelled)?)
    }
}

#[async_trait]
impl PayloadStore for DialogStore {
    async fn write(&self, suggested_name: &str, bytes: Vec<u8>) -> StarrResult<Utf8PathBuf> {
        let path = self.ask("Export", suggested_name, true).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Wrote payload to {}", path);
        Ok(path)
    }

    async fn read(&self, suggested_name: &str) -> StarrResult<(Utf8PathBuf, Vec<u8>)> {
        let path = self.ask("Import", suggested_name, false).await?;
        let bytes = tokio::fs::read(&path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path);
        Ok((path, bytes))
    }
}

fn utf8_path(path: std::path::PathBuf) -> StarrResult<Utf8PathBuf> {
    Utf8PathBuf::try_from(path).map_err(|e| {
        tracing::error!("Failed to convert path to UTF-8: {}", e);
        StarrError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    })
}
