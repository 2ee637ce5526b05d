//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::FileSystemAccess,
};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Every call is a single `tokio::fs` operation; nothing is created or
/// removed implicitly.
#[derive(Debug, Clone, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn remove_dir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Removed directory");
        Ok(())
    }

    #[cfg(unix)]
    async fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        fs::symlink(target, link)
            .await
            .map_err(Self::map_io_error)?;
        debug!(target = ?target, link = ?link, "Created symlink");
        Ok(())
    }

    #[cfg(not(unix))]
    async fn symlink(&self, _target: &Path, _link: &Path) -> Result<()> {
        Err(BridgeError::NotAvailable(
            "Symbolic links are only supported on unix hosts".to_string(),
        ))
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Removed file");
        Ok(())
    }
}
