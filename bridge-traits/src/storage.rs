//! File System Abstraction
//!
//! The handful of mutations the mirror applies to the local index tree.
//! Scanning is not part of this trait; it walks the tree directly.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// File system access trait
///
/// Each method maps onto one system call with standard semantics: no parent
/// creation, no recursive removal, no overwrite.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn link_image(fs: &dyn FileSystemAccess, album: &Path, image: &Path) -> Result<()> {
///     fs.create_dir(album).await?;
///     fs.symlink(image, &album.join("a.jpg")).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a single directory
    ///
    /// Fails with `AlreadyExists` if something is already at `path`.
    async fn create_dir(&self, path: &Path) -> Result<()>;

    /// Remove an empty directory
    async fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Create a symbolic link at `link` pointing at `target`
    async fn symlink(&self, target: &Path, link: &Path) -> Result<()>;

    /// Remove a file or symbolic link
    async fn remove_file(&self, path: &Path) -> Result<()>;
}
