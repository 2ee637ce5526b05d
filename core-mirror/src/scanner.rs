//! # Local Filesystem Scanner
//!
//! Builds the two local indexes a reconciliation needs:
//!
//! - [`LocalImageIndex`]: which images exist under the image root, by filename
//! - [`DirectoryIndex`]: which album directories exist under the album root,
//!   and which filenames each one already links
//!
//! Both scans are blocking directory walks; run them on the blocking pool.
//! Entries whose name starts with `.` are skipped along with everything
//! beneath them.

use crate::error::{MirrorError, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

const HIDDEN_MARKER: char = '.';

/// Available local images, keyed by base filename
#[derive(Debug, Default, Clone)]
pub struct LocalImageIndex {
    images: HashMap<String, PathBuf>,
    duplicates: BTreeSet<String>,
}

impl LocalImageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `filename` at `path`.
    ///
    /// The first path for a filename wins. Later ones are remembered as
    /// duplicates and `false` is returned.
    pub fn insert(&mut self, filename: impl Into<String>, path: impl Into<PathBuf>) -> bool {
        let filename = filename.into();
        if self.images.contains_key(&filename) {
            self.duplicates.insert(filename);
            return false;
        }
        self.images.insert(filename, path.into());
        true
    }

    pub fn get(&self, filename: &str) -> Option<&Path> {
        self.images.get(filename).map(PathBuf::as_path)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.images.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Filenames found more than once during the scan, sorted
    pub fn duplicates(&self) -> impl Iterator<Item = &str> {
        self.duplicates.iter().map(String::as_str)
    }
}

/// Existing album directories and the filenames linked inside them
///
/// Keyed by the directory's base name, so same-named directories at different
/// depths share one entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectoryIndex {
    albums: HashMap<String, HashSet<String>>,
}

impl DirectoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an album directory with no links yet
    pub fn insert_album(&mut self, title: impl Into<String>) {
        self.albums.entry(title.into()).or_default();
    }

    /// Register a linked filename inside an album directory
    pub fn insert_link(&mut self, title: impl Into<String>, filename: impl Into<String>) {
        self.albums
            .entry(title.into())
            .or_default()
            .insert(filename.into());
    }

    pub fn get(&self, title: &str) -> Option<&HashSet<String>> {
        self.albums.get(title)
    }

    pub fn remove(&mut self, title: &str) -> Option<HashSet<String>> {
        self.albums.remove(title)
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Album titles, sorted
    pub fn titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self.albums.keys().map(String::as_str).collect();
        titles.sort_unstable();
        titles
    }

    /// Consume the index, yielding albums sorted by title
    pub fn into_sorted(self) -> Vec<(String, HashSet<String>)> {
        let mut albums: Vec<_> = self.albums.into_iter().collect();
        albums.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        albums
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with(HIDDEN_MARKER))
}

fn file_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

fn visible_entries(root: &Path) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
}

/// Index every image file under `root`.
///
/// Paths are absolute when `root` can be resolved, so they are usable as
/// symlink targets from anywhere. Directories are not indexed and symbolic
/// links are not followed.
pub fn scan_images(root: &Path) -> Result<LocalImageIndex> {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let mut index = LocalImageIndex::new();

    for entry in visible_entries(&root) {
        let entry = entry.map_err(|source| MirrorError::FilesystemWalk {
            path: root.clone(),
            source,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let filename = file_name(&entry);
        if !index.insert(filename.as_str(), entry.path()) {
            debug!(
                filename = %filename,
                path = ?entry.path(),
                "Duplicate image filename, keeping first occurrence"
            );
        }
    }

    let duplicate_count = index.duplicates.len();
    if duplicate_count > 0 {
        warn!(
            count = duplicate_count,
            "Found image filenames present more than once; only the first path is linked"
        );
    }

    info!(root = ?root, images = index.len(), "Scanned local images");
    Ok(index)
}

/// Index album directories and their links under `albums_root`.
///
/// A missing `albums_root` yields an empty index. Every directory becomes a
/// key; every other entry is recorded under its parent directory's name.
/// Entries placed directly in `albums_root` belong to no album and are
/// ignored.
pub fn scan_album_directories(albums_root: &Path) -> Result<DirectoryIndex> {
    let mut index = DirectoryIndex::new();

    for entry in visible_entries(albums_root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 && is_not_found(&err) => {
                debug!(root = ?albums_root, "Album root does not exist yet");
                return Ok(DirectoryIndex::new());
            }
            Err(source) => {
                return Err(MirrorError::FilesystemWalk {
                    path: albums_root.to_path_buf(),
                    source,
                })
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        if entry.file_type().is_dir() {
            index.insert_album(file_name(&entry));
            continue;
        }

        if entry.depth() == 1 {
            debug!(path = ?entry.path(), "Ignoring entry outside any album directory");
            continue;
        }

        let album = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned());
        if let Some(album) = album {
            index.insert_link(album, file_name(&entry));
        }
    }

    info!(root = ?albums_root, albums = index.len(), "Scanned album directories");
    Ok(index)
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == ErrorKind::NotFound)
}
