//! Integration tests for complete mirror runs
//!
//! These tests drive `MirrorCoordinator` against an in-memory photo library
//! and a real temporary directory tree:
//! - First run builds the album tree
//! - A second run with no changes plans nothing
//! - Links follow remote membership and local availability
//! - Orphan albums are emptied and removed
//! - Fetch failures abort before anything is touched
//! - Dry runs leave the tree alone

#![cfg(unix)]

use async_trait::async_trait;
use bridge_desktop::TokioFileSystem;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    photos::{AlbumKey, MediaItem, MediaSearch, Page, PhotoLibrary},
    time::Clock,
};
use chrono::{DateTime, TimeZone, Utc};
use core_mirror::{MirrorCoordinator, MirrorError};
use core_runtime::config::{DateSummaryConfig, MirrorConfig};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Doubles
// ============================================================================

/// In-memory photo library serving small pages so pagination is exercised
struct FakeLibrary {
    albums: Mutex<Vec<(AlbumKey, Vec<MediaItem>)>>,
    page_limit: usize,
    failing_album: Option<String>,
}

impl FakeLibrary {
    fn new() -> Self {
        Self {
            albums: Mutex::new(Vec::new()),
            page_limit: 2,
            failing_album: None,
        }
    }

    fn with_album(self, id: &str, title: &str, filenames: &[&str]) -> Self {
        let items = filenames
            .iter()
            .enumerate()
            .map(|(i, name)| MediaItem::new(*name, format!("2021-0{}-15T10:00:00Z", i % 9 + 1)))
            .collect();
        self.albums
            .lock()
            .unwrap()
            .push((AlbumKey::new(id, title), items));
        self
    }

    fn failing_on(mut self, album_id: &str) -> Self {
        self.failing_album = Some(album_id.to_string());
        self
    }

    fn set_album_members(&self, id: &str, filenames: &[&str]) {
        let mut albums = self.albums.lock().unwrap();
        if let Some((_, items)) = albums.iter_mut().find(|(key, _)| key.id == id) {
            *items = filenames
                .iter()
                .map(|name| MediaItem::new(*name, "2021-01-01T00:00:00Z"))
                .collect();
        }
    }

    fn remove_album(&self, id: &str) {
        self.albums.lock().unwrap().retain(|(key, _)| key.id != id);
    }

    fn page<T: Clone>(&self, all: &[T], page_size: u32, token: Option<String>) -> Page<T> {
        let start: usize = token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let size = (page_size as usize).min(self.page_limit);
        let end = (start + size).min(all.len());
        let next = (end < all.len()).then(|| end.to_string());
        Page::new(all[start..end].to_vec(), next)
    }
}

#[async_trait]
impl PhotoLibrary for FakeLibrary {
    async fn list_albums(
        &self,
        page_size: u32,
        page_token: Option<String>,
    ) -> BridgeResult<Page<AlbumKey>> {
        let keys: Vec<AlbumKey> = self
            .albums
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect();
        Ok(self.page(&keys, page_size, page_token))
    }

    async fn search_media_items(
        &self,
        search: &MediaSearch,
        page_size: u32,
        page_token: Option<String>,
    ) -> BridgeResult<Page<MediaItem>> {
        let items: Vec<MediaItem> = {
            let albums = self.albums.lock().unwrap();
            match search {
                MediaSearch::Album { album_id } => {
                    if self.failing_album.as_deref() == Some(album_id.as_str()) {
                        return Err(BridgeError::OperationFailed("HTTP 500 error".to_string()));
                    }
                    albums
                        .iter()
                        .find(|(key, _)| &key.id == album_id)
                        .map(|(_, items)| items.clone())
                        .unwrap_or_default()
                }
                MediaSearch::DateRange { .. } | MediaSearch::All => {
                    albums.iter().flat_map(|(_, items)| items.clone()).collect()
                }
            }
        };
        Ok(self.page(&items, page_size, page_token))
    }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Workspace {
    _tmp: tempfile::TempDir,
    index_root: PathBuf,
    image_root: PathBuf,
}

impl Workspace {
    fn new(images: &[&str]) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().canonicalize().unwrap();
        let index_root = base.join("index");
        let image_root = base.join("images");
        fs::create_dir_all(&index_root).unwrap();
        fs::create_dir_all(image_root.join("2021")).unwrap();
        for image in images {
            fs::write(image_root.join("2021").join(image), b"jpeg").unwrap();
        }

        Self {
            _tmp: tmp,
            index_root,
            image_root,
        }
    }

    fn config(&self) -> MirrorConfig {
        MirrorConfig::builder()
            .index_root(&self.index_root)
            .image_root(&self.image_root)
            .max_concurrent_fetches(2)
            .build()
            .unwrap()
    }

    fn albums_root(&self) -> PathBuf {
        self.index_root.join("albums")
    }

    fn image(&self, name: &str) -> PathBuf {
        self.image_root.join("2021").join(name)
    }

    /// Links in an album directory, or `None` if the directory is missing
    fn links(&self, title: &str) -> Option<BTreeSet<String>> {
        let dir = self.albums_root().join(title);
        let entries = fs::read_dir(dir).ok()?;
        Some(
            entries
                .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
        )
    }
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn coordinator(config: MirrorConfig, library: Arc<FakeLibrary>) -> MirrorCoordinator {
    let clock = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    MirrorCoordinator::new(
        config,
        library,
        Arc::new(TokioFileSystem::new()),
        Arc::new(FixedClock(clock)),
    )
    .unwrap()
}

fn link_target(link: &Path) -> PathBuf {
    fs::read_link(link).unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_first_run_builds_tree() {
    let ws = Workspace::new(&["a.jpg", "c.jpg", "d.jpg"]);
    let library = Arc::new(
        FakeLibrary::new()
            .with_album("1", "Trip", &["a.jpg", "b.jpg", "c.jpg"])
            .with_album("2", "Family", &["d.jpg"]),
    );

    let report = coordinator(ws.config(), library).run().await.unwrap();

    assert_eq!(report.remote_albums, 2);
    assert_eq!(report.local_images, 3);
    // mkdir albums, mkdir Trip, 2 links, mkdir Family, 1 link
    assert_eq!(report.planned, 6);
    assert_eq!(report.applied, 6);
    assert_eq!(report.failed, 0);
    assert_eq!(report.missing_images, 1);

    assert_eq!(ws.links("Trip"), Some(set(&["a.jpg", "c.jpg"])));
    assert_eq!(ws.links("Family"), Some(set(&["d.jpg"])));
    assert_eq!(
        link_target(&ws.albums_root().join("Trip/a.jpg")),
        ws.image("a.jpg")
    );
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let ws = Workspace::new(&["a.jpg", "c.jpg"]);
    let library = Arc::new(FakeLibrary::new().with_album("1", "Trip", &["a.jpg", "b.jpg", "c.jpg"]));
    let coordinator = coordinator(ws.config(), library);

    let first = coordinator.run().await.unwrap();
    assert!(first.applied > 0);

    let second = coordinator.run().await.unwrap();
    assert_eq!(second.planned, 0);
    assert_eq!(second.applied, 0);
    assert_eq!(second.missing_images, 1);
}

#[tokio::test]
async fn test_membership_changes_are_followed() {
    let ws = Workspace::new(&["a.jpg", "b.jpg", "c.jpg"]);
    let library = Arc::new(FakeLibrary::new().with_album("1", "Trip", &["a.jpg", "b.jpg"]));
    let coordinator = coordinator(ws.config(), Arc::clone(&library));

    coordinator.run().await.unwrap();
    assert_eq!(ws.links("Trip"), Some(set(&["a.jpg", "b.jpg"])));

    library.set_album_members("1", &["b.jpg", "c.jpg", "zzz.jpg"]);
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.planned, 2);
    assert_eq!(ws.links("Trip"), Some(set(&["b.jpg", "c.jpg"])));
}

#[tokio::test]
async fn test_orphan_album_removed() {
    let ws = Workspace::new(&["a.jpg", "b.jpg"]);
    let library = Arc::new(
        FakeLibrary::new()
            .with_album("1", "Trip", &["a.jpg"])
            .with_album("2", "Old", &["a.jpg", "b.jpg"]),
    );
    let coordinator = coordinator(ws.config(), Arc::clone(&library));

    coordinator.run().await.unwrap();
    assert_eq!(ws.links("Old"), Some(set(&["a.jpg", "b.jpg"])));

    library.remove_album("2");
    let report = coordinator.run().await.unwrap();

    // Two unlinks then one rmdir
    assert_eq!(report.planned, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(ws.links("Old"), None);
    assert_eq!(ws.links("Trip"), Some(set(&["a.jpg"])));
    assert!(ws.image("a.jpg").exists());
}

#[tokio::test]
async fn test_fetch_failure_aborts_before_touching_tree() {
    let ws = Workspace::new(&["a.jpg"]);
    let library = Arc::new(
        FakeLibrary::new()
            .with_album("1", "Trip", &["a.jpg"])
            .with_album("2", "Broken", &["a.jpg"])
            .failing_on("2"),
    );

    let err = coordinator(ws.config(), library).run().await.unwrap_err();

    assert!(matches!(err, MirrorError::Fetch(_)));
    assert!(!ws.albums_root().exists());
}

#[tokio::test]
async fn test_missing_image_root_is_fatal() {
    let ws = Workspace::new(&[]);
    let library = Arc::new(FakeLibrary::new().with_album("1", "Trip", &["a.jpg"]));
    let config = MirrorConfig::builder()
        .index_root(&ws.index_root)
        .image_root(ws.image_root.join("does-not-exist"))
        .build()
        .unwrap();

    let err = coordinator(config, library).run().await.unwrap_err();

    assert!(matches!(err, MirrorError::FilesystemWalk { .. }));
    assert!(!ws.albums_root().exists());
}

#[tokio::test]
async fn test_dry_run_leaves_tree_alone() {
    let ws = Workspace::new(&["a.jpg"]);
    let library = Arc::new(FakeLibrary::new().with_album("1", "Trip", &["a.jpg"]));
    let config = MirrorConfig {
        dry_run: true,
        ..ws.config()
    };

    let report = coordinator(config, library).run().await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.planned, 3);
    assert_eq!(report.applied, 0);
    assert!(!ws.albums_root().exists());
}

#[tokio::test]
async fn test_max_albums_limits_albums_considered() {
    let ws = Workspace::new(&["a.jpg"]);
    let library = Arc::new(
        FakeLibrary::new()
            .with_album("1", "A", &["a.jpg"])
            .with_album("2", "B", &["a.jpg"])
            .with_album("3", "C", &["a.jpg"]),
    );
    let config = MirrorConfig {
        max_albums: Some(2),
        ..ws.config()
    };

    let report = coordinator(config, library).run().await.unwrap();

    assert_eq!(report.remote_albums, 2);
    assert!(ws.links("A").is_some());
    assert!(ws.links("B").is_some());
    assert_eq!(ws.links("C"), None);
}

#[tokio::test]
async fn test_duplicate_album_titles_keep_first() {
    let ws = Workspace::new(&["a.jpg", "b.jpg"]);
    let library = Arc::new(
        FakeLibrary::new()
            .with_album("1", "Trip", &["a.jpg"])
            .with_album("2", "Trip", &["b.jpg"]),
    );

    let report = coordinator(ws.config(), library).run().await.unwrap();

    assert_eq!(report.remote_albums, 1);
    assert_eq!(ws.links("Trip"), Some(set(&["a.jpg"])));
}

#[tokio::test]
async fn test_titles_never_escape_album_root() {
    let ws = Workspace::new(&["a.jpg"]);
    let outside = ws.index_root.parent().unwrap().join("outside");
    let library = Arc::new(
        FakeLibrary::new()
            .with_album("1", outside.to_str().unwrap(), &["a.jpg"])
            .with_album("2", "../escaped", &["a.jpg"])
            .with_album("3", "Trip/Day 1", &["a.jpg"])
            .with_album("4", "Trip", &["a.jpg"]),
    );
    let coordinator = coordinator(ws.config(), library);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.failed, 0);
    assert!(!outside.exists());
    assert!(!ws.index_root.join("escaped").exists());
    assert_eq!(ws.links("Trip"), Some(set(&["a.jpg"])));

    let second = coordinator.run().await.unwrap();
    assert_eq!(second.planned, 0);
}

#[tokio::test]
async fn test_repeated_filename_in_album_converges() {
    let ws = Workspace::new(&["a.jpg"]);
    let library = Arc::new(FakeLibrary::new().with_album("1", "Trip", &["a.jpg", "a.jpg"]));
    let coordinator = coordinator(ws.config(), library);

    let first = coordinator.run().await.unwrap();
    assert_eq!(first.planned, 3);
    assert_eq!(first.failed, 0);
    assert_eq!(ws.links("Trip"), Some(set(&["a.jpg"])));

    let second = coordinator.run().await.unwrap();
    assert_eq!(second.planned, 0);
    assert_eq!(second.failed, 0);
}

#[tokio::test]
async fn test_failed_operations_do_not_stop_the_run() {
    let ws = Workspace::new(&["a.jpg", "b.jpg"]);
    let library = Arc::new(
        FakeLibrary::new()
            .with_album("1", "Trip", &["a.jpg", "b.jpg"])
            .with_album("2", "Family", &["b.jpg"]),
    );

    // A regular file where the album directory should be: every operation
    // inside the album fails, the rest still run
    fs::create_dir_all(ws.albums_root()).unwrap();
    fs::write(ws.albums_root().join("Trip"), b"not a directory").unwrap();

    let report = coordinator(ws.config(), library).run().await.unwrap();

    assert_eq!(report.planned, 5);
    assert_eq!(report.failed, 3);
    assert_eq!(report.applied, 2);
    assert_eq!(ws.links("Family"), Some(set(&["b.jpg"])));
}

#[tokio::test]
async fn test_date_summary_counts_images() {
    let ws = Workspace::new(&["a.jpg"]);
    let library = Arc::new(
        FakeLibrary::new()
            .with_album("1", "Trip", &["a.jpg", "b.jpg", "c.jpg"])
            .with_album("2", "Other", &["a.jpg", "d.jpg"]),
    );
    let config = MirrorConfig {
        date_summary: Some(DateSummaryConfig {
            since: None,
            max_images: None,
        }),
        ..ws.config()
    };

    let report = coordinator(config, library).run().await.unwrap();

    // a.jpg appears in both albums but is counted once
    assert_eq!(report.dated_images, Some(4));
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let ws = Workspace::new(&[]);
    let config = MirrorConfig {
        max_concurrent_fetches: 0,
        ..ws.config()
    };

    let result = MirrorCoordinator::new(
        config,
        Arc::new(FakeLibrary::new()),
        Arc::new(TokioFileSystem::new()),
        Arc::new(FixedClock(Utc::now())),
    );

    assert!(matches!(result, Err(MirrorError::Config(_))));
}
