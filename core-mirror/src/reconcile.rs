//! # Reconciliation Engine
//!
//! Diffs remote album membership against the local album tree and produces
//! the ordered list of [`Operation`]s that converges the tree.
//!
//! ## Algorithm
//!
//! 1. Create the album root if it is missing.
//! 2. For each remote album, in order:
//!    - skip it if its title is not a single directory name, or was already
//!      handled in this pass
//!    - create its directory if there is none
//!    - link every wanted filename that is not linked yet and exists locally;
//!      count the ones that do not exist locally as missing. A filename
//!      listed twice is handled once.
//!    - unlink every linked filename that is no longer wanted
//! 3. For each local album directory with no remote album: unlink everything
//!    in it, then remove the directory.
//!
//! The executor relies on two ordering guarantees: an album's directory is
//! created before any link inside it, and every link inside an album is
//! removed before the directory is.

use crate::catalog::RemoteAlbum;
use crate::scanner::{DirectoryIndex, LocalImageIndex};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::storage::FileSystemAccess;
use core_runtime::config::ALBUMS_DIR_NAME;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// A single change to the album tree
///
/// Titles and filenames are relative to the album root; only
/// `AddAlbumLink::image_path` is a full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateRootAlbumDir,
    CreateAlbumDir {
        title: String,
    },
    RemoveAlbumDir {
        title: String,
    },
    AddAlbumLink {
        title: String,
        image_path: PathBuf,
        filename: String,
    },
    RemoveAlbumLink {
        title: String,
        filename: String,
    },
}

impl Operation {
    /// Shell-like description, e.g. `ln -s /img/a.jpg albums/Trip/a.jpg`
    pub fn description(&self) -> String {
        let albums = Path::new(ALBUMS_DIR_NAME);
        match self {
            Operation::CreateRootAlbumDir => format!("mkdir {}", albums.display()),
            Operation::CreateAlbumDir { title } => {
                format!("mkdir {}", albums.join(title).display())
            }
            Operation::RemoveAlbumDir { title } => {
                format!("rmdir {}", albums.join(title).display())
            }
            Operation::AddAlbumLink {
                title,
                image_path,
                filename,
            } => format!(
                "ln -s {} {}",
                image_path.display(),
                albums.join(title).join(filename).display()
            ),
            Operation::RemoveAlbumLink { title, filename } => {
                format!("rm {}", albums.join(title).join(filename).display())
            }
        }
    }

    /// The path this operation creates or removes
    pub fn target(&self, albums_root: &Path) -> PathBuf {
        match self {
            Operation::CreateRootAlbumDir => albums_root.to_path_buf(),
            Operation::CreateAlbumDir { title } | Operation::RemoveAlbumDir { title } => {
                albums_root.join(title)
            }
            Operation::AddAlbumLink {
                title, filename, ..
            }
            | Operation::RemoveAlbumLink { title, filename } => {
                albums_root.join(title).join(filename)
            }
        }
    }

    /// Apply the operation under `albums_root`
    pub async fn apply(&self, fs: &dyn FileSystemAccess, albums_root: &Path) -> BridgeResult<()> {
        let target = self.target(albums_root);
        match self {
            Operation::CreateRootAlbumDir | Operation::CreateAlbumDir { .. } => {
                fs.create_dir(&target).await
            }
            Operation::RemoveAlbumDir { .. } => fs.remove_dir(&target).await,
            Operation::AddAlbumLink { image_path, .. } => fs.symlink(image_path, &target).await,
            Operation::RemoveAlbumLink { .. } => fs.remove_file(&target).await,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Everything a reconciliation pass compares
#[derive(Debug, Default)]
pub struct ReconcileInput {
    /// Remote albums in listing order
    pub remote_albums: Vec<RemoteAlbum>,
    /// Album directories currently on disk
    pub directory_index: DirectoryIndex,
    /// Images available to link
    pub local_images: LocalImageIndex,
    /// Whether the album root directory exists
    pub albums_root_exists: bool,
}

/// Wanted images with no local copy, per album
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingImages {
    pub title: String,
    pub count: usize,
}

/// Result of a reconciliation pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Operations to apply, strictly in this order
    pub operations: Vec<Operation>,
    /// Albums with wanted images that are not available locally
    pub missing: Vec<MissingImages>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn missing_total(&self) -> usize {
        self.missing.iter().map(|m| m.count).sum()
    }
}

/// Compute the operations that make the local tree match `input.remote_albums`
pub fn plan(input: ReconcileInput) -> Plan {
    let ReconcileInput {
        remote_albums,
        mut directory_index,
        local_images,
        albums_root_exists,
    } = input;

    let mut plan = Plan::default();
    if !albums_root_exists {
        plan.operations.push(Operation::CreateRootAlbumDir);
    }

    let mut processed: HashSet<String> = HashSet::new();
    for album in remote_albums {
        let title = album.key.title;

        if !is_directory_name(&title) {
            warn!(album = %title, id = %album.key.id, "Skipping album whose title is not a directory name");
            continue;
        }
        if !processed.insert(title.clone()) {
            warn!(album = %title, id = %album.key.id, "Skipping album with duplicate title");
            continue;
        }

        let mut existing = match directory_index.remove(&title) {
            Some(links) => links,
            None => {
                plan.operations.push(Operation::CreateAlbumDir {
                    title: title.clone(),
                });
                HashSet::new()
            }
        };

        let mut missing = 0;
        let mut handled: HashSet<String> = HashSet::new();
        for filename in album.filenames {
            if !handled.insert(filename.clone()) {
                debug!(album = %title, filename = %filename, "Skipping repeated filename");
                continue;
            }
            if existing.remove(&filename) {
                continue;
            }
            match local_images.get(&filename) {
                Some(image_path) => plan.operations.push(Operation::AddAlbumLink {
                    title: title.clone(),
                    image_path: image_path.to_path_buf(),
                    filename,
                }),
                None => missing += 1,
            }
        }

        if missing > 0 {
            warn!(album = %title, missing, "Missing {} images for album {}", missing, title);
            plan.missing.push(MissingImages {
                title: title.clone(),
                count: missing,
            });
        }

        push_link_removals(&mut plan.operations, &title, existing);
    }

    for (title, links) in directory_index.into_sorted() {
        debug!(album = %title, links = links.len(), "Removing album with no remote counterpart");
        push_link_removals(&mut plan.operations, &title, links);
        plan.operations.push(Operation::RemoveAlbumDir { title });
    }

    plan
}

/// True when `title` is exactly one normal path component, so it names a
/// directory directly under the album root
fn is_directory_name(title: &str) -> bool {
    let mut components = Path::new(title).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn push_link_removals(operations: &mut Vec<Operation>, title: &str, links: HashSet<String>) {
    let mut links: Vec<String> = links.into_iter().collect();
    links.sort_unstable();
    operations.extend(links.into_iter().map(|filename| Operation::RemoveAlbumLink {
        title: title.to_string(),
        filename,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::photos::AlbumKey;

    fn remote(id: &str, title: &str, filenames: &[&str]) -> RemoteAlbum {
        RemoteAlbum::new(
            AlbumKey::new(id, title),
            filenames.iter().map(|f| f.to_string()).collect(),
        )
    }

    fn images(names: &[&str]) -> LocalImageIndex {
        let mut index = LocalImageIndex::new();
        for name in names {
            index.insert(*name, format!("/img/{name}"));
        }
        index
    }

    fn add(title: &str, filename: &str) -> Operation {
        Operation::AddAlbumLink {
            title: title.to_string(),
            image_path: PathBuf::from(format!("/img/{filename}")),
            filename: filename.to_string(),
        }
    }

    fn rm(title: &str, filename: &str) -> Operation {
        Operation::RemoveAlbumLink {
            title: title.to_string(),
            filename: filename.to_string(),
        }
    }

    #[test]
    fn test_new_partially_available_album() {
        let plan = plan(ReconcileInput {
            remote_albums: vec![remote("1", "Trip", &["a.jpg", "b.jpg", "c.jpg"])],
            local_images: images(&["a.jpg", "c.jpg"]),
            albums_root_exists: true,
            ..Default::default()
        });

        assert_eq!(
            plan.operations,
            vec![
                Operation::CreateAlbumDir {
                    title: "Trip".to_string()
                },
                add("Trip", "a.jpg"),
                add("Trip", "c.jpg"),
            ]
        );
        assert_eq!(
            plan.missing,
            vec![MissingImages {
                title: "Trip".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_missing_root_created_first() {
        let plan = plan(ReconcileInput {
            remote_albums: vec![remote("1", "Trip", &["a.jpg"])],
            local_images: images(&["a.jpg"]),
            albums_root_exists: false,
            ..Default::default()
        });

        assert_eq!(plan.operations[0], Operation::CreateRootAlbumDir);
        assert_eq!(plan.operations.len(), 3);
    }

    #[test]
    fn test_existing_links_are_kept_and_stale_ones_removed() {
        let mut directory_index = DirectoryIndex::new();
        directory_index.insert_link("Trip", "a.jpg");
        directory_index.insert_link("Trip", "old.jpg");

        let plan = plan(ReconcileInput {
            remote_albums: vec![remote("1", "Trip", &["a.jpg", "b.jpg"])],
            directory_index,
            local_images: images(&["a.jpg", "b.jpg", "old.jpg"]),
            albums_root_exists: true,
        });

        assert_eq!(plan.operations, vec![add("Trip", "b.jpg"), rm("Trip", "old.jpg")]);
        assert!(plan.missing.is_empty());
    }

    #[test]
    fn test_orphan_album_unlinked_then_removed() {
        let mut directory_index = DirectoryIndex::new();
        directory_index.insert_link("Gone", "x.jpg");
        directory_index.insert_link("Gone", "y.jpg");
        directory_index.insert_album("Empty");

        let plan = plan(ReconcileInput {
            directory_index,
            albums_root_exists: true,
            ..Default::default()
        });

        assert_eq!(
            plan.operations,
            vec![
                Operation::RemoveAlbumDir {
                    title: "Empty".to_string()
                },
                rm("Gone", "x.jpg"),
                rm("Gone", "y.jpg"),
                Operation::RemoveAlbumDir {
                    title: "Gone".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_title_skipped_and_left_for_orphan_pass() {
        let plan = plan(ReconcileInput {
            remote_albums: vec![
                remote("1", "Trip", &["a.jpg"]),
                remote("2", "Trip", &["b.jpg"]),
            ],
            local_images: images(&["a.jpg", "b.jpg"]),
            albums_root_exists: true,
            ..Default::default()
        });

        assert_eq!(
            plan.operations,
            vec![
                Operation::CreateAlbumDir {
                    title: "Trip".to_string()
                },
                add("Trip", "a.jpg"),
            ]
        );
    }

    #[test]
    fn test_untitled_album_skipped() {
        let plan = plan(ReconcileInput {
            remote_albums: vec![remote("1", "", &["a.jpg"])],
            local_images: images(&["a.jpg"]),
            albums_root_exists: true,
            ..Default::default()
        });

        assert!(plan.is_empty());
    }

    #[test]
    fn test_titles_outside_album_root_skipped() {
        let plan = plan(ReconcileInput {
            remote_albums: vec![
                remote("1", "/abs", &["a.jpg"]),
                remote("2", "..", &["a.jpg"]),
                remote("3", "a/b", &["a.jpg"]),
                remote("4", ".", &["a.jpg"]),
                remote("5", "../escape", &["a.jpg"]),
                remote("6", "Trip", &["a.jpg"]),
            ],
            local_images: images(&["a.jpg"]),
            albums_root_exists: true,
            ..Default::default()
        });

        assert_eq!(
            plan.operations,
            vec![
                Operation::CreateAlbumDir {
                    title: "Trip".to_string()
                },
                add("Trip", "a.jpg"),
            ]
        );
    }

    #[test]
    fn test_directory_names() {
        assert!(is_directory_name("Trip"));
        assert!(is_directory_name("Summer 2020 (Italy)"));
        assert!(is_directory_name("..hidden.."));
        assert!(!is_directory_name(""));
        assert!(!is_directory_name("/abs"));
        assert!(!is_directory_name(".."));
        assert!(!is_directory_name("a/b"));
    }

    #[test]
    fn test_repeated_filename_linked_once() {
        let first = plan(ReconcileInput {
            remote_albums: vec![remote("1", "Trip", &["a.jpg", "a.jpg", "gone.jpg", "gone.jpg"])],
            local_images: images(&["a.jpg"]),
            albums_root_exists: true,
            ..Default::default()
        });
        assert_eq!(
            first.operations,
            vec![
                Operation::CreateAlbumDir {
                    title: "Trip".to_string()
                },
                add("Trip", "a.jpg"),
            ]
        );
        assert_eq!(first.missing_total(), 1);

        let mut directory_index = DirectoryIndex::new();
        directory_index.insert_link("Trip", "a.jpg");
        let second = plan(ReconcileInput {
            remote_albums: vec![remote("1", "Trip", &["a.jpg", "a.jpg"])],
            directory_index,
            local_images: images(&["a.jpg"]),
            albums_root_exists: true,
        });
        assert!(second.is_empty());
    }

    #[test]
    fn test_already_converged_is_empty() {
        let mut directory_index = DirectoryIndex::new();
        directory_index.insert_link("Trip", "a.jpg");

        let plan = plan(ReconcileInput {
            remote_albums: vec![remote("1", "Trip", &["a.jpg", "gone.jpg"])],
            directory_index,
            local_images: images(&["a.jpg"]),
            albums_root_exists: true,
        });

        assert!(plan.is_empty());
        assert_eq!(plan.missing_total(), 1);
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(Operation::CreateRootAlbumDir.description(), "mkdir albums");
        assert_eq!(
            Operation::RemoveAlbumDir {
                title: "Trip".to_string()
            }
            .to_string(),
            "rmdir albums/Trip"
        );
        assert_eq!(add("Trip", "a.jpg").description(), "ln -s /img/a.jpg albums/Trip/a.jpg");
        assert_eq!(rm("Trip", "a.jpg").description(), "rm albums/Trip/a.jpg");
    }

    #[test]
    fn test_targets() {
        let root = Path::new("/idx/albums");
        assert_eq!(Operation::CreateRootAlbumDir.target(root), root);
        assert_eq!(add("Trip", "a.jpg").target(root), root.join("Trip/a.jpg"));
    }
}
