//! # Album Mirror Core
//!
//! Mirrors remote photo albums onto a local directory tree of symbolic links.
//!
//! ## Overview
//!
//! A run rebuilds every index from scratch, diffs them and applies the
//! difference:
//!
//! - [`catalog`] - paginated remote album and media listing
//! - [`date_index`] - media items bucketed by creation date
//! - [`scanner`] - local image and album directory indexes
//! - [`reconcile`] - the diff, producing an ordered operation list
//! - [`executor`] - sequential application of that list
//! - [`coordinator`] - one complete run
//!
//! Nothing is persisted between runs.
//!
//! ## Layout
//!
//! ```text
//! <index_root>/albums/<album title>/<filename> -> <image_root>/.../<filename>
//! ```

pub mod catalog;
pub mod coordinator;
pub mod date_index;
pub mod error;
pub mod executor;
pub mod reconcile;
pub mod scanner;

pub use catalog::{CatalogFetcher, RemoteAlbum};
pub use coordinator::{MirrorCoordinator, MirrorReport};
pub use date_index::DateIndex;
pub use error::{MirrorError, Result};
pub use executor::{ExecutionReport, OperationExecutor};
pub use reconcile::{plan, MissingImages, Operation, Plan, ReconcileInput};
pub use scanner::{scan_album_directories, scan_images, DirectoryIndex, LocalImageIndex};
