//! # Host Bridge Traits
//!
//! Capability traits the mirror core depends on, implemented per host.
//!
//! ## Overview
//!
//! The core never talks to the network or the filesystem directly. Every side
//! effect goes through one of the traits below so the reconciliation logic can
//! be exercised against mocks and so a host can swap transports without
//! touching the core.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry
//! - [`PhotoLibrary`](photos::PhotoLibrary) - Paginated album and media item listing
//!
//! ### Filesystem
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Directory and symlink mutation
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop`    |
//! | Photos   | `provider-google-photos` |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Implementations
//! should convert platform-specific errors to `BridgeError` and keep the path or
//! URL involved in the message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so handles can be shared across the
//! per-album fetch tasks.

pub mod error;
pub mod http;
pub mod photos;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use photos::{AlbumKey, MediaItem, MediaSearch, Page, PhotoLibrary};
pub use storage::FileSystemAccess;
pub use time::{Clock, LogLevel, SystemClock};
