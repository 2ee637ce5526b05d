//! Remote Photo Library Abstraction
//!
//! The two paginated calls the mirror consumes from a photo service: listing
//! albums and searching media items (by album or by date range).

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identity of a remote album.
///
/// Identity is `id`; `title` is the display name and becomes the local
/// directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlbumKey {
    pub id: String,
    pub title: String,
}

impl AlbumKey {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A remote media item as seen by the mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub filename: String,
    /// Creation timestamp (RFC 3339), as reported by the service
    pub creation_time: String,
}

impl MediaItem {
    pub fn new(filename: impl Into<String>, creation_time: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            creation_time: creation_time.into(),
        }
    }
}

/// Media item search criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSearch {
    /// Members of a single album
    Album { album_id: String },
    /// Items created within `[start, end]`
    DateRange { start: NaiveDate, end: NaiveDate },
    /// The whole library
    All,
}

/// One page of a paginated listing.
///
/// `next_page_token` is `None` on the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        // Services signal "no more pages" with either a missing or an empty token
        let next_page_token = next_page_token.filter(|token| !token.is_empty());
        Self {
            items,
            next_page_token,
        }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Remote photo library trait
///
/// Implementations receive an already-authenticated handle; token acquisition
/// is not their concern. Every call is a single page request: callers drive
/// pagination by passing back `next_page_token` until it is `None`.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::photos::PhotoLibrary;
///
/// async fn first_titles(library: &dyn PhotoLibrary) -> Result<Vec<String>> {
///     let page = library.list_albums(50, None).await?;
///     Ok(page.items.into_iter().map(|album| album.title).collect())
/// }
/// ```
#[async_trait]
pub trait PhotoLibrary: Send + Sync {
    /// List one page of albums
    async fn list_albums(
        &self,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<Page<AlbumKey>>;

    /// Search one page of media items
    async fn search_media_items(
        &self,
        search: &MediaSearch,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<Page<MediaItem>>;
}
