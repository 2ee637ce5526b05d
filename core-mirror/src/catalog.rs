//! # Remote Catalog Fetcher
//!
//! Accumulates paginated listings from a [`PhotoLibrary`] into the shapes the
//! rest of the mirror works with.
//!
//! Every listing follows the same contract: the first request carries no page
//! token, and requests continue with the returned token until the service
//! stops returning one. Any failed request fails the whole listing.
//!
//! Per-album listings fan out as concurrent tasks, bounded by a semaphore,
//! and are reassembled in album listing order once every task has finished.

use crate::date_index::DateIndex;
use crate::error::{MirrorError, Result};
use bridge_traits::photos::{AlbumKey, MediaSearch, PhotoLibrary};
use bridge_traits::time::Clock;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Albums requested per page
pub const ALBUM_PAGE_SIZE: u32 = 50;

/// Media items requested per page
pub const MEDIA_PAGE_SIZE: u32 = 100;

/// A remote album and the filenames it contains, in listing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAlbum {
    pub key: AlbumKey,
    pub filenames: Vec<String>,
}

impl RemoteAlbum {
    pub fn new(key: AlbumKey, filenames: Vec<String>) -> Self {
        Self { key, filenames }
    }

    pub fn title(&self) -> &str {
        &self.key.title
    }
}

/// Paginated retrieval of albums and media items
pub struct CatalogFetcher {
    library: Arc<dyn PhotoLibrary>,
    clock: Arc<dyn Clock>,
    fetch_limiter: Arc<Semaphore>,
}

impl CatalogFetcher {
    /// Create a fetcher allowing at most `max_concurrent_fetches` album
    /// listings in flight at once
    pub fn new(
        library: Arc<dyn PhotoLibrary>,
        clock: Arc<dyn Clock>,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            library,
            clock,
            fetch_limiter: Arc::new(Semaphore::new(max_concurrent_fetches.max(1))),
        }
    }

    /// List every album, in service order
    #[instrument(skip(self))]
    pub async fn list_albums(&self) -> Result<Vec<AlbumKey>> {
        let mut albums = Vec::new();
        let mut page_token = None;

        loop {
            debug!(more = page_token.is_some(), "Requesting album page");
            let page = self
                .library
                .list_albums(ALBUM_PAGE_SIZE, page_token.take())
                .await?;
            albums.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(count = albums.len(), "Found albums");
        Ok(albums)
    }

    /// List the filenames in one album, in service order
    pub async fn list_media_filenames(&self, album: &AlbumKey) -> Result<Vec<String>> {
        collect_album_filenames(self.library.as_ref(), album).await
    }

    /// Fetch every album together with its filenames.
    ///
    /// Only the first `max_albums` listed albums are considered. Albums whose
    /// title repeats an earlier album's are skipped, so the result has unique
    /// titles in listing order.
    #[instrument(skip(self))]
    pub async fn fetch_album_index(&self, max_albums: Option<usize>) -> Result<Vec<RemoteAlbum>> {
        let mut albums = self.list_albums().await?;

        if let Some(max) = max_albums {
            if albums.len() > max {
                warn!(max_albums = max, listed = albums.len(), "Reached max album count");
                albums.truncate(max);
            }
        }

        let mut seen_titles = HashSet::new();
        albums.retain(|album| {
            let first = seen_titles.insert(album.title.clone());
            if !first {
                warn!(album = %album.title, id = %album.id, "Skipping album with duplicate title");
            }
            first
        });

        let mut tasks = JoinSet::new();
        for (position, album) in albums.iter().enumerate() {
            let library = Arc::clone(&self.library);
            let limiter = Arc::clone(&self.fetch_limiter);
            let album = album.clone();

            tasks.spawn(async move {
                let _permit = limiter
                    .acquire_owned()
                    .await
                    .map_err(|_| MirrorError::TaskJoin("Fetch limiter closed".to_string()))?;
                let filenames = collect_album_filenames(library.as_ref(), &album).await?;
                Ok::<_, MirrorError>((position, filenames))
            });
        }

        // Join barrier: nothing is returned until every listing has finished.
        // Returning early drops the set, which aborts the remaining tasks.
        let mut slots: Vec<Option<Vec<String>>> = vec![None; albums.len()];
        while let Some(joined) = tasks.join_next().await {
            let (position, filenames) = joined.map_err(|e| MirrorError::TaskJoin(e.to_string()))??;
            slots[position] = Some(filenames);
        }

        let remote_albums: Vec<RemoteAlbum> = albums
            .into_iter()
            .zip(slots)
            .map(|(key, filenames)| RemoteAlbum::new(key, filenames.unwrap_or_default()))
            .collect();

        info!(albums = remote_albums.len(), "Fetched album index");
        Ok(remote_albums)
    }

    /// Fill `index` with media items created on or after `since` (or all
    /// items when `None`).
    ///
    /// Before each page the index size is checked against `max_images`; once
    /// reached no further page is requested. A page is always added in full.
    /// Items the index rejects (duplicate filename, bad timestamp) are logged
    /// and skipped.
    #[instrument(skip(self, index))]
    pub async fn fill_date_index(
        &self,
        index: &mut DateIndex,
        since: Option<NaiveDate>,
        max_images: Option<usize>,
    ) -> Result<()> {
        let search = match since {
            Some(start) => MediaSearch::DateRange {
                start,
                end: self.clock.today(),
            },
            None => MediaSearch::All,
        };
        let mut page_token = None;

        loop {
            if let Some(max) = max_images {
                if index.len() >= max {
                    warn!(max_images = max, "Reached max image count");
                    break;
                }
            }

            debug!(more = page_token.is_some(), "Requesting media items by date");
            let page = self
                .library
                .search_media_items(&search, MEDIA_PAGE_SIZE, page_token.take())
                .await?;

            for item in page.items {
                match index.add_image(&item.filename, &item.creation_time) {
                    Ok(()) => {}
                    Err(e) if e.is_recoverable() => {
                        warn!(error = %e, filename = %item.filename, "Skipping media item");
                    }
                    Err(e) => return Err(e),
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(images = index.len(), "Filled date index");
        Ok(())
    }
}

async fn collect_album_filenames(
    library: &dyn PhotoLibrary,
    album: &AlbumKey,
) -> Result<Vec<String>> {
    let search = MediaSearch::Album {
        album_id: album.id.clone(),
    };
    let mut filenames = Vec::new();
    let mut page_token = None;

    loop {
        debug!(album = %album.title, more = page_token.is_some(), "Requesting album images");
        let page = library
            .search_media_items(&search, MEDIA_PAGE_SIZE, page_token.take())
            .await?;
        filenames.extend(page.items.into_iter().map(|item| item.filename));

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    debug!(album = %album.title, count = filenames.len(), "Found images for album");
    Ok(filenames)
}
