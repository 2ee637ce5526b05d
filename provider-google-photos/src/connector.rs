//! Google Photos API connector implementation
//!
//! Implements the `PhotoLibrary` trait for the Google Photos Library API v1.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::photos::{AlbumKey, MediaItem, MediaSearch, Page, PhotoLibrary};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::GooglePhotosError;
use crate::types::{
    AlbumsListResponse, ApiDateRange, DateFilter, SearchFilters, SearchMediaItemsRequest,
    SearchMediaItemsResponse,
};

/// Google Photos Library API base URL
const PHOTOS_API_BASE: &str = "https://photoslibrary.googleapis.com/v1";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Photos API connector
///
/// Implements `PhotoLibrary` for the Google Photos Library API v1.
///
/// # Example
///
/// ```ignore
/// use provider_google_photos::GooglePhotosConnector;
/// use bridge_traits::photos::PhotoLibrary;
///
/// let connector = GooglePhotosConnector::new(http_client, access_token);
/// let page = connector.list_albums(50, None).await?;
/// ```
pub struct GooglePhotosConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token
    access_token: String,

    /// Backoff applied to 429 and 5xx responses
    retry_policy: RetryPolicy,
}

impl GooglePhotosConnector {
    /// Create a new Google Photos connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `access_token` - OAuth 2.0 access token with `photoslibrary.readonly` scope
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: String) -> Self {
        Self {
            http_client,
            access_token,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy for throttled and failed requests
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Execute API request with retry logic
    ///
    /// Implements exponential backoff for rate limiting and transient errors.
    /// The HTTP client is asked for a single attempt per call, so this loop is
    /// the only retry layer.
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn execute_with_retry(&self, request: HttpRequest) -> Result<HttpResponse> {
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let request = request
            .bearer_token(self.access_token.as_str())
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);
        let mut attempt = 0;

        loop {
            match self
                .http_client
                .execute_with_retry(request.clone(), RetryPolicy::no_retry())
                .await
            {
                Ok(response) if response.is_success() => {
                    debug!(status = response.status, "API request succeeded");
                    return Ok(response);
                }
                Ok(response) if response.is_retryable() => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        warn!(
                            status = response.status,
                            attempts = max_attempts,
                            "API request failed after retries"
                        );
                        return Err(GooglePhotosError::ApiError {
                            status_code: response.status,
                            message: format!("Request failed after {} attempts", max_attempts),
                        }
                        .into());
                    }

                    let delay = self.retry_policy.delay_for(attempt);
                    warn!(
                        status = response.status,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "API request throttled or failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) if response.status == 401 || response.status == 403 => {
                    warn!(status = response.status, "API request rejected credentials");
                    return Err(GooglePhotosError::AuthenticationFailed(response.text_lossy()).into());
                }
                Ok(response) => {
                    // Client error - don't retry
                    warn!(status = response.status, "API request failed");
                    return Err(GooglePhotosError::ApiError {
                        status_code: response.status,
                        message: response.text_lossy(),
                    }
                    .into());
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        warn!(error = %e, attempts = max_attempts, "API request failed after retries");
                        return Err(GooglePhotosError::NetworkError(e.to_string()).into());
                    }

                    let delay = self.retry_policy.delay_for(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "API request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn search_request(
        search: &MediaSearch,
        page_size: u32,
        page_token: Option<String>,
    ) -> SearchMediaItemsRequest {
        let (album_id, filters) = match search {
            MediaSearch::Album { album_id } => (Some(album_id.clone()), None),
            MediaSearch::DateRange { start, end } => (
                None,
                Some(SearchFilters {
                    date_filter: DateFilter {
                        ranges: vec![ApiDateRange {
                            start_date: (*start).into(),
                            end_date: (*end).into(),
                        }],
                    },
                }),
            ),
            MediaSearch::All => (None, None),
        };

        SearchMediaItemsRequest {
            album_id,
            page_size,
            page_token,
            filters,
        }
    }
}

#[async_trait]
impl PhotoLibrary for GooglePhotosConnector {
    #[instrument(skip(self))]
    async fn list_albums(
        &self,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<Page<AlbumKey>> {
        let mut url = format!("{}/albums?pageSize={}", PHOTOS_API_BASE, page_size);
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(&token)));
        }

        let response = self.execute_with_retry(HttpRequest::get(url)).await?;

        let list_response: AlbumsListResponse =
            serde_json::from_slice(&response.body).map_err(|e| {
                GooglePhotosError::ParseError(format!("Failed to parse albums list response: {}", e))
            })?;

        let albums: Vec<AlbumKey> = list_response
            .albums
            .into_iter()
            .map(|album| AlbumKey::new(album.id, album.title))
            .collect();

        info!(count = albums.len(), "Listed albums from Google Photos");

        Ok(Page::new(albums, list_response.next_page_token))
    }

    #[instrument(skip(self))]
    async fn search_media_items(
        &self,
        search: &MediaSearch,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<Page<MediaItem>> {
        let body = Self::search_request(search, page_size, page_token);
        let request =
            HttpRequest::post(format!("{}/mediaItems:search", PHOTOS_API_BASE)).json(&body)?;

        let response = self.execute_with_retry(request).await?;

        let search_response: SearchMediaItemsResponse = serde_json::from_slice(&response.body)
            .map_err(|e| {
                GooglePhotosError::ParseError(format!("Failed to parse media items response: {}", e))
            })?;

        let items: Vec<MediaItem> = search_response
            .media_items
            .into_iter()
            .map(|item| MediaItem::new(item.filename, item.media_metadata.creation_time))
            .collect();

        debug!(count = items.len(), "Searched media items");

        Ok(Page::new(items, search_response.next_page_token))
    }
}
