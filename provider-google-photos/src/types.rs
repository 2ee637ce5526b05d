//! Google Photos Library API request and response types
//!
//! Only the fields the mirror reads are modelled; everything else in the
//! resources is ignored during deserialization.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Google Photos album resource
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/albums#Album
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotosAlbum {
    /// Album ID
    pub id: String,

    /// Album title (absent for untitled albums)
    #[serde(default)]
    pub title: String,
}

/// albums.list response
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/albums/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumsListResponse {
    /// Albums on this page (omitted when the page is empty)
    #[serde(default)]
    pub albums: Vec<PhotosAlbum>,

    /// Token for next page
    pub next_page_token: Option<String>,
}

/// Google Photos media item resource
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/mediaItems#MediaItem
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotosMediaItem {
    /// Media item ID
    pub id: String,

    /// Original filename as uploaded
    pub filename: String,

    /// Metadata, including creation time
    #[serde(default)]
    pub media_metadata: MediaMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    /// Creation time (RFC 3339)
    #[serde(default)]
    pub creation_time: String,
}

/// mediaItems.search response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMediaItemsResponse {
    #[serde(default)]
    pub media_items: Vec<PhotosMediaItem>,

    pub next_page_token: Option<String>,
}

/// mediaItems.search request body
///
/// `album_id` and `filters` are mutually exclusive in the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMediaItemsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,

    pub page_size: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub date_filter: DateFilter,
}

#[derive(Debug, Serialize)]
pub struct DateFilter {
    pub ranges: Vec<ApiDateRange>,
}

/// Inclusive date range
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDateRange {
    pub start_date: ApiDate,
    pub end_date: ApiDate,
}

/// Calendar date as the API encodes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl From<NaiveDate> for ApiDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}
