//! # Mirror Configuration Module
//!
//! Provides configuration management for an album mirror run.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `MirrorConfig`
//! instance that holds every setting a run needs. It enforces fail-fast
//! validation so a run never starts with a missing root directory.
//!
//! ## Required Settings
//!
//! - `index_root` - Where the `albums/<title>/<filename>` tree is maintained
//! - `image_root` - The existing local image collection links point into
//!
//! ## Optional Settings
//!
//! - `max_albums` - Only consider the first N remote albums (unlimited by default)
//! - `token_path` - OAuth token file (default `token.json`)
//! - `max_concurrent_fetches` - Bound on concurrent per-album listings (default 8)
//! - `dry_run` - Plan and log operations without applying them
//! - `date_summary` - Log a per-day image count before reconciling
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::MirrorConfig;
//!
//! let config = MirrorConfig::builder()
//!     .index_root("/srv/photos/index")
//!     .image_root("/srv/photos/originals")
//!     .max_albums(Some(20))
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.albums_root(), std::path::Path::new("/srv/photos/index/albums"));
//! ```
//!
//! ## Error Handling
//!
//! The builder reports the missing setting by the flag that supplies it:
//!
//! ```should_panic
//! use core_runtime::config::MirrorConfig;
//!
//! let config = MirrorConfig::builder()
//!     .image_root("/srv/photos/originals")
//!     .build()
//!     .expect("Should fail - missing index root");
//! ```

use crate::error::{Error, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Name of the directory under the index root that holds one directory per album
pub const ALBUMS_DIR_NAME: &str = "albums";

/// Default OAuth token file location
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// Default bound on concurrent per-album listings
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Configuration for a single mirror run.
///
/// Use [`MirrorConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Root of the generated index tree
    pub index_root: PathBuf,

    /// Root of the local image collection
    pub image_root: PathBuf,

    /// Maximum number of remote albums to consider (`None` = unlimited)
    pub max_albums: Option<usize>,

    /// Path to the OAuth token file
    pub token_path: PathBuf,

    /// Maximum number of album listings in flight at once
    pub max_concurrent_fetches: usize,

    /// Plan only, never touch the filesystem
    pub dry_run: bool,

    /// Per-day image summary (`None` = skip)
    pub date_summary: Option<DateSummaryConfig>,
}

/// Settings for the per-day image summary pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateSummaryConfig {
    /// Only count images created on or after this date
    pub since: Option<NaiveDate>,

    /// Stop fetching once this many distinct images are indexed (`None` = unlimited)
    pub max_images: Option<usize>,
}

impl MirrorConfig {
    /// Creates a new builder for constructing a `MirrorConfig`.
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    /// Directory holding one sub-directory per album: `<index_root>/albums`
    pub fn albums_root(&self) -> PathBuf {
        self.index_root.join(ALBUMS_DIR_NAME)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Both roots are non-empty
    /// - The token path is non-empty
    /// - The fetch concurrency bound is at least 1
    pub fn validate(&self) -> Result<()> {
        if self.index_root.as_os_str().is_empty() {
            return Err(Error::Config(
                "Index root cannot be empty. Please specify the index directory via --indexdir"
                    .to_string(),
            ));
        }

        if self.image_root.as_os_str().is_empty() {
            return Err(Error::Config(
                "Image root cannot be empty. Please specify the image directory via --imagedir"
                    .to_string(),
            ));
        }

        if self.token_path.as_os_str().is_empty() {
            return Err(Error::Config("Token path cannot be empty".to_string()));
        }

        if self.max_concurrent_fetches == 0 {
            return Err(Error::Config(
                "Concurrent fetch limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`MirrorConfig`] instances.
///
/// Call [`build()`](MirrorConfigBuilder::build) to validate and create the
/// final config.
#[derive(Debug, Default)]
pub struct MirrorConfigBuilder {
    index_root: Option<PathBuf>,
    image_root: Option<PathBuf>,
    max_albums: Option<usize>,
    token_path: Option<PathBuf>,
    max_concurrent_fetches: Option<usize>,
    dry_run: bool,
    date_summary: Option<DateSummaryConfig>,
}

impl MirrorConfigBuilder {
    /// Sets the index root (required).
    pub fn index_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.index_root = Some(path.into());
        self
    }

    /// Sets the image root (required).
    pub fn image_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.image_root = Some(path.into());
        self
    }

    /// Caps the number of remote albums considered.
    ///
    /// `None` means unlimited.
    pub fn max_albums(mut self, max_albums: Option<usize>) -> Self {
        self.max_albums = max_albums;
        self
    }

    /// Sets the OAuth token file path.
    ///
    /// Default: `token.json`
    pub fn token_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.token_path = Some(path.into());
        self
    }

    /// Sets the bound on concurrent per-album listings.
    ///
    /// Default: 8
    pub fn max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = Some(limit);
        self
    }

    /// Enables or disables dry-run mode.
    ///
    /// Default: false
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enables the per-day image summary pass.
    pub fn date_summary(mut self, summary: DateSummaryConfig) -> Self {
        self.date_summary = Some(summary);
        self
    }

    /// Builds the final `MirrorConfig` instance.
    ///
    /// Returns an error if a required root is missing or a value is invalid.
    pub fn build(self) -> Result<MirrorConfig> {
        let index_root = self.index_root.ok_or_else(|| {
            Error::Config(
                "Index root is required. Please specify the index directory via --indexdir"
                    .to_string(),
            )
        })?;

        let image_root = self.image_root.ok_or_else(|| {
            Error::Config(
                "Image root is required. Please specify the image directory via --imagedir"
                    .to_string(),
            )
        })?;

        let config = MirrorConfig {
            index_root,
            image_root,
            max_albums: self.max_albums,
            token_path: self
                .token_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH)),
            max_concurrent_fetches: self
                .max_concurrent_fetches
                .unwrap_or(DEFAULT_MAX_CONCURRENT_FETCHES),
            dry_run: self.dry_run,
            date_summary: self.date_summary,
        };

        config.validate()?;

        Ok(config)
    }
}

/// Converts a signed command-line limit into an optional cap.
///
/// Negative values mean "unlimited", matching the `-1` defaults of the CLI flags.
pub fn limit_from_signed(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}
