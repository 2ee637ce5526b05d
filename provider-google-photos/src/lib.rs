//! # Google Photos Provider
//!
//! Implements the `PhotoLibrary` trait for the Google Photos Library API v1.
//!
//! ## Overview
//!
//! This module provides:
//! - Paginated album listing
//! - Media item search by album or by creation date range
//! - Exponential backoff for rate limiting and server errors
//!
//! Authentication is not handled here: the connector is given an access
//! token that already carries the `photoslibrary.readonly` scope.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GooglePhotosConnector;
pub use error::{GooglePhotosError, Result};
