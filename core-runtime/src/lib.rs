//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the album mirror:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the other crates depend on.
//! It establishes the logging conventions and the validated configuration a
//! mirror run is started from.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{DateSummaryConfig, MirrorConfig, MirrorConfigBuilder};
pub use error::{Error, Result};
