//! # Authentication Module
//!
//! Loads the OAuth 2.0 token a previous authorization step left on disk.
//!
//! ## Overview
//!
//! The mirror never runs an authorization flow itself. It reads the token
//! file written by the OAuth tooling (`token.json` by default), checks that
//! it carries a usable access token, and hands the bearer token to the
//! photo provider.
//!
//! ## Features
//!
//! - Token file parsing (`access_token`, `token_type`, `refresh_token`, `expiry`)
//! - Expiry inspection
//! - Token values kept out of `Debug` output and logs

pub mod error;
pub mod token;

pub use error::{AuthError, Result};
pub use token::{load_token_file, OAuthTokens};
