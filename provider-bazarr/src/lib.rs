//! # Bazarr Provider
//!
//! Implements the `MediaServer` trait against the Bazarr REST API.
//!
//! ## Overview
//!
//! This module provides:
//! - Movie, series and episode listings (`api/movies`, `api/series`,
//!   `api/episodes`)
//! - The subtitle sync action (`PATCH api/subtitles?action=sync`)
//! - The `system/status` health check
//!
//! Every request carries the `X-API-KEY` header. Listings time out after
//! 30 seconds; sync requests wait as long as the server needs, since
//! alignment runs synchronously inside the request.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::BazarrConnector;
pub use error::{BazarrError, Result};
