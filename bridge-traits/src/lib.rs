//! # Host Bridge Traits
//!
//! Capability traits the sync engine depends on, and the catalog model that
//! flows through them.
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Cache file I/O
//!
//! ### Domain
//! - [`MediaServer`](media::MediaServer) - Catalog listing and sync requests
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! Desktop implementations live in `bridge-desktop`; the Bazarr implementation
//! of [`MediaServer`](media::MediaServer) lives in `provider-bazarr`.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert their own errors into it and keep status codes and response
//! bodies intact so callers can report them.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! behind `Arc` across tasks.

pub mod error;
pub mod http;
pub mod media;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use media::{
    Episode, ExternalId, MediaKind, MediaLibraryEntry, MediaServer, ServerStatus, ShowSummary,
    SubtitleTrack, SyncRequest, SyncResponse,
};
pub use storage::FileSystemAccess;
pub use time::{Clock, LogLevel, SystemClock};
