//! Media Server Abstraction
//!
//! The catalog model shared by the sync engine and the server connectors,
//! plus the [`MediaServer`] trait the engine drives.
//!
//! Movies carry their subtitle tracks directly. Shows are listed without
//! tracks; their episodes are fetched per show and carry the tracks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Stable numeric identifier the server assigns to a movie, show or episode.
///
/// Unique within its media kind. Used for id filters and resume markers.
pub type ExternalId = i64;

/// Which half of the library a sync request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Episode,
}

impl MediaKind {
    /// Value of the `type` query parameter on a sync request.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Episode => "episode",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external subtitle file attached to a movie or episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    /// Empty for embedded subtitles the server cannot extract.
    pub path: String,
    pub language_code: String,
    pub file_size_bytes: u64,
}

impl SubtitleTrack {
    /// A track can only be synced when it exists as a non-empty file.
    pub fn is_eligible(&self) -> bool {
        !self.path.is_empty() && self.file_size_bytes > 0
    }
}

/// A movie in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaLibraryEntry {
    pub title: String,
    pub external_id: ExternalId,
    pub monitored: bool,
    pub subtitle_tracks: Vec<SubtitleTrack>,
}

/// A show as listed by the server, without its episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSummary {
    pub title: String,
    pub external_id: ExternalId,
    pub monitored: bool,
}

/// A single episode of a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub external_id: ExternalId,
    pub monitored: bool,
    pub subtitle_tracks: Vec<SubtitleTrack>,
}

/// Everything the server needs to align one subtitle file.
///
/// Built once per eligible track; not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub media_kind: MediaKind,
    pub external_id: ExternalId,
    pub path: String,
    pub language_code: String,
    pub use_golden_section: bool,
    pub fix_framerate: bool,
}

impl SyncRequest {
    pub fn new(media_kind: MediaKind, external_id: ExternalId, track: &SubtitleTrack) -> Self {
        Self {
            media_kind,
            external_id,
            path: track.path.clone(),
            language_code: track.language_code.clone(),
            use_golden_section: false,
            fix_framerate: true,
        }
    }

    pub fn golden_section(mut self, enabled: bool) -> Self {
        self.use_golden_section = enabled;
        self
    }

    pub fn fix_framerate(mut self, enabled: bool) -> Self {
        self.fix_framerate = enabled;
        self
    }
}

/// Raw answer to a sync request: whatever status and body the server sent.
///
/// Interpreting it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResponse {
    pub status: u16,
    pub body: String,
}

impl SyncResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Server identification returned by the health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub version: String,
}

/// Media server trait
///
/// Listing calls fail on transport errors, non-2xx responses and undecodable
/// bodies. [`request_sync`](MediaServer::request_sync) only fails on
/// transport errors; every HTTP response is handed back for classification.
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// All movies with their subtitle tracks, in server order.
    async fn list_movies(&self) -> Result<Vec<MediaLibraryEntry>>;

    /// All shows, in server order.
    async fn list_shows(&self) -> Result<Vec<ShowSummary>>;

    /// Episodes of one show with their subtitle tracks.
    async fn list_episodes(&self, show_id: ExternalId) -> Result<Vec<Episode>>;

    /// Ask the server to align one subtitle file. Not retried internally.
    async fn request_sync(&self, request: &SyncRequest) -> Result<SyncResponse>;

    /// Identify the server; used as a connectivity check.
    async fn server_status(&self) -> Result<ServerStatus>;
}
