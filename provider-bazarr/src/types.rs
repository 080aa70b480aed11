//! Bazarr API response types
//!
//! Every listing endpoint wraps its payload in `{"data": [...]}`. Bazarr
//! sends `null` for the path and size of embedded subtitles, so those fields
//! are optional here and normalised when converted to the bridge model.

use bridge_traits::media::{Episode, MediaLibraryEntry, ShowSummary, SubtitleTrack};
use serde::{Deserialize, Serialize};

/// `{"data": ...}` envelope used by every endpoint.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Subtitle entry attached to a movie or episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleInfo {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub code2: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// `GET api/movies` item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub title: String,
    #[serde(default)]
    pub monitored: bool,
    pub radarr_id: i64,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub subtitles: Vec<SubtitleInfo>,
}

/// `GET api/series` item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub title: String,
    #[serde(default)]
    pub monitored: bool,
    pub sonarr_series_id: i64,
    #[serde(default)]
    pub imdb_id: Option<String>,
}

/// `GET api/episodes` item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeInfo {
    pub title: String,
    #[serde(default)]
    pub monitored: bool,
    pub sonarr_episode_id: i64,
    #[serde(default)]
    pub subtitles: Vec<SubtitleInfo>,
}

/// `GET api/system/status` payload
#[derive(Debug, Clone, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub bazarr_version: String,
}

impl From<SubtitleInfo> for SubtitleTrack {
    fn from(info: SubtitleInfo) -> Self {
        SubtitleTrack {
            path: info.path.unwrap_or_default(),
            language_code: info.code2.unwrap_or_default(),
            file_size_bytes: info.file_size.unwrap_or(0),
        }
    }
}

impl From<Movie> for MediaLibraryEntry {
    fn from(movie: Movie) -> Self {
        MediaLibraryEntry {
            title: movie.title,
            external_id: movie.radarr_id,
            monitored: movie.monitored,
            subtitle_tracks: movie.subtitles.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Series> for ShowSummary {
    fn from(series: Series) -> Self {
        ShowSummary {
            title: series.title,
            external_id: series.sonarr_series_id,
            monitored: series.monitored,
        }
    }
}

impl From<EpisodeInfo> for Episode {
    fn from(episode: EpisodeInfo) -> Self {
        Episode {
            title: episode.title,
            external_id: episode.sonarr_episode_id,
            monitored: episode.monitored,
            subtitle_tracks: episode.subtitles.into_iter().map(Into::into).collect(),
        }
    }
}
