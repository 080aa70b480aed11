//! Bazarr API connector implementation
//!
//! Implements the `MediaServer` trait for the Bazarr v1 REST API.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::media::{
    Episode, ExternalId, MediaLibraryEntry, MediaServer, ServerStatus, ShowSummary, SyncRequest,
    SyncResponse,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::BazarrError;
use crate::types::{DataEnvelope, EpisodeInfo, Movie, Series, SystemStatus};

/// Header carrying the API key on every request
const API_KEY_HEADER: &str = "X-API-KEY";

/// Timeout for listing and status calls
const LISTING_TIMEOUT: Duration = Duration::from_secs(30);

/// Bazarr API connector
///
/// Listing calls are single attempts: any non-200 status or undecodable
/// body is an error. Sync calls are handed back raw so the engine can decide
/// what the status means.
///
/// # Example
///
/// ```ignore
/// use provider_bazarr::BazarrConnector;
/// use bridge_traits::media::MediaServer;
///
/// let connector = BazarrConnector::new(http_client, "http://localhost:6767/api/", api_key);
/// let movies = connector.list_movies().await?;
/// ```
pub struct BazarrConnector {
    http_client: Arc<dyn HttpClient>,

    /// Base API URL, always ending in `/`
    api_url: String,

    api_key: String,
}

impl BazarrConnector {
    /// Create a new connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `api_url` - Base API URL, e.g. `http://localhost:6767/api/`
    /// * `api_key` - Bazarr API key
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let mut api_url = api_url.into();
        if !api_url.ends_with('/') {
            api_url.push('/');
        }

        Self {
            http_client,
            api_url,
            api_key: api_key.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.endpoint(path))
            .header(API_KEY_HEADER, self.api_key.clone())
            .header("Accept", "application/json")
    }

    /// Run a listing request and decode its `{"data": ...}` payload.
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn fetch<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.http_client.execute(request).await?;
        let response = Self::ensure_ok(response)?;

        let envelope: DataEnvelope<T> = serde_json::from_slice(&response.body)
            .map_err(|e| BazarrError::ParseError(format!("unexpected response body: {}", e)))?;

        Ok(envelope.data)
    }

    fn ensure_ok(response: HttpResponse) -> std::result::Result<HttpResponse, BazarrError> {
        match response.status {
            200 => {
                debug!("API request succeeded: status=200");
                Ok(response)
            }
            401 | 403 => {
                warn!("API key rejected: status={}", response.status);
                Err(BazarrError::Unauthorized {
                    status_code: response.status,
                })
            }
            status => {
                warn!("API request failed: status={}", status);
                Err(BazarrError::ApiError {
                    status_code: status,
                    message: response.text_lossy(),
                })
            }
        }
    }

    fn flag(value: bool) -> &'static str {
        if value {
            "True"
        } else {
            "False"
        }
    }
}

#[async_trait]
impl MediaServer for BazarrConnector {
    #[instrument(skip(self))]
    async fn list_movies(&self) -> Result<Vec<MediaLibraryEntry>> {
        info!("Listing movies from Bazarr");

        let request = self
            .request(HttpMethod::Get, "movies")
            .timeout(LISTING_TIMEOUT);
        let movies: Vec<Movie> = self.fetch(request).await?;

        info!("Listed {} movies from Bazarr", movies.len());
        Ok(movies.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_shows(&self) -> Result<Vec<ShowSummary>> {
        info!("Listing series from Bazarr");

        let request = self
            .request(HttpMethod::Get, "series")
            .timeout(LISTING_TIMEOUT);
        let series: Vec<Series> = self.fetch(request).await?;

        info!("Listed {} series from Bazarr", series.len());
        Ok(series.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(show_id = %show_id))]
    async fn list_episodes(&self, show_id: ExternalId) -> Result<Vec<Episode>> {
        let request = self
            .request(HttpMethod::Get, "episodes")
            .query("seriesid[]", show_id.to_string())
            .timeout(LISTING_TIMEOUT);
        let episodes: Vec<EpisodeInfo> = self.fetch(request).await?;

        debug!("Listed {} episodes for series {}", episodes.len(), show_id);
        Ok(episodes.into_iter().map(Into::into).collect())
    }

    #[instrument(
        skip(self, request),
        fields(kind = %request.media_kind, id = request.external_id, language = %request.language_code)
    )]
    async fn request_sync(&self, request: &SyncRequest) -> Result<SyncResponse> {
        // No timeout: the server aligns the file before it answers.
        let http_request = self
            .request(HttpMethod::Patch, "subtitles")
            .query("path", request.path.clone())
            .query("id", request.external_id.to_string())
            .query("action", "sync")
            .query("language", request.language_code.clone())
            .query("type", request.media_kind.as_str())
            .query("gss", Self::flag(request.use_golden_section))
            .query("no_fix_framerate", Self::flag(!request.fix_framerate));

        let response = self.http_client.execute(http_request).await?;
        debug!("Sync request answered: status={}", response.status);

        Ok(SyncResponse::new(response.status, response.text_lossy()))
    }

    #[instrument(skip(self))]
    async fn server_status(&self) -> Result<ServerStatus> {
        let request = self
            .request(HttpMethod::Get, "system/status")
            .timeout(LISTING_TIMEOUT);
        let status: SystemStatus = self.fetch(request).await?;

        Ok(ServerStatus {
            version: status.bazarr_version,
        })
    }
}
