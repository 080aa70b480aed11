//! Shared fakes for the orchestration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::media::{
    Episode, ExternalId, MediaLibraryEntry, MediaServer, ServerStatus, ShowSummary,
    SubtitleTrack, SyncRequest, SyncResponse,
};
use core_async::sync::oneshot;
use core_runtime::events::{CoreEvent, EventBus, Receiver};
use core_sync::{CacheStore, OrchestratorContext, SyncOptions};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// In-memory media server with scripted sync responses.
///
/// Paths without a script answer 204. Shows without an episode entry fail
/// their episode listing. With `never_answer` set, sync requests are
/// recorded and then never complete.
#[derive(Default)]
pub struct FakeServer {
    pub movies: Vec<MediaLibraryEntry>,
    pub shows: Vec<ShowSummary>,
    pub episodes: HashMap<ExternalId, Vec<Episode>>,
    pub fail_listings: bool,
    pub never_answer: bool,
    scripted: Mutex<HashMap<String, VecDeque<Result<SyncResponse>>>>,
    calls: Mutex<Vec<SyncRequest>>,
    listings: Mutex<Vec<&'static str>>,
    interrupt: Mutex<Option<(usize, oneshot::Sender<()>)>>,
}

impl FakeServer {
    pub fn with_movies(movies: Vec<MediaLibraryEntry>) -> Self {
        Self {
            movies,
            ..Default::default()
        }
    }

    pub fn with_shows(shows: Vec<ShowSummary>, episodes: Vec<(ExternalId, Vec<Episode>)>) -> Self {
        Self {
            shows,
            episodes: episodes.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Every listing answers HTTP 500.
    pub fn failing() -> Self {
        Self {
            fail_listings: true,
            ..Default::default()
        }
    }

    /// Queue responses for `path`, consumed one per request.
    pub fn script(&self, path: &str, responses: Vec<Result<SyncResponse>>) {
        self.scripted
            .lock()
            .unwrap()
            .insert(path.to_string(), responses.into_iter().collect());
    }

    /// Fire the returned receiver during the `nth` sync request (1-based).
    pub fn interrupt_on_call(&self, nth: usize) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        *self.interrupt.lock().unwrap() = Some((nth, tx));
        rx
    }

    pub fn calls(&self) -> Vec<SyncRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }

    pub fn listings(&self) -> Vec<&'static str> {
        self.listings.lock().unwrap().clone()
    }

    fn listing(&self, name: &'static str) -> Result<()> {
        self.listings.lock().unwrap().push(name);
        if self.fail_listings {
            return Err(BridgeError::Http {
                status: 500,
                body: "database is locked".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MediaServer for FakeServer {
    async fn list_movies(&self) -> Result<Vec<MediaLibraryEntry>> {
        self.listing("movies")?;
        Ok(self.movies.clone())
    }

    async fn list_shows(&self) -> Result<Vec<ShowSummary>> {
        self.listing("series")?;
        Ok(self.shows.clone())
    }

    async fn list_episodes(&self, show_id: ExternalId) -> Result<Vec<Episode>> {
        self.listing("episodes")?;
        self.episodes
            .get(&show_id)
            .cloned()
            .ok_or_else(|| BridgeError::Transport("operation timed out".to_string()))
    }

    async fn request_sync(&self, request: &SyncRequest) -> Result<SyncResponse> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };

        {
            let mut interrupt = self.interrupt.lock().unwrap();
            if matches!(interrupt.as_ref(), Some((nth, _)) if *nth == count) {
                if let Some((_, tx)) = interrupt.take() {
                    tx.send(()).ok();
                }
            }
        }

        if self.never_answer {
            std::future::pending::<()>().await;
        }

        self.scripted
            .lock()
            .unwrap()
            .get_mut(&request.path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(SyncResponse::new(204, "")))
    }

    async fn server_status(&self) -> Result<ServerStatus> {
        Ok(ServerStatus {
            version: "1.4.3".to_string(),
        })
    }
}

pub fn track(path: &str, language: &str) -> SubtitleTrack {
    SubtitleTrack {
        path: path.to_string(),
        language_code: language.to_string(),
        file_size_bytes: 2048,
    }
}

pub fn movie(id: ExternalId, title: &str, tracks: Vec<SubtitleTrack>) -> MediaLibraryEntry {
    MediaLibraryEntry {
        title: title.to_string(),
        external_id: id,
        monitored: true,
        subtitle_tracks: tracks,
    }
}

pub fn show(id: ExternalId, title: &str) -> ShowSummary {
    ShowSummary {
        title: title.to_string(),
        external_id: id,
        monitored: true,
    }
}

pub fn episode(id: ExternalId, title: &str, tracks: Vec<SubtitleTrack>) -> Episode {
    Episode {
        title: title.to_string(),
        external_id: id,
        monitored: true,
        subtitle_tracks: tracks,
    }
}

/// Context with no pacing delays.
pub fn context(server: Arc<FakeServer>, cache: Arc<CacheStore>) -> OrchestratorContext {
    OrchestratorContext::new(
        server,
        cache,
        EventBus::default(),
        SyncOptions::default().without_delays(),
    )
}

pub fn drain(receiver: &mut Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
