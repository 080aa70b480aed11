mod cancel;
mod health;
mod schedule;
mod sync;

pub use cancel::Cancel;
pub use health::Health;
pub use schedule::Schedule;
pub use sync::SyncLibrary;

use anyhow::Context;
use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
use bridge_traits::media::MediaServer;
use core_async::signal::shutdown_signal;
use core_async::task::{self, JoinHandle};
use core_runtime::config::AppConfig;
use core_runtime::events::EventBus;
use core_sync::{CachePaths, CacheStore, OrchestratorContext, SyncOptions};
use provider_bazarr::BazarrConnector;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::report::TerminalReporter;

/// Bazarr client for the configured server.
pub fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn MediaServer>> {
    let http = Arc::new(ReqwestHttpClient::new().context("Failed to create HTTP client")?);
    debug!(api_url = %config.api_url(), "Connecting to Bazarr");
    Ok(Arc::new(BazarrConnector::new(
        http,
        config.api_url(),
        config.api_token.clone(),
    )))
}

/// Print the server version before a run. A failure here is not fatal; the
/// listing that follows reports the real problem if there is one.
pub async fn announce_server(server: &dyn MediaServer) {
    match server.server_status().await {
        Ok(status) => println!("Bazarr version: {}", status.version),
        Err(e) => warn!(error = %e, "Could not query Bazarr status"),
    }
}

/// Resolves on Ctrl-C, or SIGTERM from `bazarr-sync cancel`.
pub async fn interrupted() {
    let interrupt = shutdown_signal().await;
    info!(signal = %interrupt, "Interrupt received");
}

fn sync_options(config: &AppConfig) -> SyncOptions {
    SyncOptions {
        golden_section: config.sync_options.golden_section,
        fix_framerate: !config.sync_options.no_framerate_fix,
        ..SyncOptions::default()
    }
}

fn cache_store(config: &AppConfig) -> CacheStore {
    if !config.cache.enabled {
        return CacheStore::disabled();
    }
    CacheStore::new(
        Arc::new(TokioFileSystem::new()),
        CachePaths {
            movies: config.cache.movies_cache.clone(),
            shows: config.cache.shows_cache.clone(),
        },
    )
}

/// An orchestrator context with a terminal reporter attached to its bus.
pub struct Session {
    pub ctx: OrchestratorContext,
    reporter: JoinHandle<()>,
}

impl Session {
    pub async fn open(server: Arc<dyn MediaServer>, config: &AppConfig, verbose: bool) -> Self {
        let cache = Arc::new(cache_store(config));
        cache.reload().await;

        let events = EventBus::default();
        let reporter = task::spawn(TerminalReporter::new(verbose).run(events.subscribe()));
        let ctx = OrchestratorContext::new(server, cache, events, sync_options(config));

        Self { ctx, reporter }
    }

    /// Close the bus and wait until every event has been printed.
    pub async fn finish(self) {
        let Session { ctx, reporter } = self;
        drop(ctx);
        if let Err(e) = reporter.await {
            warn!(error = %e, "Reporter task failed");
        }
    }
}
