//! Everything a sync run needs, passed explicitly into each stage.

use bridge_traits::media::{ExternalId, MediaServer};
use core_async::sync::CancellationToken;
use core_async::time::Duration;
use core_runtime::events::EventBus;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cache::CacheStore;

/// Pause between the failed first attempt and the retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Pause after each track that reached the server.
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_secs(1);

/// Per-run sync behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Use golden-section search on the server.
    pub golden_section: bool,
    /// Let the server correct framerate mismatches.
    pub fix_framerate: bool,
    pub retry_delay: Duration,
    pub item_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            golden_section: false,
            fix_framerate: true,
            retry_delay: DEFAULT_RETRY_DELAY,
            item_delay: DEFAULT_ITEM_DELAY,
        }
    }
}

impl SyncOptions {
    /// No pacing delays. Used by tests and dry environments.
    pub fn without_delays(mut self) -> Self {
        self.retry_delay = Duration::ZERO;
        self.item_delay = Duration::ZERO;
        self
    }
}

/// Which units of the catalog a run covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Allow-list of movie or show ids. Empty selects everything.
    pub ids: BTreeSet<ExternalId>,
    /// Skip every unit before this movie or episode id.
    pub resume_from: Option<ExternalId>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = ExternalId>) -> Self {
        self.ids.extend(ids);
        self
    }

    /// Negative markers mean "no marker".
    pub fn resume_from(mut self, marker: Option<ExternalId>) -> Self {
        self.resume_from = marker.filter(|id| *id >= 0);
        self
    }

    pub fn has_id_filter(&self) -> bool {
        !self.ids.is_empty()
    }

    pub fn is_selected(&self, id: ExternalId) -> bool {
        self.ids.is_empty() || self.ids.contains(&id)
    }
}

/// Shared handles for one invocation: server, cache, event bus, options
/// and the cancellation token the traversal checks between units.
#[derive(Clone)]
pub struct OrchestratorContext {
    pub server: Arc<dyn MediaServer>,
    pub cache: Arc<CacheStore>,
    pub events: EventBus,
    pub options: SyncOptions,
    pub cancel: CancellationToken,
}

impl OrchestratorContext {
    pub fn new(
        server: Arc<dyn MediaServer>,
        cache: Arc<CacheStore>,
        events: EventBus,
        options: SyncOptions,
    ) -> Self {
        Self {
            server,
            cache,
            events,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Same handles, with a token that is cancelled along with this one but
    /// can also be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            ..self.clone()
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl std::fmt::Debug for OrchestratorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorContext")
            .field("cache", &self.cache)
            .field("options", &self.options)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
