//! # Item Processor
//!
//! Drives a single subtitle track through its states:
//!
//! ```text
//! Ineligible ──> skipped
//! CacheHit   ──> skipped
//! Attempting ──Success/AlreadyInSync──> recorded
//!     │
//!     └─Failure──> (retry delay) ──> Retrying ──Success/AlreadyInSync──> recorded
//!                                        └──────Failure──────────────> failed
//! ```
//!
//! At most two requests are sent per track. Every track that reached the
//! server is followed by the item delay, whatever its outcome.

use bridge_traits::media::{ExternalId, MediaKind, SubtitleTrack, SyncRequest};
use core_async::time::{pause, Duration};
use core_runtime::events::{SkipReason, SyncEvent, TrackResult};
use tracing::{debug, warn};

use crate::action::{request_sync, SyncOutcome};
use crate::context::OrchestratorContext;

/// Final state of one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackDisposition {
    /// Embedded, or no file on disk. Never sent.
    Ineligible,
    /// Path already in the cache. Never sent.
    CacheHit,
    Synced {
        retried: bool,
    },
    AlreadyInSync {
        reason: String,
        retried: bool,
    },
    /// Reason from the last attempt.
    Failed {
        reason: String,
    },
}

/// The movie or episode a track belongs to.
#[derive(Debug, Clone, Copy)]
pub struct TrackOwner<'a> {
    pub kind: MediaKind,
    pub external_id: ExternalId,
    /// Episode title for shows, empty for movies. Only used for reporting.
    pub label: &'a str,
    /// Skip the cache lookup. Successes are still recorded.
    pub bypass_cache: bool,
}

pub struct ItemProcessor<'a> {
    ctx: &'a OrchestratorContext,
}

impl<'a> ItemProcessor<'a> {
    pub fn new(ctx: &'a OrchestratorContext) -> Self {
        Self { ctx }
    }

    pub async fn process(&self, owner: TrackOwner<'_>, track: &SubtitleTrack) -> TrackDisposition {
        let language = track.language_code.clone();

        if !track.is_eligible() {
            self.emit(SyncEvent::TrackSkipped {
                context: owner.label.to_string(),
                language,
                reason: SkipReason::Ineligible,
            });
            return TrackDisposition::Ineligible;
        }

        if !owner.bypass_cache && self.ctx.cache.contains(owner.kind, &track.path).await {
            self.emit(SyncEvent::TrackSkipped {
                context: owner.label.to_string(),
                language,
                reason: SkipReason::Cached,
            });
            return TrackDisposition::CacheHit;
        }

        let request = SyncRequest::new(owner.kind, owner.external_id, track)
            .golden_section(self.ctx.options.golden_section)
            .fix_framerate(self.ctx.options.fix_framerate);

        self.emit(SyncEvent::TrackSyncing {
            context: owner.label.to_string(),
            language: language.clone(),
        });

        let server = self.ctx.server.as_ref();
        let mut outcome = request_sync(server, &request).await;
        let mut retried = false;

        if let SyncOutcome::Failure(message) = &outcome {
            debug!(path = %track.path, reason = %message, "Sync failed, retrying once");
            self.emit(SyncEvent::TrackRetrying {
                context: owner.label.to_string(),
                language: language.clone(),
                message: message.clone(),
            });

            if self.wait(self.ctx.options.retry_delay).await {
                outcome = request_sync(server, &request).await;
                retried = true;
            }
        }

        let disposition = match outcome {
            SyncOutcome::Success => {
                self.ctx.cache.record(owner.kind, &track.path).await;
                TrackDisposition::Synced { retried }
            }
            SyncOutcome::AlreadyInSync(reason) => {
                self.ctx.cache.record(owner.kind, &track.path).await;
                TrackDisposition::AlreadyInSync { reason, retried }
            }
            SyncOutcome::Failure(reason) => {
                warn!(path = %track.path, reason = %reason, "Subtitle sync failed");
                TrackDisposition::Failed { reason }
            }
        };

        let (result, message) = match &disposition {
            TrackDisposition::AlreadyInSync { reason, .. } => {
                (TrackResult::AlreadyInSync, Some(reason.clone()))
            }
            TrackDisposition::Failed { reason } => (TrackResult::Failed, Some(reason.clone())),
            _ => (TrackResult::Synced, None),
        };
        self.emit(SyncEvent::TrackFinished {
            context: owner.label.to_string(),
            language,
            result,
            message,
            retried,
        });

        self.wait(self.ctx.options.item_delay).await;
        disposition
    }

    /// Sleep unless cancelled first. Returns `false` on cancellation.
    async fn wait(&self, delay: Duration) -> bool {
        core_async::select! {
            biased;
            _ = self.ctx.cancel.cancelled() => false,
            _ = pause(delay) => true,
        }
    }

    fn emit(&self, event: SyncEvent) {
        self.ctx.events.emit_sync(event);
    }
}
