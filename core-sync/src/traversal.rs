//! # Traversal Engine
//!
//! Walks the movie catalog, or the show catalog and each show's episodes,
//! and hands every subtitle track to the [`ItemProcessor`].
//!
//! ## Selection
//!
//! - An id allow-list restricts which movies or shows are visited at all.
//!   Units outside it are not counted. When it is set, cache lookups are
//!   bypassed so the listed items are always resent.
//! - A resume marker skips every movie (or episode) before the one with the
//!   marker id. The marker unit itself is processed in full. Tracks of
//!   skipped units count as skipped. A show none of whose episodes is
//!   admitted is announced as skipped, like a movie.
//!
//! ## Progress
//!
//! Before the tracks of a movie or episode are processed, its id is sent on
//! the optional progress channel. A supervisor that saw id `N` last can
//! safely resume from `N`: that unit was not yet known to be complete.
//!
//! The cancellation token is checked between units and between tracks,
//! never during a request.

use bridge_traits::media::{ExternalId, MediaKind};
use core_async::sync::mpsc;
use core_runtime::events::{LibraryScope, SyncEvent};
use tracing::{debug, info, instrument, warn};

use crate::context::{OrchestratorContext, Selection};
use crate::error::{Result, SyncError};
use crate::processor::{ItemProcessor, TrackOwner};
use crate::summary::SyncSummary;

/// Sending half of the progress channel.
pub type ProgressSender = mpsc::Sender<ExternalId>;

/// Capacity of the progress channel. One slot makes each send a near
/// rendezvous with the supervisor.
pub const PROGRESS_CAPACITY: usize = 1;

/// Sync every selected movie.
#[instrument(skip_all, fields(scope = "movies"))]
pub async fn sync_movies(
    ctx: &OrchestratorContext,
    selection: &Selection,
    progress: Option<ProgressSender>,
) -> Result<SyncSummary> {
    let movies = ctx
        .server
        .list_movies()
        .await
        .map_err(|source| SyncError::Listing {
            scope: LibraryScope::Movies,
            source,
        })?;

    let total = movies.len();
    info!(total, "Movie catalog loaded");
    ctx.events.emit_sync(SyncEvent::CatalogLoaded {
        scope: LibraryScope::Movies,
        total,
    });

    let processor = ItemProcessor::new(ctx);
    let bypass_cache = selection.has_id_filter();
    let mut resume = ResumeFilter::new(selection.resume_from);
    let mut summary = SyncSummary::default();

    for (position, movie) in movies.iter().enumerate() {
        let index = position + 1;
        if !selection.is_selected(movie.external_id) {
            continue;
        }
        ensure_active(ctx)?;

        if !resume.admits(movie.external_id) {
            summary.skipped += movie.subtitle_tracks.len() as u64;
            ctx.events.emit_sync(SyncEvent::UnitSkipped {
                scope: LibraryScope::Movies,
                index,
                total,
                title: movie.title.clone(),
            });
            continue;
        }

        report_progress(ctx, progress.as_ref(), movie.external_id).await;
        ctx.events.emit_sync(SyncEvent::UnitStarted {
            scope: LibraryScope::Movies,
            index,
            total,
            title: movie.title.clone(),
            external_id: movie.external_id,
            children: movie.subtitle_tracks.len(),
        });

        let owner = TrackOwner {
            kind: MediaKind::Movie,
            external_id: movie.external_id,
            label: "",
            bypass_cache,
        };
        for track in &movie.subtitle_tracks {
            ensure_active(ctx)?;
            summary.record(&processor.process(owner, track).await);
        }
    }

    resume.warn_if_unmatched();
    ctx.events
        .emit_sync(summary.completed_event(LibraryScope::Movies));
    Ok(summary)
}

/// Sync every episode of every selected show.
#[instrument(skip_all, fields(scope = "shows"))]
pub async fn sync_shows(
    ctx: &OrchestratorContext,
    selection: &Selection,
    progress: Option<ProgressSender>,
) -> Result<SyncSummary> {
    let shows = ctx
        .server
        .list_shows()
        .await
        .map_err(|source| SyncError::Listing {
            scope: LibraryScope::Shows,
            source,
        })?;

    let total = shows.len();
    info!(total, "Show catalog loaded");
    ctx.events.emit_sync(SyncEvent::CatalogLoaded {
        scope: LibraryScope::Shows,
        total,
    });

    let processor = ItemProcessor::new(ctx);
    let bypass_cache = selection.has_id_filter();
    let mut resume = ResumeFilter::new(selection.resume_from);
    let mut summary = SyncSummary::default();

    for (position, show) in shows.iter().enumerate() {
        let index = position + 1;
        if !selection.is_selected(show.external_id) {
            continue;
        }
        ensure_active(ctx)?;

        let episodes = match ctx.server.list_episodes(show.external_id).await {
            Ok(episodes) => episodes,
            Err(e) => {
                warn!(show = %show.title, error = %e, "Could not query episodes, skipping show");
                ctx.events.emit_sync(SyncEvent::EpisodesUnavailable {
                    index,
                    total,
                    title: show.title.clone(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        if !resume.admits_any(episodes.iter().map(|e| e.external_id)) {
            summary.skipped += episodes
                .iter()
                .map(|e| e.subtitle_tracks.len() as u64)
                .sum::<u64>();
            ctx.events.emit_sync(SyncEvent::UnitSkipped {
                scope: LibraryScope::Shows,
                index,
                total,
                title: show.title.clone(),
            });
            continue;
        }

        ctx.events.emit_sync(SyncEvent::UnitStarted {
            scope: LibraryScope::Shows,
            index,
            total,
            title: show.title.clone(),
            external_id: show.external_id,
            children: episodes.len(),
        });

        for episode in &episodes {
            if !resume.admits(episode.external_id) {
                summary.skipped += episode.subtitle_tracks.len() as u64;
                continue;
            }

            if episode.subtitle_tracks.is_empty() {
                continue;
            }
            ensure_active(ctx)?;
            report_progress(ctx, progress.as_ref(), episode.external_id).await;

            let owner = TrackOwner {
                kind: MediaKind::Episode,
                external_id: episode.external_id,
                label: &episode.title,
                bypass_cache,
            };
            for track in &episode.subtitle_tracks {
                ensure_active(ctx)?;
                summary.record(&processor.process(owner, track).await);
            }
        }
    }

    resume.warn_if_unmatched();
    ctx.events
        .emit_sync(summary.completed_event(LibraryScope::Shows));
    Ok(summary)
}

fn ensure_active(ctx: &OrchestratorContext) -> Result<()> {
    if ctx.is_cancelled() {
        debug!("Traversal cancelled");
        return Err(SyncError::Cancelled);
    }
    Ok(())
}

async fn report_progress(
    ctx: &OrchestratorContext,
    progress: Option<&ProgressSender>,
    id: ExternalId,
) {
    let Some(sender) = progress else {
        return;
    };

    core_async::select! {
        biased;
        _ = ctx.cancel.cancelled() => {}
        sent = sender.send(id) => {
            if sent.is_err() {
                debug!(id, "Progress receiver dropped");
            }
        }
    }
}

/// Skips units until the resume marker is seen. The marker unit and
/// everything after it are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeFilter {
    waiting_for: Option<ExternalId>,
}

impl ResumeFilter {
    pub fn new(marker: Option<ExternalId>) -> Self {
        Self {
            waiting_for: marker,
        }
    }

    /// Whether the unit with this id should be processed.
    pub fn admits(&mut self, id: ExternalId) -> bool {
        match self.waiting_for {
            None => true,
            Some(marker) if marker == id => {
                debug!(marker, "Reached resume marker");
                self.waiting_for = None;
                true
            }
            Some(_) => false,
        }
    }

    /// Whether any of these ids would be admitted, without consuming the
    /// marker.
    pub fn admits_any(&self, mut ids: impl Iterator<Item = ExternalId>) -> bool {
        match self.waiting_for {
            None => true,
            Some(marker) => ids.any(|id| id == marker),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.waiting_for.is_some()
    }

    fn warn_if_unmatched(&self) {
        if let Some(marker) = self.waiting_for {
            warn!(marker, "Resume marker never matched; every unit was skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_filter_admits_marker_and_after() {
        let mut filter = ResumeFilter::new(Some(20));

        assert!(!filter.admits(10));
        assert!(filter.is_pending());
        assert!(filter.admits(20));
        assert!(filter.admits(5));
        assert!(!filter.is_pending());
    }

    #[test]
    fn test_resume_filter_admits_any_leaves_marker_pending() {
        let filter = ResumeFilter::new(Some(102));

        assert!(!filter.admits_any([101].into_iter()));
        assert!(filter.admits_any([101, 102, 103].into_iter()));
        assert!(filter.is_pending());
        assert!(ResumeFilter::new(None).admits_any(std::iter::empty()));
    }

    #[test]
    fn test_resume_filter_without_marker() {
        let mut filter = ResumeFilter::new(None);
        assert!(filter.admits(1));
        assert!(!filter.is_pending());
    }
}
