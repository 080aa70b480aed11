//! Per-run outcome counters.

use core_runtime::events::{LibraryScope, SyncEvent};
use std::ops::AddAssign;

use crate::processor::TrackDisposition;

/// Counts accumulated over a traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub newly_synced: u64,
    pub already_in_sync: u64,
    /// Ineligible, cached, or before the resume marker.
    pub skipped: u64,
    pub failed: u64,
}

impl SyncSummary {
    pub fn record(&mut self, disposition: &TrackDisposition) {
        match disposition {
            TrackDisposition::Ineligible | TrackDisposition::CacheHit => self.skipped += 1,
            TrackDisposition::Synced { .. } => self.newly_synced += 1,
            TrackDisposition::AlreadyInSync { .. } => self.already_in_sync += 1,
            TrackDisposition::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.newly_synced + self.already_in_sync + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn completed_event(&self, scope: LibraryScope) -> SyncEvent {
        SyncEvent::Completed {
            scope,
            newly_synced: self.newly_synced,
            already_in_sync: self.already_in_sync,
            skipped: self.skipped,
            failed: self.failed,
        }
    }
}

impl AddAssign for SyncSummary {
    fn add_assign(&mut self, other: Self) {
        self.newly_synced += other.newly_synced;
        self.already_in_sync += other.already_in_sync;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}
