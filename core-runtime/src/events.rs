//! # Event Bus System
//!
//! Typed progress events published by the sync engine and the scheduler,
//! delivered over `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The engine never prints. Every decision it makes about a unit or a
//! subtitle track is published here, and presentation (the terminal
//! reporter in the CLI, or nothing at all in tests) subscribes.
//!
//! ```text
//! ┌────────────┐   emit    ┌──────────┐  subscribe  ┌──────────────────┐
//! │ Traversal  ├──────────>│          ├────────────>│ TerminalReporter │
//! └────────────┘           │ EventBus │             └──────────────────┘
//! ┌────────────┐   emit    │          │
//! │ Scheduler  ├──────────>│          │
//! └────────────┘           └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, LibraryScope, SyncEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Sync(SyncEvent::CatalogLoaded {
//!         scope: LibraryScope::Movies,
//!         total: 3,
//!     }))
//!     .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.description(), "Catalog loaded");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal.
//! - **`RecvError::Closed`**: every sender is gone; the subscriber should exit.
//!
//! `emit` fails only when nobody is subscribed. Publishers ignore that with
//! `.ok()`.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Progress of a movie or show traversal
    Sync(SyncEvent),
    /// Scheduler lifecycle
    Schedule(ScheduleEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Sync(e) => e.description(),
            CoreEvent::Schedule(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Sync(SyncEvent::TrackFinished {
                result: TrackResult::Failed,
                ..
            }) => EventSeverity::Error,
            CoreEvent::Sync(SyncEvent::EpisodesUnavailable { .. }) => EventSeverity::Warning,
            CoreEvent::Sync(SyncEvent::TrackRetrying { .. }) => EventSeverity::Warning,
            CoreEvent::Sync(SyncEvent::Completed { .. })
            | CoreEvent::Sync(SyncEvent::Interrupted { .. })
            | CoreEvent::Schedule(_) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Which half of the library a traversal walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryScope {
    Movies,
    Shows,
}

impl LibraryScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryScope::Movies => "movies",
            LibraryScope::Shows => "shows",
        }
    }
}

impl fmt::Display for LibraryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a subtitle track was not sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Embedded subtitle, or no file on disk
    Ineligible,
    /// Path already present in the sync cache
    Cached,
}

/// Final state of a track that was sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackResult {
    Synced,
    AlreadyInSync,
    Failed,
}

// ============================================================================
// Sync Events
// ============================================================================

/// Events published while walking the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// Top-level listing returned.
    CatalogLoaded { scope: LibraryScope, total: usize },
    /// A movie or show is about to be processed.
    UnitStarted {
        scope: LibraryScope,
        /// 1-based position in the catalog.
        index: usize,
        total: usize,
        title: String,
        external_id: i64,
        /// Subtitle tracks for a movie, episodes for a show.
        children: usize,
    },
    /// A movie, or a show with no episode at or after the resume marker, was
    /// passed over.
    UnitSkipped {
        scope: LibraryScope,
        index: usize,
        total: usize,
        title: String,
    },
    /// The episode listing for a show failed; the show is skipped.
    EpisodesUnavailable {
        index: usize,
        total: usize,
        title: String,
        message: String,
    },
    /// A track was skipped without contacting the server.
    TrackSkipped {
        /// Episode title for shows, empty for movies.
        context: String,
        language: String,
        reason: SkipReason,
    },
    /// First sync request for a track is in flight.
    TrackSyncing { context: String, language: String },
    /// The first request failed; a second attempt follows after the backoff.
    TrackRetrying {
        context: String,
        language: String,
        message: String,
    },
    /// Final outcome for a track.
    TrackFinished {
        context: String,
        language: String,
        result: TrackResult,
        /// Reason reported by the server, if any.
        message: Option<String>,
        /// Whether this outcome came from the retry.
        retried: bool,
    },
    /// Traversal finished.
    Completed {
        scope: LibraryScope,
        newly_synced: u64,
        already_in_sync: u64,
        skipped: u64,
        failed: u64,
    },
    /// Traversal was stopped by an interrupt.
    Interrupted {
        scope: LibraryScope,
        last_seen: Option<i64>,
    },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::CatalogLoaded { .. } => "Catalog loaded",
            SyncEvent::UnitStarted { .. } => "Processing item",
            SyncEvent::UnitSkipped { .. } => "Item before resume point",
            SyncEvent::EpisodesUnavailable { .. } => "Episode listing failed",
            SyncEvent::TrackSkipped { .. } => "Subtitle skipped",
            SyncEvent::TrackSyncing { .. } => "Subtitle sync requested",
            SyncEvent::TrackRetrying { .. } => "Subtitle sync retrying",
            SyncEvent::TrackFinished { .. } => "Subtitle sync finished",
            SyncEvent::Completed { .. } => "Sync completed",
            SyncEvent::Interrupted { .. } => "Sync interrupted",
        }
    }
}

// ============================================================================
// Schedule Events
// ============================================================================

/// Scheduler lifecycle events. Times are pre-rendered in the schedule's
/// timezone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ScheduleEvent {
    /// Waiting for the next fire time.
    Armed {
        next_fire: String,
        cron_expression: String,
        timezone: String,
    },
    /// A run started.
    FiringStarted { initial: bool, started_at: String },
    /// A run finished.
    FiringCompleted { initial: bool, elapsed_secs: u64 },
    /// The scheduler will not fire again.
    Stopped,
}

impl ScheduleEvent {
    fn description(&self) -> &str {
        match self {
            ScheduleEvent::Armed { .. } => "Next sync scheduled",
            ScheduleEvent::FiringStarted { .. } => "Scheduled sync started",
            ScheduleEvent::FiringCompleted { .. } => "Scheduled sync completed",
            ScheduleEvent::Stopped => "Scheduler stopped",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning is cheap; every clone publishes into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls more than `capacity` events behind receives
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Shorthand for publishing a [`SyncEvent`], ignoring missing subscribers.
    pub fn emit_sync(&self, event: SyncEvent) {
        self.emit(CoreEvent::Sync(event)).ok();
    }

    /// Shorthand for publishing a [`ScheduleEvent`], ignoring missing subscribers.
    pub fn emit_schedule(&self, event: ScheduleEvent) {
        self.emit(CoreEvent::Schedule(event)).ok();
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
