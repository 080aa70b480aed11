//! # Sync Orchestration Engine
//!
//! Bulk-requests subtitle synchronization from a media server, one track at
//! a time.
//!
//! ## Overview
//!
//! This module walks a media catalog and asks the server to align every
//! external subtitle file it finds:
//! - Movies carry their subtitle tracks directly
//! - Shows are expanded into episodes, which carry the tracks
//! - Each track is attempted once, retried once on failure, and recorded in
//!   a persistent cache when it ends up in sync
//!
//! ## Components
//!
//! - **Cache Store** (`cache`): Per-kind set of already-synced paths backed by text files
//! - **Sync Action** (`action`): One request, classified into a `SyncOutcome`
//! - **Item Processor** (`processor`): The per-track attempt/retry/record state machine
//! - **Traversal** (`traversal`): Catalog walk with id and resume filters
//! - **Controller** (`controller`): Runs a traversal under interrupt supervision and derives the resume point
//! - **Scheduler** (`scheduler`): Cron-driven recurring runs
//!
//! Everything a stage needs travels in an [`OrchestratorContext`]. Progress
//! is published on the `core_runtime` event bus; nothing here prints.

pub mod action;
pub mod cache;
pub mod context;
pub mod controller;
pub mod error;
pub mod processor;
pub mod scheduler;
pub mod summary;
pub mod traversal;

pub use action::{classify, request_sync, SyncOutcome};
pub use cache::{CachePaths, CacheStore};
pub use context::{OrchestratorContext, Selection, SyncOptions};
pub use controller::{
    run_supervised, ResumeDirective, SupervisedRun, INTERRUPT_GRACE, RESUME_FLAG,
};
pub use error::{Result, SyncError};
pub use processor::{ItemProcessor, TrackDisposition, TrackOwner};
pub use scheduler::{parse_cron, resolve_timezone, ScheduleSpec, Scheduler};
pub use summary::SyncSummary;
pub use traversal::{sync_movies, sync_shows, ProgressSender, ResumeFilter};
