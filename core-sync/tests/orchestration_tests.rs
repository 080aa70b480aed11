//! Integration tests for catalog traversal and supervised runs
//!
//! These tests verify:
//! - Track eligibility and cache hits never reach the server
//! - The retry-once policy
//! - Id allow-lists and resume markers for movies and shows
//! - Idempotence across runs through the on-disk cache
//! - Interrupt handling and resume points

mod common;

use bridge_desktop::TokioFileSystem;
use bridge_traits::error::BridgeError;
use bridge_traits::media::{MediaKind, SyncResponse};
use common::{context, drain, episode, movie, show, track, FakeServer};
use core_async::sync::mpsc;
use core_async::time::{sleep, Duration, Instant};
use core_runtime::events::{CoreEvent, LibraryScope, SkipReason, SyncEvent, TrackResult};
use core_sync::{
    run_supervised, sync_movies, sync_shows, CachePaths, CacheStore, OrchestratorContext,
    Selection, SupervisedRun, SyncError, SyncOptions, SyncSummary, INTERRUPT_GRACE,
};
use std::sync::Arc;
use tempfile::TempDir;

fn disk_cache(dir: &TempDir) -> CacheStore {
    CacheStore::new(
        Arc::new(TokioFileSystem::new()),
        CachePaths {
            movies: dir.path().join("movies-cache"),
            shows: dir.path().join("shows-cache"),
        },
    )
}

fn three_movies() -> Vec<bridge_traits::media::MediaLibraryEntry> {
    vec![
        movie(10, "Alien", vec![track("/m/alien.en.srt", "en")]),
        movie(20, "Brazil", vec![track("/m/brazil.en.srt", "en")]),
        movie(30, "Casablanca", vec![track("/m/casablanca.en.srt", "en")]),
    ]
}

// ============================================================================
// Item processing
// ============================================================================

#[tokio::test]
async fn test_ineligible_tracks_are_never_sent() {
    let mut embedded = track("", "en");
    embedded.file_size_bytes = 4096;
    let mut empty = track("/m/a.fr.srt", "fr");
    empty.file_size_bytes = 0;

    let server = Arc::new(FakeServer::with_movies(vec![movie(1, "A", vec![embedded, empty])]));
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    let mut events = ctx.events.subscribe();

    let summary = sync_movies(&ctx, &Selection::all(), None).await.unwrap();

    assert!(server.calls().is_empty());
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.total(), 2);

    let skips = drain(&mut events)
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                CoreEvent::Sync(SyncEvent::TrackSkipped {
                    reason: SkipReason::Ineligible,
                    ..
                })
            )
        })
        .count();
    assert_eq!(skips, 2);
}

#[tokio::test]
async fn test_cached_track_is_never_sent() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("movies-cache"), "/m/alien.en.srt\n").unwrap();

    let cache = Arc::new(disk_cache(&dir));
    cache.reload().await;

    let server = Arc::new(FakeServer::with_movies(vec![movie(
        10,
        "Alien",
        vec![track("/m/alien.en.srt", "en"), track("/m/alien.de.srt", "de")],
    )]));
    let ctx = context(server.clone(), cache);

    let summary = sync_movies(&ctx, &Selection::all(), None).await.unwrap();

    assert_eq!(server.called_paths(), vec!["/m/alien.de.srt"]);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.newly_synced, 1);
}

#[tokio::test]
async fn test_success_is_recorded_in_cache() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(disk_cache(&dir));
    let server = Arc::new(FakeServer::with_movies(vec![movie(
        10,
        "Alien",
        vec![track("/m/alien.en.srt", "en")],
    )]));
    let ctx = context(server.clone(), cache.clone());

    sync_movies(&ctx, &Selection::all(), None).await.unwrap();

    assert!(cache.contains(MediaKind::Movie, "/m/alien.en.srt").await);
    let on_disk = std::fs::read_to_string(dir.path().join("movies-cache")).unwrap();
    assert_eq!(on_disk, "/m/alien.en.srt\n");
}

#[tokio::test]
async fn test_conflict_counts_as_already_in_sync() {
    let server = Arc::new(FakeServer::with_movies(vec![movie(
        10,
        "Alien",
        vec![track("/m/alien.en.srt", "en")],
    )]));
    server.script("/m/alien.en.srt", vec![Ok(SyncResponse::new(409, ""))]);
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    let mut events = ctx.events.subscribe();

    let summary = sync_movies(&ctx, &Selection::all(), None).await.unwrap();

    assert_eq!(summary.already_in_sync, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(server.calls().len(), 1);
    assert!(drain(&mut events).contains(&CoreEvent::Sync(SyncEvent::TrackFinished {
        context: String::new(),
        language: "en".to_string(),
        result: TrackResult::AlreadyInSync,
        message: Some("already in perfect sync".to_string()),
        retried: false,
    })));
}

#[tokio::test]
async fn test_failure_is_retried_once_and_second_result_wins() {
    let server = Arc::new(FakeServer::with_movies(vec![movie(
        10,
        "Alien",
        vec![track("/m/alien.en.srt", "en")],
    )]));
    server.script(
        "/m/alien.en.srt",
        vec![
            Err(BridgeError::Transport("connection reset".to_string())),
            Ok(SyncResponse::new(204, "")),
        ],
    );
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    let mut events = ctx.events.subscribe();

    let summary = sync_movies(&ctx, &Selection::all(), None).await.unwrap();

    assert_eq!(server.calls().len(), 2);
    assert_eq!(summary.newly_synced, 1);
    assert_eq!(summary.failed, 0);

    let events = drain(&mut events);
    assert!(events.contains(&CoreEvent::Sync(SyncEvent::TrackRetrying {
        context: String::new(),
        language: "en".to_string(),
        message: "connection error: connection reset".to_string(),
    })));
}

#[tokio::test]
async fn test_never_more_than_two_attempts() {
    let server = Arc::new(FakeServer::with_movies(vec![movie(
        10,
        "Alien",
        vec![track("/m/alien.en.srt", "en")],
    )]));
    server.script(
        "/m/alien.en.srt",
        vec![
            Ok(SyncResponse::new(502, "Bad Gateway")),
            Ok(SyncResponse::new(500, "Traceback")),
            Ok(SyncResponse::new(204, "")),
        ],
    );
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    let mut events = ctx.events.subscribe();

    let summary = sync_movies(&ctx, &Selection::all(), None).await.unwrap();

    assert_eq!(server.calls().len(), 2);
    assert_eq!(summary.failed, 1);
    assert!(drain(&mut events).contains(&CoreEvent::Sync(SyncEvent::TrackFinished {
        context: String::new(),
        language: "en".to_string(),
        result: TrackResult::Failed,
        message: Some("server error: Traceback".to_string()),
        retried: true,
    })));
}

#[tokio::test]
async fn test_sync_options_reach_the_request() {
    let server = Arc::new(FakeServer::with_movies(vec![movie(
        10,
        "Alien",
        vec![track("/m/alien.en.srt", "en")],
    )]));
    let mut ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    ctx.options = SyncOptions {
        golden_section: true,
        fix_framerate: false,
        ..SyncOptions::default().without_delays()
    };

    sync_movies(&ctx, &Selection::all(), None).await.unwrap();

    let calls = server.calls();
    let call = &calls[0];
    assert_eq!(call.media_kind, MediaKind::Movie);
    assert_eq!(call.external_id, 10);
    assert!(call.use_golden_section);
    assert!(!call.fix_framerate);
}

// ============================================================================
// Movie traversal
// ============================================================================

#[tokio::test]
async fn test_id_filter_restricts_movies() {
    let server = Arc::new(FakeServer::with_movies(three_movies()));
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));

    let summary = sync_movies(&ctx, &Selection::all().with_ids([20]), None)
        .await
        .unwrap();

    assert_eq!(server.called_paths(), vec!["/m/brazil.en.srt"]);
    assert_eq!(
        summary,
        SyncSummary {
            newly_synced: 1,
            ..Default::default()
        }
    );
}

#[tokio::test]
async fn test_id_filter_bypasses_cache() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("movies-cache"), "/m/brazil.en.srt\n").unwrap();
    let cache = Arc::new(disk_cache(&dir));
    cache.reload().await;

    let server = Arc::new(FakeServer::with_movies(three_movies()));
    let ctx = context(server.clone(), cache);

    sync_movies(&ctx, &Selection::all().with_ids([20]), None)
        .await
        .unwrap();

    assert_eq!(server.called_paths(), vec!["/m/brazil.en.srt"]);
}

#[tokio::test]
async fn test_resume_marker_processes_marker_movie() {
    let server = Arc::new(FakeServer::with_movies(three_movies()));
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    let mut events = ctx.events.subscribe();

    let summary = sync_movies(&ctx, &Selection::all().resume_from(Some(20)), None)
        .await
        .unwrap();

    assert_eq!(
        server.called_paths(),
        vec!["/m/brazil.en.srt", "/m/casablanca.en.srt"]
    );
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.newly_synced, 2);
    assert!(drain(&mut events).contains(&CoreEvent::Sync(SyncEvent::UnitSkipped {
        scope: LibraryScope::Movies,
        index: 1,
        total: 3,
        title: "Alien".to_string(),
    })));
}

#[tokio::test]
async fn test_every_track_of_a_movie_is_processed() {
    let server = Arc::new(FakeServer::with_movies(vec![movie(
        10,
        "Alien",
        vec![
            track("/m/alien.en.srt", "en"),
            track("/m/alien.fr.srt", "fr"),
            track("/m/alien.de.srt", "de"),
        ],
    )]));
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));

    let summary = sync_movies(&ctx, &Selection::all(), None).await.unwrap();

    assert_eq!(server.calls().len(), 3);
    assert_eq!(summary.newly_synced, 3);
}

#[tokio::test]
async fn test_movie_listing_failure_is_fatal() {
    let server = Arc::new(FakeServer::failing());
    let ctx = context(server, Arc::new(CacheStore::disabled()));

    let err = sync_movies(&ctx, &Selection::all(), None).await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Listing {
            scope: LibraryScope::Movies,
            source: BridgeError::Http { status: 500, .. }
        }
    ));
}

#[tokio::test]
async fn test_movie_progress_is_emitted_in_catalog_order() {
    let server = Arc::new(FakeServer::with_movies(three_movies()));
    let ctx = context(server, Arc::new(CacheStore::disabled()));
    let (tx, mut rx) = mpsc::channel(8);

    sync_movies(&ctx, &Selection::all(), Some(tx)).await.unwrap();

    let mut seen = Vec::new();
    while let Some(id) = rx.recv().await {
        seen.push(id);
    }
    assert_eq!(seen, vec![10, 20, 30]);
}

// ============================================================================
// Show traversal
// ============================================================================

fn library_with_shows() -> FakeServer {
    FakeServer::with_shows(
        vec![show(1, "Dark"), show(2, "Broken"), show(3, "Fargo")],
        vec![
            (
                1,
                vec![
                    episode(
                        101,
                        "Secrets",
                        vec![track("/tv/dark/101.en.srt", "en"), track("/tv/dark/101.de.srt", "de")],
                    ),
                    episode(102, "Lies", vec![track("/tv/dark/102.en.srt", "en")]),
                    episode(103, "Past and Present", vec![]),
                ],
            ),
            (
                3,
                vec![episode(301, "The Crocodile", vec![track("/tv/fargo/301.en.srt", "en")])],
            ),
        ],
    )
}

#[tokio::test]
async fn test_show_with_failed_episode_listing_is_skipped() {
    let server = Arc::new(library_with_shows());
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    let mut events = ctx.events.subscribe();

    let summary = sync_shows(&ctx, &Selection::all(), None).await.unwrap();

    assert_eq!(summary.newly_synced, 4);
    assert_eq!(server.calls().len(), 4);
    assert!(server.calls().iter().all(|c| c.media_kind == MediaKind::Episode));

    let unavailable = drain(&mut events).into_iter().find_map(|e| match e {
        CoreEvent::Sync(SyncEvent::EpisodesUnavailable { index, title, .. }) => Some((index, title)),
        _ => None,
    });
    assert_eq!(unavailable, Some((2, "Broken".to_string())));
}

#[tokio::test]
async fn test_show_id_filter() {
    let server = Arc::new(library_with_shows());
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));

    sync_shows(&ctx, &Selection::all().with_ids([3]), None)
        .await
        .unwrap();

    assert_eq!(server.called_paths(), vec!["/tv/fargo/301.en.srt"]);
    assert_eq!(server.listings(), vec!["series", "episodes"]);
}

#[tokio::test]
async fn test_show_resume_at_episode_boundary() {
    let server = Arc::new(library_with_shows());
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));

    let summary = sync_shows(&ctx, &Selection::all().resume_from(Some(102)), None)
        .await
        .unwrap();

    assert_eq!(
        server.called_paths(),
        vec!["/tv/dark/102.en.srt", "/tv/fargo/301.en.srt"]
    );
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.newly_synced, 2);
}

/// Resume marker on an episode with several tracks, after a show that lies
/// entirely before it.
fn library_with_marker_mid_show() -> FakeServer {
    FakeServer::with_shows(
        vec![show(1, "Dark"), show(2, "Fargo")],
        vec![
            (
                1,
                vec![episode(101, "Secrets", vec![track("/tv/dark/101.en.srt", "en")])],
            ),
            (
                2,
                vec![
                    episode(201, "The Crocodile", vec![track("/tv/fargo/201.en.srt", "en")]),
                    episode(
                        202,
                        "The Rooster Prince",
                        vec![
                            track("/tv/fargo/202.en.srt", "en"),
                            track("/tv/fargo/202.de.srt", "de"),
                            track("/tv/fargo/202.fr.srt", "fr"),
                        ],
                    ),
                    episode(203, "A Muddy Road", vec![track("/tv/fargo/203.en.srt", "en")]),
                ],
            ),
        ],
    )
}

#[tokio::test]
async fn test_marker_episode_is_processed_in_full() {
    let server = Arc::new(library_with_marker_mid_show());
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    let (tx, mut rx) = mpsc::channel(8);

    let summary = sync_shows(&ctx, &Selection::all().resume_from(Some(202)), Some(tx))
        .await
        .unwrap();

    assert_eq!(
        server.called_paths(),
        vec![
            "/tv/fargo/202.en.srt",
            "/tv/fargo/202.de.srt",
            "/tv/fargo/202.fr.srt",
            "/tv/fargo/203.en.srt"
        ]
    );
    assert_eq!(summary.newly_synced, 4);
    assert_eq!(summary.skipped, 2);

    let mut seen = Vec::new();
    while let Some(id) = rx.recv().await {
        seen.push(id);
    }
    assert_eq!(seen, vec![202, 203]);
}

#[tokio::test]
async fn test_show_before_marker_is_announced_as_skipped() {
    let server = Arc::new(library_with_marker_mid_show());
    let ctx = context(server, Arc::new(CacheStore::disabled()));
    let mut events = ctx.events.subscribe();

    sync_shows(&ctx, &Selection::all().resume_from(Some(202)), None)
        .await
        .unwrap();

    let units: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            CoreEvent::Sync(SyncEvent::UnitSkipped { title, .. }) => Some(("skipped", title)),
            CoreEvent::Sync(SyncEvent::UnitStarted { title, .. }) => Some(("started", title)),
            _ => None,
        })
        .collect();
    assert_eq!(
        units,
        vec![
            ("skipped", "Dark".to_string()),
            ("started", "Fargo".to_string())
        ]
    );
}

#[tokio::test]
async fn test_episode_progress_and_labels() {
    let server = Arc::new(library_with_shows());
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    let mut events = ctx.events.subscribe();
    let (tx, mut rx) = mpsc::channel(8);

    sync_shows(&ctx, &Selection::all(), Some(tx)).await.unwrap();

    let mut seen = Vec::new();
    while let Some(id) = rx.recv().await {
        seen.push(id);
    }
    assert_eq!(seen, vec![101, 102, 301]);

    assert!(drain(&mut events).contains(&CoreEvent::Sync(SyncEvent::TrackSyncing {
        context: "Lies".to_string(),
        language: "en".to_string(),
    })));
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_second_run_is_all_cache_hits() {
    let dir = TempDir::new().unwrap();
    let server = Arc::new(library_with_shows());

    let first = {
        let cache = Arc::new(disk_cache(&dir));
        cache.reload().await;
        sync_shows(&context(server.clone(), cache), &Selection::all(), None)
            .await
            .unwrap()
    };
    assert_eq!(first.newly_synced, 4);

    let second = {
        let cache = Arc::new(disk_cache(&dir));
        cache.reload().await;
        sync_shows(&context(server.clone(), cache), &Selection::all(), None)
            .await
            .unwrap()
    };

    assert_eq!(second.newly_synced, 0);
    assert_eq!(second.skipped, 4);
    assert_eq!(server.calls().len(), 4);
}

// ============================================================================
// Supervision
// ============================================================================

#[tokio::test]
async fn test_supervised_run_completes() {
    let server = Arc::new(FakeServer::with_movies(three_movies()));
    let ctx = context(server, Arc::new(CacheStore::disabled()));

    let run = run_supervised(
        &ctx,
        LibraryScope::Movies,
        Selection::all(),
        std::future::pending::<()>(),
    )
    .await
    .unwrap();

    match run {
        SupervisedRun::Completed(summary) => assert_eq!(summary.newly_synced, 3),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_supervised_run_propagates_listing_error() {
    let server = Arc::new(FakeServer::failing());
    let ctx = context(server, Arc::new(CacheStore::disabled()));

    let result = run_supervised(
        &ctx,
        LibraryScope::Shows,
        Selection::all(),
        std::future::pending::<()>(),
    )
    .await;

    assert!(matches!(result, Err(SyncError::Listing { .. })));
}

fn paced_context(server: Arc<FakeServer>) -> OrchestratorContext {
    let mut ctx = context(server, Arc::new(CacheStore::disabled()));
    ctx.options = SyncOptions::default();
    ctx
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_yields_resume_point_and_resume_finishes() {
    let server = Arc::new(FakeServer::with_movies(three_movies()));
    let interrupt = server.interrupt_on_call(2);
    let ctx = paced_context(server.clone());
    let mut events = ctx.events.subscribe();

    let run = run_supervised(&ctx, LibraryScope::Movies, Selection::all(), interrupt)
        .await
        .unwrap();

    assert_eq!(run, SupervisedRun::Interrupted { last_seen: Some(20) });
    assert_eq!(
        server.called_paths(),
        vec!["/m/alien.en.srt", "/m/brazil.en.srt"]
    );
    assert!(drain(&mut events).contains(&CoreEvent::Sync(SyncEvent::Interrupted {
        scope: LibraryScope::Movies,
        last_seen: Some(20),
    })));

    let directive = run.resume_directive().unwrap();
    let resumed = run_supervised(
        &ctx,
        LibraryScope::Movies,
        Selection::all().resume_from(Some(directive.resume_from)),
        std::future::pending::<()>(),
    )
    .await
    .unwrap();

    assert!(matches!(resumed, SupervisedRun::Completed(_)));
    assert_eq!(
        server.called_paths(),
        vec![
            "/m/alien.en.srt",
            "/m/brazil.en.srt",
            "/m/brazil.en.srt",
            "/m/casablanca.en.srt"
        ]
    );
}

#[tokio::test]
async fn test_interrupt_before_any_progress() {
    let server = Arc::new(FakeServer::with_movies(three_movies()));
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));

    let run = run_supervised(
        &ctx,
        LibraryScope::Movies,
        Selection::all(),
        std::future::ready(()),
    )
    .await
    .unwrap();

    assert_eq!(run, SupervisedRun::Interrupted { last_seen: None });
    assert!(run.resume_directive().is_none());
    assert!(server.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_abandons_request_that_never_answers() {
    let mut server = FakeServer::with_movies(three_movies());
    server.never_answer = true;
    let server = Arc::new(server);
    let ctx = context(server.clone(), Arc::new(CacheStore::disabled()));
    let started = Instant::now();

    let run = run_supervised(
        &ctx,
        LibraryScope::Movies,
        Selection::all(),
        sleep(Duration::from_millis(200)),
    )
    .await
    .unwrap();

    assert_eq!(run, SupervisedRun::Interrupted { last_seen: Some(10) });
    assert_eq!(run.resume_directive().unwrap().resume_from, 10);
    assert_eq!(server.called_paths(), vec!["/m/alien.en.srt"]);
    assert!(started.elapsed() <= Duration::from_millis(200) + INTERRUPT_GRACE);
}
