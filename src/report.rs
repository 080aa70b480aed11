//! Terminal rendering of engine events.
//!
//! The engine publishes on the event bus and never prints; this is the one
//! place that decides what a user sees on stdout.

use core_runtime::events::{
    CoreEvent, LibraryScope, Receiver, RecvError, ScheduleEvent, SkipReason, SyncEvent,
    TrackResult,
};
use tracing::warn;

const HEADER_RULE: usize = 60;

pub struct TerminalReporter {
    verbose: bool,
    /// Prefix of the track line currently being synced.
    syncing: Option<String>,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            syncing: None,
        }
    }

    /// Print events until every publisher is gone.
    pub async fn run(mut self, mut events: Receiver<CoreEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    for line in self.render(&event) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Reporter fell behind, some progress lines were dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Lines to print for one event.
    pub fn render(&mut self, event: &CoreEvent) -> Vec<String> {
        match event {
            CoreEvent::Sync(event) => self.render_sync(event),
            CoreEvent::Schedule(event) => render_schedule(event),
        }
    }

    fn render_sync(&mut self, event: &SyncEvent) -> Vec<String> {
        match event {
            SyncEvent::CatalogLoaded { scope, total } => vec![
                format!("Found {} {} in your Bazarr library.", total, catalog_noun(*scope)),
                "Starting sync process...".to_string(),
                "-".repeat(HEADER_RULE),
            ],
            SyncEvent::UnitStarted {
                scope,
                index,
                total,
                title,
                children,
                ..
            } => {
                let line = match (scope, children) {
                    (LibraryScope::Movies, 0) => format!("NO SUBS: {}", title),
                    (LibraryScope::Shows, 0) => format!("NO EPISODES: {}", title),
                    (LibraryScope::Movies, n) => format!("PROCESSING: {} ({} subtitles)", title, n),
                    (LibraryScope::Shows, n) => format!("PROCESSING: {} ({} episodes)", title, n),
                };
                vec![format!("\n[{}/{}] {}", index, total, line)]
            }
            SyncEvent::UnitSkipped {
                index,
                total,
                title,
                ..
            } => vec![format!("[{}/{}] SKIPPING: {} (continue mode)", index, total, title)],
            SyncEvent::EpisodesUnavailable {
                index,
                total,
                title,
                message,
            } => {
                let mut line = format!("\n[{}/{}] ERROR: {} - Could not query episodes", index, total, title);
                if self.verbose {
                    line.push_str(&format!(": {}", message));
                }
                vec![line]
            }
            SyncEvent::TrackSkipped {
                context,
                language,
                reason,
            } => {
                let label = track_label(context, language);
                match reason {
                    SkipReason::Ineligible => {
                        vec![format!("  └─ SKIP {}: Embedded or missing subtitle", label)]
                    }
                    SkipReason::Cached => vec![format!("  └─ CACHED {}: Already synced", label)],
                }
            }
            SyncEvent::TrackSyncing { context, language } => {
                self.syncing = Some(format!("  └─ SYNCING {}:", track_label(context, language)));
                Vec::new()
            }
            SyncEvent::TrackRetrying {
                context,
                language,
                message,
            } => {
                let prefix = self.prefix(context, language);
                let mut line = format!("{} ✗ Failed, retrying...", prefix);
                if self.verbose && !message.is_empty() {
                    line.push_str(&format!(" ({})", message));
                }
                self.syncing = Some(prefix);
                vec![line]
            }
            SyncEvent::TrackFinished {
                context,
                language,
                result,
                message,
                ..
            } => {
                let prefix = self.prefix(context, language);
                self.syncing = None;
                let line = match result {
                    TrackResult::Synced => format!("{} ✓ Success", prefix),
                    TrackResult::AlreadyInSync => format!("{} ✓ Already in sync", prefix),
                    TrackResult::Failed => match message {
                        Some(message) if self.verbose => format!("{} ✗ Failed: {}", prefix, message),
                        _ => format!("{} ✗ Failed", prefix),
                    },
                };
                vec![line]
            }
            SyncEvent::Completed {
                newly_synced,
                already_in_sync,
                skipped,
                failed,
                ..
            } => {
                let mut lines = vec![
                    format!("\n{}", "-".repeat(HEADER_RULE)),
                    "Sync completed:".to_string(),
                    format!("  ✅ {} newly synced", newly_synced),
                    format!("  ✓  {} already in sync", already_in_sync),
                    format!("  ⏭️  {} skipped (cached/embedded)", skipped),
                    format!("  ❌ {} failed", failed),
                ];
                if *failed > 0 && !self.verbose {
                    lines.push(
                        "\n💡 Tip: Run with --verbose to see detailed error messages".to_string(),
                    );
                }
                lines
            }
            SyncEvent::Interrupted { .. } => {
                self.syncing = None;
                Vec::new()
            }
        }
    }

    fn prefix(&self, context: &str, language: &str) -> String {
        self.syncing
            .clone()
            .unwrap_or_else(|| format!("  └─ SYNCING {}:", track_label(context, language)))
    }
}

fn render_schedule(event: &ScheduleEvent) -> Vec<String> {
    match event {
        ScheduleEvent::Armed {
            next_fire,
            cron_expression,
            timezone,
        } => vec![format!(
            "\nNext sync scheduled for {} (cron: {}, timezone: {})",
            next_fire, cron_expression, timezone
        )],
        ScheduleEvent::FiringStarted {
            initial,
            started_at,
        } => {
            let kind = if *initial { "initial" } else { "scheduled" };
            vec![format!("\nStarting {} sync at {}", kind, started_at)]
        }
        ScheduleEvent::FiringCompleted { elapsed_secs, .. } => {
            vec![format!("\nSync job completed in {}s", elapsed_secs)]
        }
        ScheduleEvent::Stopped => vec!["Scheduler stopped.".to_string()],
    }
}

fn catalog_noun(scope: LibraryScope) -> &'static str {
    match scope {
        LibraryScope::Movies => "movies",
        LibraryScope::Shows => "series",
    }
}

fn track_label(context: &str, language: &str) -> String {
    if context.is_empty() {
        format!("[{}]", language)
    } else {
        format!("[{} - {}]", context, language)
    }
}
