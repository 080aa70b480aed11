use anyhow::Context;
use bridge_traits::media::MediaServer;
use core_runtime::config::AppConfig;
use core_runtime::events::LibraryScope;
use core_sync::{run_supervised, Selection, SupervisedRun};
use tracing::info;

use crate::cli::SyncTarget;
use crate::commands::{announce_server, connect, interrupted, Session};
use crate::lock::{lock_path, RunLock};

const TITLE_WIDTH: usize = 60;
const TABLE_RULE: usize = 70;

pub struct SyncLibrary;

impl SyncLibrary {
    pub async fn execute(target: &SyncTarget, config: &AppConfig, verbose: bool) -> anyhow::Result<()> {
        let scope = target.scope();
        let server = connect(config)?;

        if target.list() {
            return Self::list(server.as_ref(), scope).await;
        }

        let _lock = RunLock::acquire(&lock_path(&config.cache.movies_cache))?;
        announce_server(server.as_ref()).await;

        let selection = Selection::all()
            .with_ids(target.ids().iter().copied())
            .resume_from(target.continue_from());
        info!(scope = %scope, selection = ?selection, "Starting sync");

        let session = Session::open(server, config, verbose).await;
        let outcome = run_supervised(&session.ctx, scope, selection, interrupted()).await;
        session.finish().await;

        match outcome.with_context(|| format!("Failed to sync {}", scope))? {
            SupervisedRun::Completed(_) => {}
            run @ SupervisedRun::Interrupted { .. } => match run.resume_directive() {
                Some(directive) => {
                    println!("\nStopping current sync. To continue from this point the next time, run:");
                    println!("  {}", directive.command_line(std::env::args()));
                }
                None => println!("\nStopping current sync. No subtitles have been processed yet."),
            },
        }
        Ok(())
    }

    async fn list(server: &dyn MediaServer, scope: LibraryScope) -> anyhow::Result<()> {
        let (id_header, noun, rows) = match scope {
            LibraryScope::Movies => {
                let movies = server.list_movies().await.context("Failed to list movies")?;
                let rows: Vec<_> = movies.into_iter().map(|m| (m.title, m.external_id)).collect();
                ("RadarrId", "movies", rows)
            }
            LibraryScope::Shows => {
                let shows = server.list_shows().await.context("Failed to list series")?;
                let rows: Vec<_> = shows.into_iter().map(|s| (s.title, s.external_id)).collect();
                ("SonarrSeriesId", "series", rows)
            }
        };

        println!("{:<width$} {}", "Title", id_header, width = TITLE_WIDTH);
        println!("{}", "-".repeat(TABLE_RULE));
        for (title, id) in &rows {
            println!("{:<width$} {}", title, id, width = TITLE_WIDTH);
        }
        println!("\nTotal: {} {}", rows.len(), noun);
        Ok(())
    }
}
