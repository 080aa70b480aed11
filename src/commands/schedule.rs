use anyhow::Context;
use bridge_traits::time::SystemClock;
use core_runtime::config::AppConfig;
use core_sync::{ScheduleSpec, Scheduler};
use std::sync::Arc;

use crate::commands::{announce_server, connect, interrupted, Session};
use crate::lock::{lock_path, RunLock};

pub struct Schedule;

impl Schedule {
    pub async fn execute(config: &AppConfig, verbose: bool) -> anyhow::Result<()> {
        let server = connect(config)?;
        let _lock = RunLock::acquire(&lock_path(&config.cache.movies_cache))?;
        announce_server(server.as_ref()).await;

        let session = Session::open(server, config, verbose).await;
        let scheduler = Scheduler::new(
            Self::spec(config),
            session.ctx.clone(),
            Arc::new(SystemClock),
        )
        .context("Failed to start scheduler")?;

        let result = scheduler.run(interrupted()).await;
        drop(scheduler);
        session.finish().await;
        result.context("Scheduler failed")
    }

    fn spec(config: &AppConfig) -> ScheduleSpec {
        let schedule = &config.schedule;
        ScheduleSpec {
            enabled: schedule.enabled,
            cron_expression: schedule.cron_expression.clone(),
            timezone: schedule.timezone.clone(),
            run_movies: schedule.sync_movies,
            run_shows: schedule.sync_shows,
            run_initial: schedule.run_initial,
        }
    }
}
