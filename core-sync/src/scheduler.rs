//! # Scheduler
//!
//! Fires full library syncs on a cron cadence in a configured timezone.
//!
//! ```text
//! Idle ──enabled──> Armed ──fire time──> Firing ──done──> Armed ...
//!   │
//!   └──disabled──> OneShot ──done──> Terminated
//! ```
//!
//! Each firing reloads the cache and then syncs shows before movies, each
//! behind its own flag. The next fire time is computed from the clock after
//! every firing. An interrupt stops future firings; a firing in progress is
//! cancelled cooperatively and given a bounded grace period to finish its
//! current request.

use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use core_async::time::{sleep, Duration, Instant};
use core_runtime::events::ScheduleEvent;
use croner::Cron;
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::context::{OrchestratorContext, Selection};
use crate::controller::INTERRUPT_GRACE;
use crate::error::{Result, SyncError};
use crate::summary::SyncSummary;
use crate::traversal::{sync_movies, sync_shows};

/// Format used when reporting fire times.
pub const FIRE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Recurring-run settings, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSpec {
    pub enabled: bool,
    pub cron_expression: String,
    /// IANA timezone name.
    pub timezone: String,
    pub run_movies: bool,
    pub run_shows: bool,
    /// Fire once immediately, before the first scheduled time.
    pub run_initial: bool,
}

impl Default for ScheduleSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            cron_expression: "0 1 * * 0".to_string(),
            timezone: "UTC".to_string(),
            run_movies: true,
            run_shows: true,
            run_initial: false,
        }
    }
}

/// Parse a five-field cron expression.
pub fn parse_cron(expression: &str) -> Result<Cron> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(SyncError::InvalidSchedule {
            expression: expression.to_string(),
            reason: "expression is empty".to_string(),
        });
    }

    Cron::new(trimmed)
        .parse()
        .map_err(|e| SyncError::InvalidSchedule {
            expression: expression.to_string(),
            reason: e.to_string(),
        })
}

/// Resolve an IANA timezone name, falling back to UTC.
pub fn resolve_timezone(name: &str) -> Tz {
    match name.trim().parse::<Tz>() {
        Ok(tz) => tz,
        Err(e) => {
            warn!(timezone = %name, error = %e, "Invalid timezone, using UTC instead");
            Tz::UTC
        }
    }
}

pub struct Scheduler {
    spec: ScheduleSpec,
    /// Present only when recurring mode is enabled.
    cron: Option<Cron>,
    timezone: Tz,
    ctx: OrchestratorContext,
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    /// Build a scheduler. An invalid cron expression is rejected here when
    /// recurring mode is enabled.
    pub fn new(spec: ScheduleSpec, ctx: OrchestratorContext, clock: Arc<dyn Clock>) -> Result<Self> {
        let cron = if spec.enabled {
            Some(parse_cron(&spec.cron_expression)?)
        } else {
            None
        };
        let timezone = resolve_timezone(&spec.timezone);

        Ok(Self {
            spec,
            cron,
            timezone,
            ctx,
            clock,
        })
    }

    pub fn spec(&self) -> &ScheduleSpec {
        &self.spec
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Next fire time strictly after the clock's current time, or `None` in
    /// one-shot mode.
    pub fn next_fire(&self) -> Result<Option<DateTime<Tz>>> {
        let Some(cron) = &self.cron else {
            return Ok(None);
        };

        let now = self.clock.now().with_timezone(&self.timezone);
        cron.find_next_occurrence(&now, false)
            .map(Some)
            .map_err(|e| SyncError::InvalidSchedule {
                expression: self.spec.cron_expression.clone(),
                reason: e.to_string(),
            })
    }

    /// Run until `shutdown` resolves, or after one firing in one-shot mode.
    #[instrument(skip_all, fields(cron = %self.spec.cron_expression, timezone = %self.timezone))]
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future,
    {
        let mut shutdown = pin!(shutdown);

        if self.cron.is_none() {
            info!("Scheduling disabled, running a single sync");
            let interrupted = self.fire_until(false, &mut shutdown).await;
            if interrupted {
                info!("Interrupted during one-shot sync");
            }
            self.ctx.events.emit_schedule(ScheduleEvent::Stopped);
            return Ok(());
        }

        if self.spec.run_initial && self.fire_until(true, &mut shutdown).await {
            return self.stop();
        }

        loop {
            let Some(next) = self.next_fire()? else {
                return self.stop();
            };

            info!(next_fire = %next.format(FIRE_TIME_FORMAT), "Scheduler armed");
            self.ctx.events.emit_schedule(ScheduleEvent::Armed {
                next_fire: next.format(FIRE_TIME_FORMAT).to_string(),
                cron_expression: self.spec.cron_expression.clone(),
                timezone: self.timezone.name().to_string(),
            });

            let wait = (next.with_timezone(&Utc) - self.clock.now())
                .to_std()
                .unwrap_or_default();

            let interrupted = core_async::select! {
                _ = &mut shutdown => true,
                _ = sleep(wait) => false,
            };
            if interrupted {
                return self.stop();
            }

            if self.fire_until(false, &mut shutdown).await {
                return self.stop();
            }
        }
    }

    /// Fire once, racing `shutdown`. Returns `true` if shutdown won; the
    /// firing is then cancelled and given [`INTERRUPT_GRACE`] to finish its
    /// current request before it is dropped.
    async fn fire_until<F>(&self, initial: bool, shutdown: &mut std::pin::Pin<&mut F>) -> bool
    where
        F: Future,
    {
        let mut firing = pin!(self.fire(initial));

        let interrupted = core_async::select! {
            biased;
            _ = &mut firing => false,
            _ = shutdown.as_mut() => true,
        };

        if interrupted {
            info!("Interrupt received, stopping current sync");
            self.ctx.cancel.cancel();
            core_async::select! {
                _ = &mut firing => {}
                _ = sleep(INTERRUPT_GRACE) => {
                    warn!(
                        grace_secs = INTERRUPT_GRACE.as_secs(),
                        "In-flight request did not finish, abandoning it"
                    );
                }
            }
        }
        interrupted
    }

    /// One firing: reload the cache, then shows, then movies.
    pub async fn fire(&self, initial: bool) -> SyncSummary {
        let started = Instant::now();
        let started_at = self.clock.now().with_timezone(&self.timezone);
        self.ctx.events.emit_schedule(ScheduleEvent::FiringStarted {
            initial,
            started_at: started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        });

        self.ctx.cache.reload().await;

        let selection = Selection::all();
        let mut summary = SyncSummary::default();

        if self.spec.run_shows && !self.ctx.is_cancelled() {
            match sync_shows(&self.ctx, &selection, None).await {
                Ok(shows) => summary += shows,
                Err(e) => self.log_failure(&e),
            }
        }

        if self.spec.run_movies && !self.ctx.is_cancelled() {
            match sync_movies(&self.ctx, &selection, None).await {
                Ok(movies) => summary += movies,
                Err(e) => self.log_failure(&e),
            }
        }

        let elapsed = started.elapsed();
        info!(
            elapsed_secs = elapsed.as_secs(),
            tracks = summary.total(),
            newly_synced = summary.newly_synced,
            "Scheduled sync finished"
        );
        if summary.has_failures() {
            warn!(failed = summary.failed, "Some subtitles could not be synced this run");
        }
        self.ctx.events.emit_schedule(ScheduleEvent::FiringCompleted {
            initial,
            elapsed_secs: round_secs(elapsed),
        });
        summary
    }

    fn log_failure(&self, e: &SyncError) {
        match e {
            SyncError::Cancelled => info!("Sync cancelled"),
            SyncError::Listing { scope, .. } => {
                error!(error = %e, "Skipping {} this run", scope);
            }
            other => error!(error = %other, "Scheduled sync failed"),
        }
    }

    fn stop(&self) -> Result<()> {
        info!("Scheduler stopped");
        self.ctx.events.emit_schedule(ScheduleEvent::Stopped);
        Ok(())
    }
}

fn round_secs(elapsed: Duration) -> u64 {
    (elapsed.as_millis() as u64 + 500) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_cron() {
        assert!(parse_cron("0 1 * * 0").is_ok());
        assert!(parse_cron("*/15 * * * *").is_ok());

        let err = parse_cron("not a cron").unwrap_err();
        assert!(matches!(err, SyncError::InvalidSchedule { .. }));
        assert!(parse_cron("   ").is_err());
    }

    #[test]
    fn test_resolve_timezone() {
        assert_eq!(resolve_timezone("Europe/Berlin"), Tz::Europe__Berlin);
        assert_eq!(resolve_timezone("Mars/Olympus_Mons"), Tz::UTC);
        assert_eq!(resolve_timezone(""), Tz::UTC);
    }

    #[test]
    fn test_round_secs() {
        assert_eq!(round_secs(Duration::from_millis(1499)), 1);
        assert_eq!(round_secs(Duration::from_millis(1500)), 2);
        assert_eq!(round_secs(Duration::ZERO), 0);
    }

    #[test]
    fn test_next_occurrence_in_timezone() {
        let cron = parse_cron("0 1 * * 0").unwrap();
        let tz = resolve_timezone("America/New_York");
        // Wednesday 2026-10-21 12:00 local
        let now = tz.with_ymd_and_hms(2026, 10, 21, 12, 0, 0).unwrap();

        let next = cron.find_next_occurrence(&now, false).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2026, 10, 25, 1, 0, 0).unwrap());
    }
}
