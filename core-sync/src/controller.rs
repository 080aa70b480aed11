//! # Cancellation & Resume Controller
//!
//! Runs a traversal as its own task and watches two things at once: the
//! progress channel, where the traversal announces each unit before working
//! on it, and an interrupt future supplied by the caller.
//!
//! On interrupt the traversal's token is cancelled and no new unit or track
//! is started. The request in flight gets [`INTERRUPT_GRACE`] to finish;
//! sync requests carry no timeout, so after that it is abandoned and the
//! controller returns. The last id seen on the progress channel becomes the
//! resume marker.

use bridge_traits::media::ExternalId;
use core_async::sync::mpsc;
use core_async::task;
use core_async::time::{sleep, Duration};
use core_runtime::events::{LibraryScope, SyncEvent};
use std::future::Future;
use std::pin::pin;
use tracing::{debug, info, warn};

use crate::context::{OrchestratorContext, Selection};
use crate::error::{Result, SyncError};
use crate::summary::SyncSummary;
use crate::traversal::{sync_movies, sync_shows, PROGRESS_CAPACITY};

/// Flag the CLI uses to pass a resume marker back in.
pub const RESUME_FLAG: &str = "--continue-from";

/// How long an interrupted run waits for its in-flight request.
pub const INTERRUPT_GRACE: Duration = Duration::from_secs(5);

/// How a supervised run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisedRun {
    Completed(SyncSummary),
    Interrupted {
        /// Last unit announced before the interrupt, if any.
        last_seen: Option<ExternalId>,
    },
}

impl SupervisedRun {
    pub fn resume_directive(&self) -> Option<ResumeDirective> {
        match self {
            SupervisedRun::Interrupted {
                last_seen: Some(id),
            } => Some(ResumeDirective { resume_from: *id }),
            _ => None,
        }
    }
}

/// "Run again from this unit."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeDirective {
    pub resume_from: ExternalId,
}

impl ResumeDirective {
    /// Rebuild an invocation that resumes at this marker: the original
    /// arguments with any previous marker removed and the new one appended.
    ///
    /// `args` includes the program name, as in `std::env::args()`.
    pub fn command_line<I, S>(&self, args: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parts: Vec<String> = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            if arg == RESUME_FLAG {
                args.next();
                continue;
            }
            if arg.starts_with(&format!("{}=", RESUME_FLAG)) {
                continue;
            }
            parts.push(arg.to_string());
        }

        parts.push(RESUME_FLAG.to_string());
        parts.push(self.resume_from.to_string());
        parts.join(" ")
    }
}

/// Run one traversal of `scope` under supervision.
///
/// Listing failures come back as errors. An interrupt is not an error: it
/// yields [`SupervisedRun::Interrupted`] once the traversal has stopped.
pub async fn run_supervised<F>(
    ctx: &OrchestratorContext,
    scope: LibraryScope,
    selection: Selection,
    interrupt: F,
) -> Result<SupervisedRun>
where
    F: Future,
{
    let run_ctx = ctx.child();
    let token = run_ctx.cancel.clone();
    let (progress_tx, mut progress_rx) = mpsc::channel::<ExternalId>(PROGRESS_CAPACITY);

    let mut traversal = task::spawn(async move {
        match scope {
            LibraryScope::Movies => sync_movies(&run_ctx, &selection, Some(progress_tx)).await,
            LibraryScope::Shows => sync_shows(&run_ctx, &selection, Some(progress_tx)).await,
        }
    });

    let mut interrupt = pin!(interrupt);
    let mut last_seen: Option<ExternalId> = None;
    let mut interrupted = false;

    loop {
        core_async::select! {
            biased;
            _ = &mut interrupt => {
                interrupted = true;
                break;
            }
            progress = progress_rx.recv() => match progress {
                Some(id) => last_seen = Some(id),
                None => break,
            },
        }
    }

    if interrupted {
        // Units announced before the interrupt was observed still count.
        while let Ok(id) = progress_rx.try_recv() {
            last_seen = Some(id);
        }
        info!(scope = %scope, last_seen = ?last_seen, "Interrupt received, stopping traversal");
        token.cancel();
        drop(progress_rx);
        ctx.events
            .emit_sync(SyncEvent::Interrupted { scope, last_seen });

        core_async::select! {
            joined = &mut traversal => match joined {
                Ok(Err(SyncError::Cancelled)) | Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(error = %e, "Traversal ended with an error after interrupt"),
                Err(e) => warn!(error = %e, "Traversal task failed after interrupt"),
            },
            _ = sleep(INTERRUPT_GRACE) => {
                warn!(
                    grace_secs = INTERRUPT_GRACE.as_secs(),
                    "In-flight request did not finish, abandoning it"
                );
                traversal.abort();
            }
        }
        return Ok(SupervisedRun::Interrupted { last_seen });
    }

    debug!(scope = %scope, "Progress channel closed");
    let summary = traversal
        .await
        .map_err(|e| SyncError::TaskFailed(e.to_string()))??;
    Ok(SupervisedRun::Completed(summary))
}
