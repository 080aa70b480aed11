//! # Sync Action
//!
//! Sends one sync request and turns whatever came back into a
//! [`SyncOutcome`]. No retries happen here; that policy belongs to the
//! processor.

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::media::{MediaServer, SyncRequest, SyncResponse};
use tracing::debug;

/// Meaning of a single sync response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The server realigned the file.
    Success,
    /// Nothing to do; the file was already aligned.
    AlreadyInSync(String),
    /// The request did not produce a usable result.
    Failure(String),
}

impl SyncOutcome {
    /// Success and already-in-sync are both terminal and cacheable.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SyncOutcome::Failure(_))
    }
}

/// Issue one sync request and classify the answer.
pub async fn request_sync(server: &dyn MediaServer, request: &SyncRequest) -> SyncOutcome {
    let outcome = classify(server.request_sync(request).await);
    debug!(path = %request.path, outcome = ?outcome, "Sync request classified");
    outcome
}

/// Map a raw sync response, or the transport error that replaced it, to an
/// outcome.
pub fn classify(response: BridgeResult<SyncResponse>) -> SyncOutcome {
    let response = match response {
        Ok(response) => response,
        Err(BridgeError::Transport(detail)) => {
            return SyncOutcome::Failure(format!("connection error: {}", detail))
        }
        Err(e) => return SyncOutcome::Failure(format!("connection error: {}", e)),
    };

    let body = response.body.trim();
    match response.status {
        204 => SyncOutcome::Success,
        304 => SyncOutcome::AlreadyInSync("no changes needed".to_string()),
        409 => SyncOutcome::AlreadyInSync("already in perfect sync".to_string()),
        400 if body.is_empty() => {
            SyncOutcome::Failure("bad request (check subtitle file)".to_string())
        }
        400 => SyncOutcome::Failure(format!("bad request: {}", body)),
        404 => SyncOutcome::Failure("subtitle file not found".to_string()),
        500 => classify_server_error(body),
        status if body.is_empty() => SyncOutcome::Failure(format!("unknown status: {}", status)),
        status => SyncOutcome::Failure(format!("status {}: {}", status, body)),
    }
}

fn classify_server_error(body: &str) -> SyncOutcome {
    let lower = body.to_lowercase();

    if lower.contains("already synchronized") || lower.contains("already in sync") {
        SyncOutcome::AlreadyInSync("already synchronized".to_string())
    } else if lower.contains("subsync") || lower.contains("ffmpeg") {
        SyncOutcome::Failure("sync tool not available (check subsync/ffmpeg)".to_string())
    } else if body.is_empty() {
        SyncOutcome::Failure("server error during sync".to_string())
    } else {
        SyncOutcome::Failure(format!("server error: {}", body))
    }
}
