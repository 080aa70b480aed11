use bridge_traits::error::BridgeError;
use core_runtime::events::LibraryScope;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Could not query {scope}: {source}")]
    Listing {
        scope: LibraryScope,
        #[source]
        source: BridgeError,
    },

    #[error("Sync cancelled")]
    Cancelled,

    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidSchedule { expression: String, reason: String },

    #[error("Sync task failed: {0}")]
    TaskFailed(String),
}

impl SyncError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
