//! Error types for the Bazarr provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Bazarr provider errors
#[derive(Error, Debug)]
pub enum BazarrError {
    /// API request returned a non-success status
    #[error("Bazarr API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The API key was rejected
    #[error("Bazarr rejected the API key (status {status_code})")]
    Unauthorized { status_code: u16 },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Bazarr operations
pub type Result<T> = std::result::Result<T, BazarrError>;

impl From<BazarrError> for BridgeError {
    fn from(error: BazarrError) -> Self {
        match error {
            BazarrError::ApiError {
                status_code,
                message,
            } => BridgeError::Http {
                status: status_code,
                body: message,
            },
            BazarrError::Unauthorized { status_code } => BridgeError::Http {
                status: status_code,
                body: "invalid API key".to_string(),
            },
            BazarrError::ParseError(msg) => BridgeError::Decode(msg),
            BazarrError::BridgeError(e) => e,
        }
    }
}
