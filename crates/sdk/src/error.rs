//! SDK Error Types

use prc_dispatch_core::DispatchError;
use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    /// Queue admission, cancellation or transport failure
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The API answered with JSON of an unexpected shape
    #[error("Response received from server was not what was expected: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Server key must be a non-empty string")]
    InvalidServerKey,

    #[error("Unknown {kind}: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl SdkError {
    /// The upstream response, when the API answered with a non-2xx status
    pub fn response(&self) -> Option<&prc_dispatch_core::ResponseNotOk> {
        match self {
            SdkError::Dispatch(e) => e.as_transport().and_then(|t| t.as_not_ok()),
            _ => None,
        }
    }
}
