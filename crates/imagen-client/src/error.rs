//! Vision client error types.

use imagen_wire::WireError;
use thiserror::Error;

use crate::options::OptionParseError;

pub type VisionResult<T> = Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Wire conversion failed: {0}")]
    Wire(#[from] WireError),

    #[error(transparent)]
    InvalidOption(#[from] OptionParseError),

    #[error("Prediction failed: {message}")]
    PredictFailed { message: String, retryable: bool },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unrecognized watermark decision: {0}")]
    UnrecognizedDecision(String),

    #[error("Image has no bytes")]
    MissingImageBytes,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VisionError {
    pub fn predict_failed(msg: impl Into<String>, retryable: bool) -> Self {
        Self::PredictFailed {
            message: msg.into(),
            retryable,
        }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// True when the prediction collaborator reported a transient failure.
    /// This crate never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VisionError::PredictFailed { retryable: true, .. })
    }
}
