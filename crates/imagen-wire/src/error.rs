//! Wire conversion error types.

use thiserror::Error;

/// Result type for wire conversions.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while coercing schemas or marshalling values.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Unknown schema type: {0}")]
    UnknownType(String),

    #[error("Unable to coerce value of type {type_name}: {repr}")]
    UnsupportedType { type_name: String, repr: String },

    #[error("Number cannot be represented on the wire: {0}")]
    NonFiniteNumber(f64),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WireError {
    pub fn unknown_type(alias: impl Into<String>) -> Self {
        Self::UnknownType(alias.into())
    }

    pub fn unsupported_type(type_name: impl Into<String>, repr: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
            repr: repr.into(),
        }
    }

    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }
}
