//! Error types for data access
//!
//! Errors are classified by how the caller should react:
//! - NotConfigured: expected, route to sample data silently
//! - Retryable: network issues, server-side failures
//! - NonRetryable: malformed documents, bad input, missing records

use thiserror::Error;

/// Error types for data source operations
#[derive(Debug, Error)]
pub enum FieldOpsError {
    #[error("Firestore is not initialized. Ensure Firebase config is set.")]
    NotConfigured,

    // Retryable errors
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Firestore error {status}: {message}")]
    Api { status: u16, message: String },

    // Non-retryable errors
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode document: {0}")]
    Decode(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("{0}")]
    Validation(String),

    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl FieldOpsError {
    /// True when no backend was configured at all.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, FieldOpsError::NotConfigured)
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            FieldOpsError::Http(_) => true,
            FieldOpsError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FieldOpsError>;

/// User-visible message attached to a degraded result.
///
/// Serialized alongside view models so the surface can show a banner
/// instead of failing the view.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub message: String,
    pub kind: AdvisoryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    /// Live read failed; sample data shown instead.
    ReadFallback,
    /// Live read failed; previously loaded data kept.
    ReadFailed,
    /// Live write failed; local state may have been reverted.
    WriteFailed,
    /// Record missing from the live store.
    NotFound,
}

impl Advisory {
    pub fn read_fallback(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: AdvisoryKind::ReadFallback,
        }
    }

    pub fn read_failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: AdvisoryKind::ReadFailed,
        }
    }

    pub fn write_failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: AdvisoryKind::WriteFailed,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: AdvisoryKind::NotFound,
        }
    }
}
