//! Provider error types

use thiserror::Error;

/// Why a dispatch did not produce output. Every variant is recoverable: the
/// user may retry with the same or an edited request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("The transformation timed out")]
    Timeout,
    #[error("Transformation service unavailable: {0}")]
    Unavailable(String),
    #[error("The request was declined: {0}")]
    Rejected(String),
    #[error("A transformation is already in progress")]
    AlreadyInFlight,
}

impl ProviderError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Timeout => "timeout",
            ProviderError::Unavailable(_) => "unavailable",
            ProviderError::Rejected(_) => "rejected",
            ProviderError::AlreadyInFlight => "already_in_flight",
        }
    }
}
