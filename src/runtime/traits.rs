//! Trait abstractions for runtime I/O
//!
//! The chat platform and telemetry are external collaborators. These traits
//! let the executor run against mocks in tests and logging sinks in the
//! binary.

use crate::model::FeedbackRecord;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("Chat platform unavailable: {0}")]
    Unavailable(String),
    #[error("Chat platform refused the action: {0}")]
    Refused(String),
}

impl PlatformError {
    pub fn kind(&self) -> &'static str {
        match self {
            PlatformError::Unavailable(_) => "platform_unavailable",
            PlatformError::Refused(_) => "platform_refused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    #[error("Telemetry sink unavailable: {0}")]
    Unavailable(String),
}

impl TelemetryError {
    pub fn kind(&self) -> &'static str {
        match self {
            TelemetryError::Unavailable(_) => "telemetry_unavailable",
        }
    }
}

/// Outbound actions on the host chat platform
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post accepted text into the session's conversation
    async fn insert_into_conversation(&self, session_id: &str, text: &str)
        -> Result<(), PlatformError>;

    /// Place text on the user's clipboard
    async fn copy_to_clipboard(&self, session_id: &str, text: &str) -> Result<(), PlatformError>;
}

/// Destination for feedback records
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn emit(&self, record: &FeedbackRecord) -> Result<(), TelemetryError>;
}

// ============================================================================
// Logging implementations
// ============================================================================

/// Platform stand-in that records each action as a structured log line.
/// Only lengths are logged, never text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPlatform;

#[async_trait]
impl ChatPlatform for LoggingPlatform {
    async fn insert_into_conversation(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<(), PlatformError> {
        tracing::info!(
            session_id = %session_id,
            chars = text.chars().count(),
            "Inserted result into conversation"
        );
        Ok(())
    }

    async fn copy_to_clipboard(&self, session_id: &str, text: &str) -> Result<(), PlatformError> {
        tracing::info!(
            session_id = %session_id,
            chars = text.chars().count(),
            "Copied result to clipboard"
        );
        Ok(())
    }
}

/// Telemetry sink that writes each record to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTelemetry;

#[async_trait]
impl TelemetrySink for LoggingTelemetry {
    async fn emit(&self, record: &FeedbackRecord) -> Result<(), TelemetryError> {
        let payload = serde_json::to_string(record)
            .map_err(|e| TelemetryError::Unavailable(format!("Failed to encode record: {e}")))?;
        tracing::info!(
            request_id = %record.request_id,
            rating = record.rating,
            record = %payload,
            "Feedback recorded"
        );
        Ok(())
    }
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ChatPlatform + ?Sized> ChatPlatform for Arc<T> {
    async fn insert_into_conversation(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<(), PlatformError> {
        (**self).insert_into_conversation(session_id, text).await
    }

    async fn copy_to_clipboard(&self, session_id: &str, text: &str) -> Result<(), PlatformError> {
        (**self).copy_to_clipboard(session_id, text).await
    }
}

#[async_trait]
impl<T: TelemetrySink + ?Sized> TelemetrySink for Arc<T> {
    async fn emit(&self, record: &FeedbackRecord) -> Result<(), TelemetryError> {
        (**self).emit(record).await
    }
}
