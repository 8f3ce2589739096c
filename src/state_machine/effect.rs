//! Effects produced by state transitions

use crate::model::{FeedbackRecord, RequestId, TransformationRequest};

/// Effects to be executed by the runtime after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the request to its provider (spawns as background task)
    Dispatch { request: TransformationRequest },

    /// Post the accepted result into the conversation
    InsertIntoConversation { request_id: RequestId, text: String },

    /// Place the result on the user's clipboard
    CopyToClipboard { request_id: RequestId, text: String },

    /// Hand a feedback record to telemetry
    EmitTelemetry { record: FeedbackRecord },

    /// Broadcast the new state view to connected clients
    NotifyState,

    /// Tell the user the result is past its retention window
    NotifyResultExpired,
}

impl Effect {
    pub fn dispatch(request: TransformationRequest) -> Self {
        Effect::Dispatch { request }
    }

    pub fn insert(request_id: RequestId, text: impl Into<String>) -> Self {
        Effect::InsertIntoConversation {
            request_id,
            text: text.into(),
        }
    }

    pub fn copy(request_id: RequestId, text: impl Into<String>) -> Self {
        Effect::CopyToClipboard {
            request_id,
            text: text.into(),
        }
    }

    pub fn emit_telemetry(record: FeedbackRecord) -> Self {
        Effect::EmitTelemetry { record }
    }
}
