//! Interaction state types

use crate::feedback::FeedbackCollector;
use crate::model::{FormInput, Mode, RequestId, TransformationRequest};
use crate::provider::ProviderError;
use crate::store::EphemeralResultStore;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

// ============================================================================
// Interaction State
// ============================================================================

/// Where the user is in the transformation flow
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Nothing open
    #[default]
    Idle,

    /// Mode picker shown, no mode chosen yet
    PickerOpen,

    /// Form for `mode` is editable
    FormOpen {
        mode: Mode,
        /// Input to pre-fill, kept across a failed dispatch or a regenerate
        draft: Option<FormInput>,
        /// Failure of the last dispatch from this form
        last_error: Option<ProviderError>,
    },

    /// Active request sent to its provider, awaiting completion
    Dispatching,

    /// Result produced and visible to the requesting user
    ResultReady,

    /// Feedback dialog open over a live result
    FeedbackOpen,
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::PickerOpen => "picker_open",
            InteractionState::FormOpen { .. } => "form_open",
            InteractionState::Dispatching => "dispatching",
            InteractionState::ResultReady => "result_ready",
            InteractionState::FeedbackOpen => "feedback_open",
        }
    }

    pub fn is_dispatching(&self) -> bool {
        matches!(self, InteractionState::Dispatching)
    }
}

/// One user's interaction: machine state plus the request and result it owns
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interaction {
    pub state: InteractionState,
    /// The active request. Present from submit until the interaction resets
    /// or a dispatch fails.
    pub request: Option<TransformationRequest>,
    pub results: EphemeralResultStore,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_request_id(&self) -> Option<RequestId> {
        self.request.as_ref().map(|r| r.id)
    }

    /// Whether a provider completion for `request_id` would be applied
    pub fn awaits(&self, request_id: RequestId) -> bool {
        self.state.is_dispatching() && self.active_request_id() == Some(request_id)
    }

    /// Client-facing projection of this interaction at `now`
    pub fn view(&self, now: DateTime<Utc>) -> StateView {
        let mode = self.request.as_ref().map(TransformationRequest::mode);
        match &self.state {
            InteractionState::Idle => StateView::Idle,
            InteractionState::PickerOpen => StateView::PickerOpen { modes: Mode::ALL },
            InteractionState::FormOpen {
                mode,
                draft,
                last_error,
            } => StateView::FormOpen {
                mode: *mode,
                draft: draft.clone(),
                error: last_error.as_ref().map(ErrorView::from),
            },
            InteractionState::Dispatching => StateView::Dispatching {
                request_id: self.active_request_id(),
                mode,
            },
            InteractionState::ResultReady => StateView::ResultReady {
                request_id: self.active_request_id(),
                mode,
                result: self.results.get(now).map(|r| ResultView {
                    output_text: r.output_text.clone(),
                    expires_at: r.expires_at,
                    inserted: self.results.is_inserted(),
                    copied: self.results.is_copied(),
                }),
            },
            InteractionState::FeedbackOpen => StateView::FeedbackOpen {
                request_id: self.active_request_id(),
                mode,
            },
        }
    }
}

// ============================================================================
// Client Views
// ============================================================================

/// Serializable snapshot broadcast on every state change. An expired result
/// is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StateView {
    Idle,
    PickerOpen {
        modes: [Mode; 3],
    },
    FormOpen {
        mode: Mode,
        #[serde(skip_serializing_if = "Option::is_none")]
        draft: Option<FormInput>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ErrorView>,
    },
    Dispatching {
        request_id: Option<RequestId>,
        mode: Option<Mode>,
    },
    ResultReady {
        request_id: Option<RequestId>,
        mode: Option<Mode>,
        /// `None` once the retention window has closed
        result: Option<ResultView>,
    },
    FeedbackOpen {
        request_id: Option<RequestId>,
        mode: Option<Mode>,
    },
}

impl StateView {
    /// Wire name of the state, matching the serialized `state` tag
    pub fn name(&self) -> &'static str {
        match self {
            StateView::Idle => "idle",
            StateView::PickerOpen { .. } => "picker_open",
            StateView::FormOpen { .. } => "form_open",
            StateView::Dispatching { .. } => "dispatching",
            StateView::ResultReady { .. } => "result_ready",
            StateView::FeedbackOpen { .. } => "feedback_open",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub output_text: String,
    pub expires_at: DateTime<Utc>,
    pub inserted: bool,
    pub copied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub kind: &'static str,
    pub message: String,
}

impl From<&ProviderError> for ErrorView {
    fn from(e: &ProviderError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// Immutable configuration for an interaction
#[derive(Debug, Clone)]
pub struct InteractionContext {
    pub session_id: String,
    /// How long a result stays readable after it is produced
    pub retention: Duration,
    pub feedback: FeedbackCollector,
}

impl InteractionContext {
    pub fn new(session_id: impl Into<String>, retention: Duration, feedback: FeedbackCollector) -> Self {
        Self {
            session_id: session_id.into(),
            retention,
            feedback,
        }
    }
}
