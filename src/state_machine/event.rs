//! Events that can occur in an interaction

use crate::model::{FeedbackDraft, Mode, ModeOptions, RequestId};
use crate::provider::ProviderError;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Picker and form
    OpenPicker,
    SelectMode {
        mode: Mode,
    },
    Back,
    SubmitForm {
        mode: Mode,
        source_text: String,
        options: ModeOptions,
    },
    Cancel,

    // Provider
    ProviderCompleted {
        request_id: RequestId,
        outcome: Result<String, ProviderError>,
    },

    // Result actions
    CopyResult,
    InsertResult,
    Regenerate,

    // Feedback
    OpenFeedback,
    DismissFeedback,
    SubmitFeedback {
        draft: FeedbackDraft,
    },
    SkipFeedback,
}

impl Event {
    /// Short name for logs; never includes user text
    pub fn name(&self) -> &'static str {
        match self {
            Event::OpenPicker => "open_picker",
            Event::SelectMode { .. } => "select_mode",
            Event::Back => "back",
            Event::SubmitForm { .. } => "submit_form",
            Event::Cancel => "cancel",
            Event::ProviderCompleted { .. } => "provider_completed",
            Event::CopyResult => "copy_result",
            Event::InsertResult => "insert_result",
            Event::Regenerate => "regenerate",
            Event::OpenFeedback => "open_feedback",
            Event::DismissFeedback => "dismiss_feedback",
            Event::SubmitFeedback { .. } => "submit_feedback",
            Event::SkipFeedback => "skip_feedback",
        }
    }
}
