//! API request and response types

use crate::model::{Mode, ModeOptions};
use serde::{Deserialize, Serialize};

/// Slash command typed into the composer
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectModeRequest {
    pub mode: Mode,
}

/// Form submission. Options default to the form's preselected values.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub mode: Mode,
    pub source_text: String,
    #[serde(default)]
    pub options: Option<ModeOptions>,
}

impl SubmitRequest {
    pub fn options_or_default(&self) -> ModeOptions {
        self.options
            .clone()
            .unwrap_or_else(|| ModeOptions::defaults_for(self.mode))
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl ErrorResponse {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            kind: kind.into(),
        }
    }
}
