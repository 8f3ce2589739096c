//! Core data model shared by the orchestrator components

use crate::catalog::NO_GLOSSARY;
use crate::validator::ValidatedInput;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a transformation request
pub type RequestId = Uuid;

/// Transformation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Refine,
    Translate,
    StyleTone,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Refine, Mode::Translate, Mode::StyleTone];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Refine => "refine",
            Mode::Translate => "translate",
            Mode::StyleTone => "style_tone",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode keyword is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    /// Accepts wire names plus the short keywords users type after `/sma`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refine" => Ok(Mode::Refine),
            "translate" => Ok(Mode::Translate),
            "style_tone" | "style-tone" | "style" | "tone" => Ok(Mode::StyleTone),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Mode-specific configuration submitted with a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeOptions {
    Refine {
        #[serde(default = "default_true")]
        grammar: bool,
        #[serde(default = "default_true")]
        clarity: bool,
        #[serde(default)]
        conciseness: bool,
    },
    Translate {
        target_language: String,
        #[serde(default)]
        glossary: Option<String>,
    },
    StyleTone {
        tone: String,
    },
}

impl ModeOptions {
    /// The mode these options belong to
    pub fn mode(&self) -> Mode {
        match self {
            ModeOptions::Refine { .. } => Mode::Refine,
            ModeOptions::Translate { .. } => Mode::Translate,
            ModeOptions::StyleTone { .. } => Mode::StyleTone,
        }
    }

    /// Initial form values, matching what the forms preselect
    pub fn defaults_for(mode: Mode) -> Self {
        match mode {
            Mode::Refine => ModeOptions::Refine {
                grammar: true,
                clarity: true,
                conciseness: false,
            },
            Mode::Translate => ModeOptions::Translate {
                target_language: "es".to_string(),
                glossary: Some(NO_GLOSSARY.to_string()),
            },
            Mode::StyleTone => ModeOptions::StyleTone {
                tone: "friendly-neutral".to_string(),
            },
        }
    }
}

/// Raw form contents as submitted by the user, kept so a form can be
/// re-opened with its prior input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub source_text: String,
    pub options: ModeOptions,
}

/// A validated request to transform a draft. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationRequest {
    pub id: RequestId,
    pub input: ValidatedInput,
    /// The form contents as typed, untrimmed
    draft: FormInput,
    pub created_at: DateTime<Utc>,
}

impl TransformationRequest {
    pub fn new(input: ValidatedInput, draft: FormInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            input,
            draft,
            created_at,
        }
    }

    pub fn mode(&self) -> Mode {
        self.input.mode()
    }

    /// The form input that produced this request
    pub fn form_input(&self) -> FormInput {
        self.draft.clone()
    }
}

/// Output of a successful transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationResult {
    pub request_id: RequestId,
    pub output_text: String,
    pub produced_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TransformationResult {
    pub fn new(
        request_id: RequestId,
        output_text: impl Into<String>,
        produced_at: DateTime<Utc>,
        retention: Duration,
    ) -> Self {
        Self {
            request_id,
            output_text: output_text.into(),
            produced_at,
            expires_at: produced_at
                .checked_add_signed(retention)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Feedback as entered by the user, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDraft {
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Validated feedback bound to a request. Carries no message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord {
    pub request_id: RequestId,
    pub rating: u8,
    pub tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
