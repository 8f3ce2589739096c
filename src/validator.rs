//! Draft validation
//!
//! Enforces per-mode input rules before anything is dispatched. Validation is
//! pure: no I/O, no provider lookups, same answer for the same input.

use crate::catalog;
use crate::model::{Mode, ModeOptions};
use thiserror::Error;

/// Reasons a draft cannot be dispatched. All are user-correctable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message is empty")]
    EmptyInput,
    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),
    #[error("Unknown glossary: {0}")]
    UnsupportedGlossary(String),
    #[error("Unsupported tone preset: {0}")]
    UnsupportedTone(String),
    #[error("Select at least one refinement option")]
    NoOptionsSelected,
    #[error("Options for {options} submitted to the {mode} form")]
    ModeMismatch { mode: Mode, options: Mode },
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::EmptyInput => "empty_input",
            ValidationError::UnsupportedLanguage(_) => "unsupported_language",
            ValidationError::UnsupportedGlossary(_) => "unsupported_glossary",
            ValidationError::UnsupportedTone(_) => "unsupported_tone",
            ValidationError::NoOptionsSelected => "no_options_selected",
            ValidationError::ModeMismatch { .. } => "mode_mismatch",
        }
    }
}

/// Input that passed validation. Only [`validate`] can build one, so holding
/// a `ValidatedInput` is proof the rules were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    mode: Mode,
    source_text: String,
    options: ModeOptions,
}

impl ValidatedInput {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The draft with surrounding whitespace removed
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn options(&self) -> &ModeOptions {
        &self.options
    }
}

/// Validate a form submission for `mode`
pub fn validate(
    mode: Mode,
    source_text: &str,
    options: ModeOptions,
) -> Result<ValidatedInput, ValidationError> {
    let trimmed = source_text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    if options.mode() != mode {
        return Err(ValidationError::ModeMismatch {
            mode,
            options: options.mode(),
        });
    }

    match &options {
        ModeOptions::Refine {
            grammar,
            clarity,
            conciseness,
        } => {
            if !(*grammar || *clarity || *conciseness) {
                return Err(ValidationError::NoOptionsSelected);
            }
        }
        ModeOptions::Translate {
            target_language,
            glossary,
        } => {
            if !catalog::is_supported_language(target_language) {
                return Err(ValidationError::UnsupportedLanguage(target_language.clone()));
            }
            if let Some(glossary) = glossary {
                if !catalog::is_known_glossary(glossary) {
                    return Err(ValidationError::UnsupportedGlossary(glossary.clone()));
                }
            }
        }
        ModeOptions::StyleTone { tone } => {
            if catalog::find_tone(tone).is_none() {
                return Err(ValidationError::UnsupportedTone(tone.clone()));
            }
        }
    }

    Ok(ValidatedInput {
        mode,
        source_text: trimmed.to_string(),
        options,
    })
}
