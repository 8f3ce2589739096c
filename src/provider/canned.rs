//! Built-in providers that need no external service
//!
//! Translate and Style & Tone answer from fixed sample tables; Refine applies
//! a few deterministic text rules. They back the server when no remote
//! endpoint is configured and keep demos and tests offline.

use super::{ProviderError, TransformProvider};
use crate::model::ModeOptions;
use crate::validator::ValidatedInput;
use async_trait::async_trait;

const TRANSLATIONS: &[(&str, &str)] = &[
    (
        "es",
        "¡Hola equipo! Necesito enviar una actualización a nuestro cliente sobre el cronograma del proyecto.",
    ),
    (
        "fr",
        "Salut l'équipe ! Je dois envoyer une mise à jour à notre client concernant le calendrier du projet.",
    ),
    (
        "de",
        "Hallo Team! Ich muss unserem Kunden ein Update zum Projektzeitplan schicken.",
    ),
    (
        "ja",
        "チームの皆さん、こんにちは！プロジェクトのタイムラインについて、クライアントに更新情報を送る必要があります。",
    ),
];

const TRANSLATION_FALLBACK: &str = "Translation output would appear here.";

const TONE_SAMPLES: &[(&str, &str)] = &[
    (
        "polite-formal",
        "Good morning team. I would like to provide our client with an update regarding the project timeline at your earliest convenience.",
    ),
    (
        "concise-direct",
        "Team: Need to update client on project timeline.",
    ),
    (
        "friendly-neutral",
        "Hey team! I need to send our client an update about where we are with the project timeline.",
    ),
    (
        "enthusiastic",
        "Hey team! I'm excited to share a progress update with our client about the project timeline!",
    ),
    (
        "empathetic",
        "Hi team, I understand everyone's been working hard. I'd like to share a thoughtful update with our client about the project timeline.",
    ),
    (
        "confident",
        "Team, I'll be updating our client on the project timeline. We're making solid progress.",
    ),
];

const TONE_FALLBACK: &str = "Styled output would appear here.";

const FILLER_WORDS: &[&str] = &["just", "really", "very", "basically", "actually", "literally"];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn wrong_options(provider: &str) -> ProviderError {
    ProviderError::rejected(format!("{provider} received options for another mode"))
}

/// Rule-based refinement
pub struct CannedRefine;

impl CannedRefine {
    fn refine(text: &str, grammar: bool, clarity: bool, conciseness: bool) -> String {
        let mut words: Vec<&str> = text.split_whitespace().collect();

        if conciseness {
            words.retain(|w| {
                let bare = w.trim_matches(|c: char| !c.is_alphanumeric());
                !FILLER_WORDS.iter().any(|f| f.eq_ignore_ascii_case(bare))
            });
        }

        let mut out = if clarity || conciseness {
            words.join(" ")
        } else {
            text.to_string()
        };

        if grammar {
            out = capitalize_sentences(&out);
            if !out.ends_with(['.', '!', '?']) {
                out.push('.');
            }
        }
        out
    }
}

fn capitalize_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_start = true;
    for c in text.chars() {
        if at_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            at_start = false;
        } else {
            if matches!(c, '.' | '!' | '?') {
                at_start = true;
            } else if !c.is_whitespace() {
                at_start = false;
            }
            out.push(c);
        }
    }
    out
}

#[async_trait]
impl TransformProvider for CannedRefine {
    async fn transform(&self, input: &ValidatedInput) -> Result<String, ProviderError> {
        match input.options() {
            ModeOptions::Refine {
                grammar,
                clarity,
                conciseness,
            } => Ok(Self::refine(
                input.source_text(),
                *grammar,
                *clarity,
                *conciseness,
            )),
            _ => Err(wrong_options(self.name())),
        }
    }

    fn name(&self) -> &str {
        "canned-refine"
    }
}

/// Sample translations keyed by target language
pub struct CannedTranslate;

#[async_trait]
impl TransformProvider for CannedTranslate {
    async fn transform(&self, input: &ValidatedInput) -> Result<String, ProviderError> {
        match input.options() {
            ModeOptions::Translate {
                target_language, ..
            } => Ok(lookup(TRANSLATIONS, target_language)
                .unwrap_or(TRANSLATION_FALLBACK)
                .to_string()),
            _ => Err(wrong_options(self.name())),
        }
    }

    fn name(&self) -> &str {
        "canned-translate"
    }
}

/// Sample rewrites keyed by tone preset
pub struct CannedStyleTone;

#[async_trait]
impl TransformProvider for CannedStyleTone {
    async fn transform(&self, input: &ValidatedInput) -> Result<String, ProviderError> {
        match input.options() {
            ModeOptions::StyleTone { tone } => Ok(lookup(TONE_SAMPLES, tone)
                .unwrap_or(TONE_FALLBACK)
                .to_string()),
            _ => Err(wrong_options(self.name())),
        }
    }

    fn name(&self) -> &str {
        "canned-style-tone"
    }
}
