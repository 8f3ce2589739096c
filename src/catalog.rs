//! Fixed option sets offered by the assistant's forms
//!
//! The validator and feedback collector check ids against these tables, and
//! the API serves them so clients can render pickers.

use serde::Serialize;

/// A selectable entry with a stable id and a display label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub label: &'static str,
}

impl CatalogEntry {
    const fn new(id: &'static str, label: &'static str) -> Self {
        Self { id, label }
    }
}

/// A tone preset for Style & Tone mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TonePreset {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// Sentinel glossary id meaning "no glossary"
pub const NO_GLOSSARY: &str = "none";

pub const LANGUAGES: &[CatalogEntry] = &[
    CatalogEntry::new("es", "Spanish"),
    CatalogEntry::new("fr", "French"),
    CatalogEntry::new("de", "German"),
    CatalogEntry::new("ja", "Japanese"),
    CatalogEntry::new("ko", "Korean"),
    CatalogEntry::new("zh", "Chinese (Simplified)"),
    CatalogEntry::new("pt", "Portuguese"),
    CatalogEntry::new("it", "Italian"),
    CatalogEntry::new("ru", "Russian"),
    CatalogEntry::new("ar", "Arabic"),
];

pub const GLOSSARIES: &[CatalogEntry] = &[
    CatalogEntry::new(NO_GLOSSARY, "None"),
    CatalogEntry::new("tech", "Technical Terms"),
    CatalogEntry::new("marketing", "Marketing & Brand"),
    CatalogEntry::new("legal", "Legal & Compliance"),
];

pub const TONES: &[TonePreset] = &[
    TonePreset {
        id: "polite-formal",
        label: "Polite & Formal",
        description: "Professional, respectful tone",
    },
    TonePreset {
        id: "concise-direct",
        label: "Concise & Direct",
        description: "Clear, to-the-point messaging",
    },
    TonePreset {
        id: "friendly-neutral",
        label: "Friendly & Neutral",
        description: "Warm yet professional",
    },
    TonePreset {
        id: "enthusiastic",
        label: "Enthusiastic",
        description: "Energetic and positive",
    },
    TonePreset {
        id: "empathetic",
        label: "Empathetic",
        description: "Understanding and supportive",
    },
    TonePreset {
        id: "confident",
        label: "Confident",
        description: "Assertive and assured",
    },
];

/// Feedback chips; the tag id is the label itself
pub const FEEDBACK_TAGS: &[&str] = &[
    "Accurate",
    "Natural phrasing",
    "Matched my intent",
    "Too formal",
    "Too casual",
    "Lost meaning",
    "Grammar issues",
    "Wrong tone",
];

pub fn is_supported_language(code: &str) -> bool {
    LANGUAGES.iter().any(|l| l.id == code)
}

pub fn is_known_glossary(id: &str) -> bool {
    GLOSSARIES.iter().any(|g| g.id == id)
}

pub fn find_tone(id: &str) -> Option<&'static TonePreset> {
    TONES.iter().find(|t| t.id == id)
}

pub fn is_feedback_tag(tag: &str) -> bool {
    FEEDBACK_TAGS.contains(&tag)
}

/// Everything a client needs to render the forms
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub languages: &'static [CatalogEntry],
    pub glossaries: &'static [CatalogEntry],
    pub tones: &'static [TonePreset],
    pub feedback_tags: &'static [&'static str],
}

pub fn catalog() -> Catalog {
    Catalog {
        languages: LANGUAGES,
        glossaries: GLOSSARIES,
        tones: TONES,
        feedback_tags: FEEDBACK_TAGS,
    }
}
