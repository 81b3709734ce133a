use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Languages a report can be published in.
///
/// The declaration order is the order languages are listed and processed in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
pub enum LanguageKey {
    Zh,
    En,
    Yue,
    Ja,
    Id,
    Ms,
    Hi,
    Th,
}

/// How a language is presented to the audience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Shown as on-screen text, no narration needed
    Text,
    /// Narrated, synthesized audio required
    Audio,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl LanguageKey {
    pub const ALL: [LanguageKey; 8] = [
        LanguageKey::Zh,
        LanguageKey::En,
        LanguageKey::Yue,
        LanguageKey::Ja,
        LanguageKey::Id,
        LanguageKey::Ms,
        LanguageKey::Hi,
        LanguageKey::Th,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageKey::Zh => "zh",
            LanguageKey::En => "en",
            LanguageKey::Yue => "yue",
            LanguageKey::Ja => "ja",
            LanguageKey::Id => "id",
            LanguageKey::Ms => "ms",
            LanguageKey::Hi => "hi",
            LanguageKey::Th => "th",
        }
    }

    /// Label handed to the translation model as the target language
    pub fn label(&self) -> &'static str {
        match self {
            LanguageKey::Zh => "Chinese",
            LanguageKey::En => "English",
            LanguageKey::Yue => {
                "Cantonese (Yue Chinese, spoken style in Traditional Chinese characters)"
            }
            LanguageKey::Ja => "Japanese",
            LanguageKey::Id => "Indonesian",
            LanguageKey::Ms => "Malay (Malaysia)",
            LanguageKey::Hi => "Hindi",
            LanguageKey::Th => "Thai",
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        match self {
            LanguageKey::Zh | LanguageKey::En => RenderMode::Text,
            _ => RenderMode::Audio,
        }
    }

    pub fn needs_audio(&self) -> bool {
        self.render_mode() == RenderMode::Audio
    }

    /// Every language rendered as narration
    pub fn audio_languages() -> Vec<LanguageKey> {
        Self::ALL
            .iter()
            .copied()
            .filter(LanguageKey::needs_audio)
            .collect()
    }
}

impl FromStr for LanguageKey {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == key)
            .ok_or(UnknownLanguage(s.to_string()))
    }
}

impl std::fmt::Display for LanguageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Text => "text",
            RenderMode::Audio => "audio",
        }
    }
}

/// Accept a declared source language only if the catalog knows it
pub fn normalize_source_language(raw: Option<&str>) -> Option<LanguageKey> {
    raw.and_then(|value| value.parse().ok())
}

/// Parse a comma separated language list, ignoring unknown keys
pub fn parse_language_list(raw: &str) -> Vec<LanguageKey> {
    let mut languages = Vec::new();
    for part in raw.split(',') {
        if let Ok(lang) = part.parse::<LanguageKey>() {
            if !languages.contains(&lang) {
                languages.push(lang);
            }
        }
    }
    languages
}
