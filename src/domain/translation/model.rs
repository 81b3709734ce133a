use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::language::{LanguageKey, RenderMode};
use crate::domain::report::QuestionPersona;

/// Stored per-(report, language) artifact
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub report_id: i64,
    pub language_key: LanguageKey,
    pub title_text: String,
    pub script_text: String,
    pub highlights: Vec<String>,
    pub reflections: Vec<String>,
    pub questions: Vec<String>,
    pub question_persona: QuestionPersona,
    /// Empty when no narration has been synthesized
    pub audio: Vec<u8>,
    pub reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Translation {
    pub fn has_audio(&self) -> bool {
        !self.audio.is_empty()
    }

    /// Text languages never need audio to be playable
    pub fn audio_ready(&self) -> bool {
        !self.language_key.needs_audio() || self.has_audio()
    }

    pub fn into_fields(self) -> TranslationFields {
        TranslationFields {
            title_text: self.title_text,
            script_text: self.script_text,
            highlights: self.highlights,
            reflections: self.reflections,
            questions: self.questions,
            question_persona: self.question_persona,
            audio: self.audio,
            reviewed: self.reviewed,
            reviewed_at: self.reviewed_at,
        }
    }
}

/// Everything written by an upsert; the key and timestamp are supplied by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationFields {
    pub title_text: String,
    pub script_text: String,
    pub highlights: Vec<String>,
    pub reflections: Vec<String>,
    pub questions: Vec<String>,
    pub question_persona: QuestionPersona,
    pub audio: Vec<u8>,
    pub reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Cached narration for one reflection in one language
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionAudio {
    pub report_id: i64,
    pub seq: i32,
    pub language_key: LanguageKey,
    pub text_hash: String,
    pub audio: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status of a language as seen by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    Missing,
    Translating,
    Ready,
    Failed,
}

/// Response for POST .../prepare and PUT .../translations/:lang
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub report_id: i64,
    pub language_key: LanguageKey,
    pub status: TranslationStatus,
    pub reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub title: String,
    pub script_final: String,
    pub highlights_final: Vec<String>,
    pub reflections_final: Vec<String>,
    pub questions_final: Vec<String>,
    pub question_persona: QuestionPersona,
    pub render_mode: RenderMode,
    pub audio_ready: bool,
}

impl From<Translation> for TranslationResponse {
    fn from(t: Translation) -> Self {
        Self {
            report_id: t.report_id,
            language_key: t.language_key,
            status: TranslationStatus::Ready,
            reviewed: t.reviewed,
            reviewed_at: t.reviewed_at,
            render_mode: t.language_key.render_mode(),
            audio_ready: t.audio_ready(),
            title: t.title_text,
            script_final: t.script_text,
            highlights_final: t.highlights,
            reflections_final: t.reflections,
            questions_final: t.questions,
            question_persona: t.question_persona,
        }
    }
}

/// One language in GET /translations
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationListItem {
    pub language_key: LanguageKey,
    pub status: TranslationStatus,
    pub error: String,
    pub reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub title: String,
    pub script_final: String,
    pub highlights_final: Vec<String>,
    pub reflections_final: Vec<String>,
    pub questions_final: Vec<String>,
    pub question_persona: QuestionPersona,
    pub render_mode: RenderMode,
    pub audio_ready: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationListResponse {
    pub report_id: i64,
    pub source_language: LanguageKey,
    pub items: Vec<TranslationListItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationJobItem {
    pub language_key: LanguageKey,
    pub status: TranslationStatus,
    pub error: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationJobsResponse {
    pub report_id: i64,
    pub items: Vec<TranslationJobItem>,
}

/// Response for the retranslate endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct RetranslateResponse {
    pub task_id: String,
    pub report_id: i64,
    pub languages: Vec<LanguageKey>,
    pub status: String,
}

/// Manual edit of a translation; absent fields are left untouched
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTranslationRequest {
    pub title: Option<String>,
    pub script_final: Option<String>,
    pub highlights_final: Option<Vec<String>>,
    pub reflections_final: Option<Vec<String>>,
    pub questions_final: Option<Vec<String>>,
    pub question_persona: Option<String>,
    pub reviewed: Option<bool>,
}

/// Per-language view served to playback clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedView {
    pub title: String,
    pub script_final: String,
    pub highlights_final: Vec<String>,
    pub reflections_final: Vec<String>,
    pub questions_final: Vec<String>,
    pub question_persona: QuestionPersona,
    pub render_mode: RenderMode,
    pub audio_ready: bool,
    /// Base64 audio, empty unless requested
    pub audio_base64: String,
}

/// One reflection in GET /reflections
#[derive(Debug, Serialize, Deserialize)]
pub struct ReflectionItem {
    pub seq: i32,
    pub text: String,
    /// Base64 audio, present only when synthesized from the current text
    pub audio_base64: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReflectionsResponse {
    pub report_id: i64,
    pub language_key: LanguageKey,
    pub reflections: Vec<ReflectionItem>,
}

/// Counts from one reflection-audio pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReflectionAudioOutcome {
    pub synthesized: usize,
    pub cached: usize,
    pub failed: usize,
}

/// Result of refreshing one language
#[derive(Debug)]
pub struct LanguageOutcome {
    pub language: LanguageKey,
    pub result: Result<(), String>,
}

/// Per-language results of a refresh-all pass
#[derive(Debug)]
pub struct RefreshOutcome {
    pub report_id: i64,
    pub source_language: LanguageKey,
    /// Storing the source-language copy
    pub source: Result<(), String>,
    /// One entry per target language
    pub languages: Vec<LanguageOutcome>,
}

impl RefreshOutcome {
    pub fn failed_languages(&self) -> Vec<LanguageKey> {
        self.languages
            .iter()
            .filter(|l| l.result.is_err())
            .map(|l| l.language)
            .collect()
    }
}

/// A manually edited translation row
#[derive(Debug)]
pub struct EditedTranslation {
    pub translation: Translation,
    pub reflections_changed: bool,
}
