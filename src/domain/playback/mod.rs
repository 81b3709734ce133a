pub mod service;

pub use service::PlaybackService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::language::LanguageKey;
use crate::domain::report::QuestionPersona;
use crate::domain::translation::LocalizedView;

#[derive(Debug, Default, Deserialize)]
pub struct PlaybackQuery {
    #[serde(default)]
    pub include_audio: bool,
    /// Comma separated languages whose audio is wanted; empty means all
    pub langs: Option<String>,
    pub report_id: Option<i64>,
}

/// One report ready for the avatar client
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaybackItem {
    pub id: i64,
    pub title: String,
    pub speaker: String,
    pub meeting_time: DateTime<Utc>,
    pub source_language: LanguageKey,
    pub script_final: String,
    pub highlights_final: Vec<String>,
    pub reflections_final: Vec<String>,
    pub questions_final: Vec<String>,
    pub question_persona: QuestionPersona,
    pub localized: BTreeMap<LanguageKey, LocalizedView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaybackQueueResponse {
    pub items: Vec<PlaybackItem>,
    pub total: usize,
}
