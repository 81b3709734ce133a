use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::persona::QuestionPersona;
use crate::domain::generation::SourceContent;
use crate::domain::language::{detect_source_language, LanguageKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
pub enum ReportStatus {
    Draft,
    Published,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Draft => write!(f, "draft"),
            ReportStatus::Published => write!(f, "published"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: i64,
    pub title: String,
    pub summary_raw: String,
    pub source_language: Option<LanguageKey>,
    pub speaker: String,
    pub meeting_time: DateTime<Utc>,
    pub script_draft: String,
    pub script_final: String,
    pub highlights_draft: Vec<String>,
    pub highlights_final: Vec<String>,
    pub reflections: Vec<String>,
    pub questions: Vec<String>,
    pub question_persona: QuestionPersona,
    pub status: ReportStatus,
    pub auto_play_enabled: bool,
    pub source_type: Option<String>,
    pub source_meeting_id: Option<String>,
    pub source_meeting_no: Option<String>,
    pub source_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a report before it has been stored
#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub summary_raw: String,
    pub source_language: Option<LanguageKey>,
    pub speaker: String,
    pub meeting_time: DateTime<Utc>,
    pub script_final: String,
    pub highlights_final: Vec<String>,
    pub reflections: Vec<String>,
    pub questions: Vec<String>,
    pub question_persona: QuestionPersona,
    pub auto_play_enabled: bool,
    pub source_type: Option<String>,
    pub source_meeting_id: Option<String>,
    pub source_meeting_no: Option<String>,
    pub source_url: Option<String>,
}

impl NewReport {
    pub fn new(title: &str, summary_raw: &str, meeting_time: DateTime<Utc>) -> Self {
        Self {
            title: title.trim().to_string(),
            summary_raw: summary_raw.to_string(),
            source_language: None,
            speaker: String::new(),
            meeting_time,
            script_final: String::new(),
            highlights_final: Vec::new(),
            reflections: Vec::new(),
            questions: Vec::new(),
            question_persona: QuestionPersona::default(),
            auto_play_enabled: false,
            source_type: None,
            source_meeting_id: None,
            source_meeting_no: None,
            source_url: None,
        }
    }

    /// Materialize the stored shape, used by stores that assign ids themselves
    pub fn into_report(self, id: i64, now: DateTime<Utc>) -> Report {
        Report {
            id,
            title: self.title,
            summary_raw: self.summary_raw,
            source_language: self.source_language,
            speaker: self.speaker,
            meeting_time: self.meeting_time,
            script_draft: String::new(),
            script_final: self.script_final,
            highlights_draft: Vec::new(),
            highlights_final: self.highlights_final,
            reflections: self.reflections,
            questions: self.questions,
            question_persona: self.question_persona,
            status: ReportStatus::Draft,
            auto_play_enabled: self.auto_play_enabled,
            source_type: self.source_type,
            source_meeting_id: self.source_meeting_id,
            source_meeting_no: self.source_meeting_no,
            source_url: self.source_url,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Report {
    /// Declared source language, or the detected one when none was stored
    pub fn resolved_source_language(&self) -> LanguageKey {
        self.source_language.unwrap_or_else(|| {
            detect_source_language(&self.title, &self.summary_raw, &self.script_final)
        })
    }

    /// Final script, falling back to the draft
    pub fn current_script(&self) -> &str {
        let final_script = self.script_final.trim();
        if final_script.is_empty() {
            self.script_draft.trim()
        } else {
            final_script
        }
    }

    pub fn has_script(&self) -> bool {
        !self.script_final.trim().is_empty()
    }

    pub fn source_content(&self) -> SourceContent {
        SourceContent {
            title: self.title.clone(),
            speaker: self.speaker.clone(),
            summary: self.summary_raw.clone(),
            script: self.current_script().to_string(),
        }
    }
}
