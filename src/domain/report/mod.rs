pub mod error;
pub mod model;
pub mod normalize;
pub mod persona;
pub mod service;

pub use error::ReportServiceError;
pub use model::{NewReport, Report, ReportStatus};
pub use persona::QuestionPersona;
pub use service::{ReportService, ReportServiceApi};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::language::LanguageKey;

/// Report as returned by the report endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: i64,
    pub title: String,
    pub summary_raw: String,
    pub source_language: LanguageKey,
    pub speaker: String,
    pub meeting_time: DateTime<Utc>,
    pub script_draft: String,
    pub script_final: String,
    pub highlights_draft: Vec<String>,
    pub highlights_final: Vec<String>,
    pub reflections_final: Vec<String>,
    pub questions_final: Vec<String>,
    pub question_persona: QuestionPersona,
    pub status: ReportStatus,
    pub auto_play_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_meeting_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_meeting_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            source_language: report.resolved_source_language(),
            id: report.id,
            title: report.title,
            summary_raw: report.summary_raw,
            speaker: report.speaker,
            meeting_time: report.meeting_time,
            script_draft: report.script_draft,
            script_final: report.script_final,
            highlights_draft: report.highlights_draft,
            highlights_final: report.highlights_final,
            reflections_final: report.reflections,
            questions_final: report.questions,
            question_persona: report.question_persona,
            status: report.status,
            auto_play_enabled: report.auto_play_enabled,
            source_type: report.source_type,
            source_meeting_id: report.source_meeting_id,
            source_meeting_no: report.source_meeting_no,
            source_url: report.source_url,
            published_at: report.published_at,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<ReportStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportListResponse {
    pub items: Vec<ReportResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Request to create a report by hand
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateReportRequest {
    pub title: String,
    pub summary_raw: String,
    #[serde(default)]
    pub speaker: String,
    pub meeting_time: Option<DateTime<Utc>>,
    pub source_language: Option<String>,
    #[serde(default)]
    pub script_final: String,
    #[serde(default)]
    pub highlights_final: Vec<String>,
    #[serde(default)]
    pub reflections_final: Vec<String>,
    #[serde(default)]
    pub questions_final: Vec<String>,
    pub question_persona: Option<String>,
    #[serde(default)]
    pub auto_play_enabled: bool,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateReportRequest {
    pub title: Option<String>,
    pub summary_raw: Option<String>,
    pub speaker: Option<String>,
    pub meeting_time: Option<DateTime<Utc>>,
    pub source_language: Option<String>,
    pub script_final: Option<String>,
    pub highlights_final: Option<Vec<String>>,
    pub reflections_final: Option<Vec<String>>,
    pub questions_final: Option<Vec<String>>,
    pub question_persona: Option<String>,
    pub auto_play_enabled: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub report_id: i64,
    pub script_draft: String,
    pub highlights_draft: Vec<String>,
    pub reflections_draft: Vec<String>,
    pub questions_draft: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishResponse {
    pub report_id: i64,
    pub status: ReportStatus,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub deleted_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuestionsQuery {
    pub lang: Option<String>,
    pub persona: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionItem {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub report_id: i64,
    pub persona: QuestionPersona,
    pub questions: Vec<QuestionItem>,
}

impl QuestionsResponse {
    pub fn new(report_id: i64, persona: QuestionPersona, questions: Vec<String>) -> Self {
        Self {
            report_id,
            persona,
            questions: questions
                .into_iter()
                .map(|text| QuestionItem { text })
                .collect(),
        }
    }
}
