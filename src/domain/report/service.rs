use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::error::ReportServiceError;
use super::normalize::{
    non_blank_count, normalize_highlights, normalize_questions, normalize_reflections,
    MAX_HIGHLIGHTS, MAX_QUESTIONS, MAX_REFLECTIONS,
};
use super::{
    CreateReportRequest, DeleteResponse, GenerateResponse, NewReport, PublishResponse,
    QuestionPersona, QuestionsResponse, Report, ReportListQuery, ReportListResponse,
    ReportResponse, ReportStatus, UpdateReportRequest,
};
use crate::domain::generation::GenerationServiceApi;
use crate::domain::language::{detect_source_language, normalize_source_language, LanguageKey};
use crate::domain::translation::TranslationScheduler;
use crate::infrastructure::repositories::{
    ReportListFilter, ReportRepository, TranslationRepository,
};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

pub struct ReportService {
    report_repo: Arc<dyn ReportRepository>,
    translation_repo: Arc<dyn TranslationRepository>,
    generation: Arc<dyn GenerationServiceApi>,
    scheduler: Arc<TranslationScheduler>,
}

impl ReportService {
    pub fn new(
        report_repo: Arc<dyn ReportRepository>,
        translation_repo: Arc<dyn TranslationRepository>,
        generation: Arc<dyn GenerationServiceApi>,
        scheduler: Arc<TranslationScheduler>,
    ) -> Self {
        Self {
            report_repo,
            translation_repo,
            generation,
            scheduler,
        }
    }
}

#[async_trait]
pub trait ReportServiceApi: Send + Sync {
    async fn list_reports(
        &self,
        query: ReportListQuery,
    ) -> Result<ReportListResponse, ReportServiceError>;

    async fn get_report(&self, report_id: i64) -> Result<ReportResponse, ReportServiceError>;

    async fn latest_published(&self) -> Result<ReportResponse, ReportServiceError>;

    async fn create_report(
        &self,
        request: CreateReportRequest,
    ) -> Result<ReportResponse, ReportServiceError>;

    /// Partial update. Content changes schedule a translation refresh and,
    /// when reflections changed, new reflection audio.
    async fn update_report(
        &self,
        report_id: i64,
        request: UpdateReportRequest,
    ) -> Result<ReportResponse, ReportServiceError>;

    async fn delete_report(&self, report_id: i64) -> Result<DeleteResponse, ReportServiceError>;

    /// Generate script, highlights, reflections and questions from the summary
    async fn generate(&self, report_id: i64) -> Result<GenerateResponse, ReportServiceError>;

    async fn publish(&self, report_id: i64) -> Result<PublishResponse, ReportServiceError>;

    async fn questions(
        &self,
        report_id: i64,
        language: Option<LanguageKey>,
        persona: Option<String>,
    ) -> Result<QuestionsResponse, ReportServiceError>;
}

impl ReportService {
    async fn find_report(&self, report_id: i64) -> Result<Report, ReportServiceError> {
        self.report_repo
            .find_by_id(report_id)
            .await?
            .ok_or(ReportServiceError::NotFound(report_id))
    }

    fn check_limit(field: &str, items: &[String], cap: usize) -> Result<(), ReportServiceError> {
        if non_blank_count(items) > cap {
            return Err(ReportServiceError::Invalid(format!(
                "{} accepts at most {} entries",
                field, cap
            )));
        }
        Ok(())
    }

    fn parse_source_language(raw: &str) -> Result<LanguageKey, ReportServiceError> {
        if raw.trim().is_empty() {
            return Err(ReportServiceError::Invalid(
                "source_language must not be blank".to_string(),
            ));
        }
        Ok(raw.parse()?)
    }

    /// Clear review marks so edited content is checked again
    async fn reset_reviews(&self, report_id: i64) -> Result<(), ReportServiceError> {
        for row in self.translation_repo.list_by_report(report_id).await? {
            if row.reviewed {
                self.translation_repo
                    .reset_review_flag(report_id, row.language_key)
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ReportServiceApi for ReportService {
    async fn list_reports(
        &self,
        query: ReportListQuery,
    ) -> Result<ReportListResponse, ReportServiceError> {
        let filter = ReportListFilter {
            status: query.status,
            page: query.page.unwrap_or(1).max(1),
            page_size: query
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        };
        let (reports, total) = self.report_repo.list(&filter).await?;

        Ok(ReportListResponse {
            items: reports.into_iter().map(ReportResponse::from).collect(),
            total,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    async fn get_report(&self, report_id: i64) -> Result<ReportResponse, ReportServiceError> {
        Ok(self.find_report(report_id).await?.into())
    }

    async fn latest_published(&self) -> Result<ReportResponse, ReportServiceError> {
        self.report_repo
            .find_latest_published()
            .await?
            .map(ReportResponse::from)
            .ok_or(ReportServiceError::NoPublishedReport)
    }

    async fn create_report(
        &self,
        request: CreateReportRequest,
    ) -> Result<ReportResponse, ReportServiceError> {
        if request.title.trim().is_empty() {
            return Err(ReportServiceError::Invalid("title is required".to_string()));
        }
        if request.summary_raw.trim().is_empty() {
            return Err(ReportServiceError::Invalid(
                "summary_raw is required".to_string(),
            ));
        }

        let mut new = NewReport::new(
            &request.title,
            &request.summary_raw,
            request.meeting_time.unwrap_or_else(Utc::now),
        );
        new.speaker = request.speaker.trim().to_string();
        new.script_final = request.script_final.trim().to_string();
        new.source_language = normalize_source_language(request.source_language.as_deref())
            .or_else(|| {
                Some(detect_source_language(
                    &new.title,
                    &new.summary_raw,
                    &new.script_final,
                ))
            });
        new.highlights_final = normalize_highlights(&request.highlights_final);
        new.reflections = normalize_reflections(&request.reflections_final);
        new.questions = normalize_questions(&request.questions_final);
        new.question_persona = QuestionPersona::normalize(request.question_persona.as_deref());
        new.auto_play_enabled = request.auto_play_enabled;

        let report = self.report_repo.insert(new).await?;
        tracing::info!(
            report_id = report.id,
            source_language = ?report.source_language,
            "Report created"
        );

        if report.has_script() {
            self.scheduler.schedule_refresh(&report);
        } else if !report.reflections.is_empty() {
            self.scheduler.schedule_reflection_audio(report.id, None);
        }

        Ok(report.into())
    }

    async fn update_report(
        &self,
        report_id: i64,
        request: UpdateReportRequest,
    ) -> Result<ReportResponse, ReportServiceError> {
        let mut report = self.find_report(report_id).await?;
        let before = report.clone();

        if let Some(items) = &request.highlights_final {
            Self::check_limit("highlights_final", items, MAX_HIGHLIGHTS)?;
        }
        if let Some(items) = &request.reflections_final {
            Self::check_limit("reflections_final", items, MAX_REFLECTIONS)?;
        }
        if let Some(items) = &request.questions_final {
            Self::check_limit("questions_final", items, MAX_QUESTIONS)?;
        }

        if let Some(title) = &request.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ReportServiceError::Invalid("title must not be empty".to_string()));
            }
            report.title = title.to_string();
        }
        if let Some(summary) = request.summary_raw {
            if summary.trim().is_empty() {
                return Err(ReportServiceError::Invalid(
                    "summary_raw must not be empty".to_string(),
                ));
            }
            report.summary_raw = summary;
        }
        if let Some(raw) = &request.source_language {
            report.source_language = Some(Self::parse_source_language(raw)?);
        }
        if let Some(speaker) = &request.speaker {
            report.speaker = speaker.trim().to_string();
        }
        if let Some(meeting_time) = request.meeting_time {
            report.meeting_time = meeting_time;
        }
        if let Some(script) = &request.script_final {
            report.script_final = script.trim().to_string();
        }
        if let Some(items) = &request.highlights_final {
            report.highlights_final = normalize_highlights(items);
        }
        if let Some(items) = &request.reflections_final {
            report.reflections = normalize_reflections(items);
        }
        if let Some(items) = &request.questions_final {
            report.questions = normalize_questions(items);
        }
        if request.question_persona.is_some() {
            report.question_persona = QuestionPersona::normalize(request.question_persona.as_deref());
        }
        if let Some(auto_play) = request.auto_play_enabled {
            report.auto_play_enabled = auto_play;
        }

        let reflections_changed = report.reflections != before.reflections;
        let content_changed = report.title != before.title
            || report.script_final != before.script_final
            || report.highlights_final != before.highlights_final
            || report.questions != before.questions
            || report.resolved_source_language() != before.resolved_source_language()
            || reflections_changed;

        let report = self.report_repo.update(&report).await?;

        let refreshing = content_changed && report.has_script();
        if content_changed {
            self.reset_reviews(report_id).await?;
        }
        if refreshing {
            self.scheduler.schedule_refresh(&report);
        } else if reflections_changed {
            self.scheduler.schedule_reflection_audio(report_id, None);
        }

        tracing::info!(
            report_id = report_id,
            content_changed = content_changed,
            reflections_changed = reflections_changed,
            "Report updated"
        );
        Ok(report.into())
    }

    async fn delete_report(&self, report_id: i64) -> Result<DeleteResponse, ReportServiceError> {
        if !self.report_repo.delete(report_id).await? {
            return Err(ReportServiceError::NotFound(report_id));
        }
        tracing::info!(report_id = report_id, "Report deleted");
        Ok(DeleteResponse {
            ok: true,
            deleted_id: report_id,
        })
    }

    async fn generate(&self, report_id: i64) -> Result<GenerateResponse, ReportServiceError> {
        let mut report = self.find_report(report_id).await?;
        if report.summary_raw.trim().is_empty() {
            return Err(ReportServiceError::Invalid("summary_raw is empty".to_string()));
        }
        if report.source_language.is_none() {
            report.source_language = Some(report.resolved_source_language());
        }

        let package = self
            .generation
            .generate_package(&report.source_content(), report.question_persona)
            .await?;

        report.script_draft = package.script.clone();
        report.script_final = package.script;
        report.highlights_draft = package.highlights.clone();
        report.highlights_final = package.highlights;
        report.reflections = package.reflections;
        report.questions = package.questions;
        let report = self.report_repo.update(&report).await?;

        self.scheduler.schedule_refresh(&report);

        tracing::info!(report_id = report_id, "Report content generated");
        Ok(GenerateResponse {
            report_id,
            script_draft: report.script_draft,
            highlights_draft: report.highlights_draft,
            reflections_draft: report.reflections,
            questions_draft: report.questions,
        })
    }

    async fn publish(&self, report_id: i64) -> Result<PublishResponse, ReportServiceError> {
        let mut report = self.find_report(report_id).await?;

        if report.title.trim().is_empty() {
            return Err(ReportServiceError::NotPublishable("title is empty".to_string()));
        }
        if report.speaker.trim().is_empty() {
            return Err(ReportServiceError::NotPublishable("speaker is empty".to_string()));
        }
        if !report.has_script() {
            return Err(ReportServiceError::NotPublishable(
                "final script is empty".to_string(),
            ));
        }
        let highlights = normalize_highlights(&report.highlights_final);
        if highlights.is_empty() || non_blank_count(&report.highlights_final) > MAX_HIGHLIGHTS {
            return Err(ReportServiceError::NotPublishable(format!(
                "1 to {} final highlights are required",
                MAX_HIGHLIGHTS
            )));
        }

        let published_at = Utc::now();
        report.highlights_final = highlights;
        report.status = ReportStatus::Published;
        report.published_at = Some(published_at);
        let report = self.report_repo.update(&report).await?;

        tracing::info!(report_id = report_id, "Report published");
        Ok(PublishResponse {
            report_id,
            status: report.status,
            published_at: report.published_at.unwrap_or(published_at),
        })
    }

    async fn questions(
        &self,
        report_id: i64,
        language: Option<LanguageKey>,
        persona: Option<String>,
    ) -> Result<QuestionsResponse, ReportServiceError> {
        let mut report = self.find_report(report_id).await?;
        let target = persona
            .as_deref()
            .map(|p| QuestionPersona::normalize(Some(p)))
            .unwrap_or(report.question_persona);

        let base = normalize_questions(&report.questions);
        if base.is_empty() {
            let questions = self
                .generation
                .generate_questions(&report.source_content(), target)
                .await?;
            report.questions = normalize_questions(&questions);
            report.question_persona = target;
            let report = self.report_repo.update(&report).await?;
            return Ok(QuestionsResponse::new(
                report_id,
                target,
                report.questions,
            ));
        }

        if target != report.question_persona {
            let questions = self
                .generation
                .generate_questions(&report.source_content(), target)
                .await?;
            return Ok(QuestionsResponse::new(
                report_id,
                target,
                normalize_questions(&questions),
            ));
        }

        let source = report.resolved_source_language();
        let language = language.unwrap_or(source);
        if language != source {
            if let Some(row) = self.translation_repo.get(report_id, language).await? {
                let translated = normalize_questions(&row.questions);
                if !translated.is_empty() {
                    return Ok(QuestionsResponse::new(
                        report_id,
                        row.question_persona,
                        translated,
                    ));
                }
            }
        }

        Ok(QuestionsResponse::new(
            report_id,
            report.question_persona,
            base,
        ))
    }
}
