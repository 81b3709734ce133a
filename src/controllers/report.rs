use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::domain::language::LanguageKey;
use crate::domain::report::{
    CreateReportRequest, DeleteResponse, GenerateResponse, LanguageQuery, PublishResponse,
    QuestionsQuery, QuestionsResponse, ReportListQuery, ReportListResponse, ReportResponse,
    ReportServiceError, UpdateReportRequest,
};
use crate::domain::translation::ReflectionsResponse;
use crate::{
    domain::report::{ReportService, ReportServiceApi},
    domain::translation::{TranslationService, TranslationServiceApi},
    error::AppResult,
};

pub struct ReportController {
    report_service: Arc<ReportService>,
    translation_service: Arc<TranslationService>,
}

/// Blank means "not given"
fn optional_language(raw: Option<&str>) -> Result<Option<LanguageKey>, ReportServiceError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(Some(value.parse()?)),
        _ => Ok(None),
    }
}

impl ReportController {
    pub fn new(
        report_service: Arc<ReportService>,
        translation_service: Arc<TranslationService>,
    ) -> Self {
        Self {
            report_service,
            translation_service,
        }
    }

    /// GET /api/reports
    pub async fn list_reports(
        State(controller): State<Arc<ReportController>>,
        Query(query): Query<ReportListQuery>,
    ) -> AppResult<Json<ReportListResponse>> {
        let page = controller.report_service.list_reports(query).await?;
        Ok(Json(page))
    }

    /// POST /api/reports
    pub async fn create_report(
        State(controller): State<Arc<ReportController>>,
        Json(request): Json<CreateReportRequest>,
    ) -> AppResult<(StatusCode, Json<ReportResponse>)> {
        let report = controller.report_service.create_report(request).await?;
        Ok((StatusCode::CREATED, Json(report)))
    }

    /// GET /api/reports/latest-published
    pub async fn latest_published(
        State(controller): State<Arc<ReportController>>,
    ) -> AppResult<Json<ReportResponse>> {
        let report = controller.report_service.latest_published().await?;
        Ok(Json(report))
    }

    /// GET /api/reports/{id}
    pub async fn get_report(
        State(controller): State<Arc<ReportController>>,
        Path(report_id): Path<i64>,
    ) -> AppResult<Json<ReportResponse>> {
        let report = controller.report_service.get_report(report_id).await?;
        Ok(Json(report))
    }

    /// PUT /api/reports/{id}
    pub async fn update_report(
        State(controller): State<Arc<ReportController>>,
        Path(report_id): Path<i64>,
        Json(request): Json<UpdateReportRequest>,
    ) -> AppResult<Json<ReportResponse>> {
        let report = controller
            .report_service
            .update_report(report_id, request)
            .await?;
        Ok(Json(report))
    }

    /// DELETE /api/reports/{id}
    pub async fn delete_report(
        State(controller): State<Arc<ReportController>>,
        Path(report_id): Path<i64>,
    ) -> AppResult<Json<DeleteResponse>> {
        let deleted = controller.report_service.delete_report(report_id).await?;
        Ok(Json(deleted))
    }

    /// POST /api/reports/{id}/generate
    pub async fn generate(
        State(controller): State<Arc<ReportController>>,
        Path(report_id): Path<i64>,
    ) -> AppResult<Json<GenerateResponse>> {
        let generated = controller.report_service.generate(report_id).await?;
        Ok(Json(generated))
    }

    /// POST /api/reports/{id}/publish
    pub async fn publish(
        State(controller): State<Arc<ReportController>>,
        Path(report_id): Path<i64>,
    ) -> AppResult<Json<PublishResponse>> {
        let published = controller.report_service.publish(report_id).await?;
        Ok(Json(published))
    }

    /// GET /api/reports/{id}/reflections?lang=
    pub async fn reflections(
        State(controller): State<Arc<ReportController>>,
        Path(report_id): Path<i64>,
        Query(query): Query<LanguageQuery>,
    ) -> AppResult<Json<ReflectionsResponse>> {
        let language = optional_language(query.lang.as_deref())?;
        let reflections = controller
            .translation_service
            .reflections(report_id, language)
            .await?;
        Ok(Json(reflections))
    }

    /// GET /api/reports/{id}/questions?lang=&persona=
    pub async fn questions(
        State(controller): State<Arc<ReportController>>,
        Path(report_id): Path<i64>,
        Query(query): Query<QuestionsQuery>,
    ) -> AppResult<Json<QuestionsResponse>> {
        let language = optional_language(query.lang.as_deref())?;
        let questions = controller
            .report_service
            .questions(report_id, language, query.persona)
            .await?;
        Ok(Json(questions))
    }
}
