use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::domain::language::LanguageKey;
use crate::domain::translation::{
    RetranslateResponse, SynthesisPolicy, TranslationJobsResponse, TranslationListResponse,
    TranslationResponse, TranslationScheduler, TranslationServiceError, UpdateTranslationRequest,
};
use crate::{
    domain::translation::{TranslationService, TranslationServiceApi},
    error::AppResult,
};

pub struct TranslationController {
    translation_service: Arc<TranslationService>,
    scheduler: Arc<TranslationScheduler>,
}

/// Unknown keys are rejected before any work starts
fn parse_language(raw: &str) -> Result<LanguageKey, TranslationServiceError> {
    Ok(raw.parse()?)
}

impl TranslationController {
    pub fn new(
        translation_service: Arc<TranslationService>,
        scheduler: Arc<TranslationScheduler>,
    ) -> Self {
        Self {
            translation_service,
            scheduler,
        }
    }

    /// GET /api/reports/{id}/translations
    pub async fn list_translations(
        State(controller): State<Arc<TranslationController>>,
        Path(report_id): Path<i64>,
    ) -> AppResult<Json<TranslationListResponse>> {
        let list = controller
            .translation_service
            .list_translations(report_id)
            .await?;
        Ok(Json(list))
    }

    /// GET /api/reports/{id}/translation-jobs
    pub async fn translation_jobs(
        State(controller): State<Arc<TranslationController>>,
        Path(report_id): Path<i64>,
    ) -> AppResult<Json<TranslationJobsResponse>> {
        let jobs = controller
            .translation_service
            .translation_jobs(report_id)
            .await?;
        Ok(Json(jobs))
    }

    /// POST /api/reports/{id}/translations/retranslate-all
    pub async fn retranslate_all(
        State(controller): State<Arc<TranslationController>>,
        Path(report_id): Path<i64>,
    ) -> AppResult<Json<RetranslateResponse>> {
        let report = controller.translation_service.report(report_id).await?;
        let queued = controller.scheduler.retranslate_all(&report)?;
        Ok(Json(queued))
    }

    /// POST /api/reports/{id}/translations/{lang}/retranslate
    pub async fn retranslate_language(
        State(controller): State<Arc<TranslationController>>,
        Path((report_id, lang)): Path<(i64, String)>,
    ) -> AppResult<Json<RetranslateResponse>> {
        let language = parse_language(&lang)?;
        let report = controller.translation_service.report(report_id).await?;
        let queued = controller
            .scheduler
            .retranslate_language(&report, language)?;
        Ok(Json(queued))
    }

    /// POST /api/reports/{id}/translations/{lang}/prepare
    ///
    /// Runs the whole preparation before answering.
    pub async fn prepare(
        State(controller): State<Arc<TranslationController>>,
        Path((report_id, lang)): Path<(i64, String)>,
    ) -> AppResult<Json<TranslationResponse>> {
        let language = parse_language(&lang)?;
        let translation = controller
            .translation_service
            .prepare_language(report_id, language, SynthesisPolicy::Required)
            .await?;
        Ok(Json(translation.into()))
    }

    /// PUT /api/reports/{id}/translations/{lang}
    pub async fn update_translation(
        State(controller): State<Arc<TranslationController>>,
        Path((report_id, lang)): Path<(i64, String)>,
        Json(request): Json<UpdateTranslationRequest>,
    ) -> AppResult<Json<TranslationResponse>> {
        let language = parse_language(&lang)?;
        let edited = controller
            .translation_service
            .edit_translation(report_id, language, request)
            .await?;

        if edited.reflections_changed && language.needs_audio() {
            controller
                .scheduler
                .schedule_reflection_audio(report_id, Some(vec![language]));
        }
        Ok(Json(edited.translation.into()))
    }
}
