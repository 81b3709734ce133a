use futures::FutureExt;
use std::sync::Arc;
use uuid::Uuid;

use super::dispatch::{Task, TaskDispatcher};
use super::error::TranslationServiceError;
use super::jobs::{JobStateStore, JobStatus};
use super::model::RetranslateResponse;
use super::service::{SynthesisPolicy, TranslationServiceApi};
use crate::domain::language::LanguageKey;
use crate::domain::report::Report;

/// Queues translation work and records its progress in the job store.
///
/// Every language is marked translating before its task is queued, so a
/// client polling right after scheduling never sees a stale status.
pub struct TranslationScheduler {
    service: Arc<dyn TranslationServiceApi>,
    jobs: Arc<dyn JobStateStore>,
    dispatcher: Arc<dyn TaskDispatcher>,
}

impl TranslationScheduler {
    pub fn new(
        service: Arc<dyn TranslationServiceApi>,
        jobs: Arc<dyn JobStateStore>,
        dispatcher: Arc<dyn TaskDispatcher>,
    ) -> Self {
        Self {
            service,
            jobs,
            dispatcher,
        }
    }

    /// Regenerate every language of `report` in the background.
    ///
    /// Reflection audio is narrated from the translated rows, so when the
    /// report has reflections their audio pass is queued once the refresh
    /// has written those rows.
    pub fn schedule_refresh(&self, report: &Report) {
        let report_id = report.id;
        let targets = non_source_languages(report);
        for language in &targets {
            self.jobs
                .mark(report_id, *language, JobStatus::Translating, None);
        }

        let service = self.service.clone();
        let jobs = self.jobs.clone();
        let dispatcher = self.dispatcher.clone();
        let narrate_reflections = !report.reflections.is_empty();
        self.dispatcher.enqueue(
            "refresh_translations",
            async move {
                let refreshed = service.refresh_all(report_id).await;
                match refreshed {
                    Ok(outcome) => {
                        for language in outcome.languages {
                            match language.result {
                                Ok(()) => {
                                    jobs.mark(report_id, language.language, JobStatus::Ready, None)
                                }
                                Err(error) => jobs.mark(
                                    report_id,
                                    language.language,
                                    JobStatus::Failed,
                                    Some(error),
                                ),
                            }
                        }
                        if narrate_reflections {
                            dispatcher.enqueue(
                                "reflection_audio",
                                reflection_audio_task(service, report_id, None),
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(report_id = report_id, error = %e, "Translation refresh failed");
                        for language in targets {
                            jobs.mark(report_id, language, JobStatus::Failed, Some(e.to_string()));
                        }
                    }
                }
            }
            .boxed(),
        );
        tracing::info!(report_id = report_id, "Translation refresh scheduled");
    }

    /// Prepare each of `languages` in its own background task
    pub fn schedule_languages(
        &self,
        report_id: i64,
        languages: Vec<LanguageKey>,
    ) -> RetranslateResponse {
        for language in &languages {
            self.jobs
                .mark(report_id, *language, JobStatus::Translating, None);

            let service = self.service.clone();
            let jobs = self.jobs.clone();
            let language = *language;
            self.dispatcher.enqueue(
                "prepare_translation",
                async move {
                    match service
                        .prepare_language(report_id, language, SynthesisPolicy::Required)
                        .await
                    {
                        Ok(_) => jobs.mark(report_id, language, JobStatus::Ready, None),
                        Err(e) => {
                            tracing::warn!(
                                report_id = report_id,
                                language = %language,
                                error = %e,
                                "Translation job failed"
                            );
                            let message = match e {
                                TranslationServiceError::ReportNotFound(_) => {
                                    "report not found".to_string()
                                }
                                other => other.to_string(),
                            };
                            jobs.mark(report_id, language, JobStatus::Failed, Some(message));
                        }
                    }
                }
                .boxed(),
            );
        }

        RetranslateResponse {
            task_id: Uuid::new_v4().simple().to_string(),
            report_id,
            languages,
            status: "queued".to_string(),
        }
    }

    pub fn retranslate_all(
        &self,
        report: &Report,
    ) -> Result<RetranslateResponse, TranslationServiceError> {
        let targets = non_source_languages(report);
        if targets.is_empty() {
            return Err(TranslationServiceError::NoTargets(report.id));
        }
        Ok(self.schedule_languages(report.id, targets))
    }

    pub fn retranslate_language(
        &self,
        report: &Report,
        language: LanguageKey,
    ) -> Result<RetranslateResponse, TranslationServiceError> {
        if language == report.resolved_source_language() {
            return Err(TranslationServiceError::SourceLanguageNoTranslation(
                language, report.id,
            ));
        }
        Ok(self.schedule_languages(report.id, vec![language]))
    }

    /// Narrate reflections in the background; `None` covers every narrated language
    pub fn schedule_reflection_audio(&self, report_id: i64, languages: Option<Vec<LanguageKey>>) {
        self.dispatcher.enqueue(
            "reflection_audio",
            reflection_audio_task(self.service.clone(), report_id, languages),
        );
    }
}

fn reflection_audio_task(
    service: Arc<dyn TranslationServiceApi>,
    report_id: i64,
    languages: Option<Vec<LanguageKey>>,
) -> Task {
    async move {
        if let Err(e) = service
            .synthesize_reflection_audio(report_id, languages)
            .await
        {
            tracing::warn!(report_id = report_id, error = %e, "Reflection audio job failed");
        }
    }
    .boxed()
}

fn non_source_languages(report: &Report) -> Vec<LanguageKey> {
    let source = report.resolved_source_language();
    LanguageKey::ALL
        .iter()
        .copied()
        .filter(|language| *language != source)
        .collect()
}
