use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::TranslationServiceError;
use super::hashing::content_hash;
use super::jobs::{resolve_status, JobStateStore};
use super::model::{
    EditedTranslation, LanguageOutcome, LocalizedView, ReflectionAudioOutcome, ReflectionItem,
    ReflectionsResponse, RefreshOutcome, Translation, TranslationFields, TranslationJobItem,
    TranslationJobsResponse, TranslationListItem, TranslationListResponse, TranslationStatus,
    UpdateTranslationRequest,
};
use super::payload::build_localized_payload;
use super::speech::SpeechSynthesizer;
use crate::domain::generation::{GenerationError, GenerationServiceApi, TranslatablePackage};
use crate::domain::language::LanguageKey;
use crate::domain::report::normalize::{
    normalize_highlights, normalize_questions, normalize_reflections,
};
use crate::domain::report::{QuestionPersona, Report};
use crate::infrastructure::repositories::{
    ReflectionAudioRepository, ReportRepository, TranslationRepository,
};

/// What happens when narration cannot be synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisPolicy {
    /// The whole preparation fails
    Required,
    /// The row is stored without audio
    BestEffort,
}

pub struct TranslationService {
    report_repo: Arc<dyn ReportRepository>,
    translation_repo: Arc<dyn TranslationRepository>,
    reflection_audio_repo: Arc<dyn ReflectionAudioRepository>,
    generation: Arc<dyn GenerationServiceApi>,
    speech: Arc<SpeechSynthesizer>,
    jobs: Arc<dyn JobStateStore>,
}

impl TranslationService {
    pub fn new(
        report_repo: Arc<dyn ReportRepository>,
        translation_repo: Arc<dyn TranslationRepository>,
        reflection_audio_repo: Arc<dyn ReflectionAudioRepository>,
        generation: Arc<dyn GenerationServiceApi>,
        speech: Arc<SpeechSynthesizer>,
        jobs: Arc<dyn JobStateStore>,
    ) -> Self {
        Self {
            report_repo,
            translation_repo,
            reflection_audio_repo,
            generation,
            speech,
            jobs,
        }
    }
}

#[async_trait]
pub trait TranslationServiceApi: Send + Sync {
    async fn report(&self, report_id: i64) -> Result<Report, TranslationServiceError>;

    /// Current script and highlights, generating and storing them first when
    /// the report has no script yet
    async fn ensure_script(
        &self,
        report: &mut Report,
    ) -> Result<(String, Vec<String>), TranslationServiceError>;

    /// Build and store the row for one language.
    ///
    /// The source language gets an identity copy of the report; every other
    /// language is translated. Any regeneration clears the reviewed flag.
    async fn prepare_language(
        &self,
        report_id: i64,
        language: LanguageKey,
        policy: SynthesisPolicy,
    ) -> Result<Translation, TranslationServiceError>;

    /// Regenerate every language. One language failing never stops the
    /// others and leaves its previous row in place.
    async fn refresh_all(&self, report_id: i64) -> Result<RefreshOutcome, TranslationServiceError>;

    /// Narrate each reflection, skipping those whose stored audio still
    /// matches the text. `None` means every narrated language.
    async fn synthesize_reflection_audio(
        &self,
        report_id: i64,
        languages: Option<Vec<LanguageKey>>,
    ) -> Result<ReflectionAudioOutcome, TranslationServiceError>;

    async fn edit_translation(
        &self,
        report_id: i64,
        language: LanguageKey,
        request: UpdateTranslationRequest,
    ) -> Result<EditedTranslation, TranslationServiceError>;

    async fn list_translations(
        &self,
        report_id: i64,
    ) -> Result<TranslationListResponse, TranslationServiceError>;

    async fn translation_jobs(
        &self,
        report_id: i64,
    ) -> Result<TranslationJobsResponse, TranslationServiceError>;

    /// Reflections in `language` (the source language when `None`), with
    /// audio only where it was synthesized from the current text
    async fn reflections(
        &self,
        report_id: i64,
        language: Option<LanguageKey>,
    ) -> Result<ReflectionsResponse, TranslationServiceError>;

    async fn localized_payload(
        &self,
        report: &Report,
        include_audio: bool,
        audio_filter: &[LanguageKey],
    ) -> Result<BTreeMap<LanguageKey, LocalizedView>, TranslationServiceError>;
}

impl TranslationService {
    /// Source language row: the report's own content, never translated
    async fn identity_fields(
        &self,
        report: &Report,
        script: &str,
        highlights: Vec<String>,
    ) -> TranslationFields {
        let language = report.resolved_source_language();
        let audio = if language.needs_audio() {
            self.synthesize_or_skip(script, language).await
        } else {
            Vec::new()
        };

        TranslationFields {
            title_text: report.title.trim().to_string(),
            script_text: script.to_string(),
            highlights,
            reflections: normalize_reflections(&report.reflections),
            questions: normalize_questions(&report.questions),
            question_persona: report.question_persona,
            audio,
            reviewed: false,
            reviewed_at: None,
        }
    }

    async fn translated_fields(
        &self,
        report: &Report,
        language: LanguageKey,
        script: &str,
        highlights: Vec<String>,
        policy: SynthesisPolicy,
    ) -> Result<TranslationFields, TranslationServiceError> {
        let package = TranslatablePackage {
            title: report.title.trim().to_string(),
            script: script.to_string(),
            highlights,
        };
        let translated = self
            .generation
            .translate_package(&package, language)
            .await
            .map_err(|e| TranslationServiceError::Translation {
                language,
                message: e.to_string(),
            })?;

        let reflections = normalize_reflections(&report.reflections);
        let questions = normalize_questions(&report.questions);
        let translated_reflections = self.translate_items(&reflections, language).await;
        let translated_questions = self.translate_items(&questions, language).await;
        let (reflections, reflection_fallbacks) =
            with_fallback(translated_reflections, &reflections);
        let (questions, question_fallbacks) = with_fallback(translated_questions, &questions);
        if reflection_fallbacks + question_fallbacks > 0 {
            tracing::warn!(
                report_id = report.id,
                language = %language,
                reflection_fallbacks = reflection_fallbacks,
                question_fallbacks = question_fallbacks,
                "Some items kept their source text"
            );
        }

        let audio = if language.needs_audio() {
            match self.speech.synthesize(&translated.script, language).await {
                Ok(audio) => audio,
                Err(message) if policy == SynthesisPolicy::Required => {
                    return Err(TranslationServiceError::Synthesis { language, message });
                }
                Err(message) => {
                    tracing::warn!(
                        report_id = report.id,
                        language = %language,
                        error = %message,
                        "Storing translation without audio"
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(TranslationFields {
            title_text: translated.title,
            script_text: translated.script,
            highlights: normalize_highlights(&translated.highlights),
            reflections: normalize_reflections(&reflections),
            questions: normalize_questions(&questions),
            question_persona: report.question_persona,
            audio,
            reviewed: false,
            reviewed_at: None,
        })
    }

    /// One result per item, all requests in flight together
    async fn translate_items(
        &self,
        items: &[String],
        language: LanguageKey,
    ) -> Vec<Result<String, GenerationError>> {
        join_all(
            items
                .iter()
                .map(|item| self.generation.translate_text(item, language)),
        )
        .await
    }

    async fn synthesize_or_skip(&self, text: &str, language: LanguageKey) -> Vec<u8> {
        self.speech
            .synthesize(text, language)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(language = %language, error = %e, "Audio skipped");
                Vec::new()
            })
    }

    /// Reflection texts narrated for `language`: the translated list when
    /// one is stored, otherwise the report's own
    fn reflection_texts(report: &Report, row: Option<&Translation>) -> Vec<String> {
        let translated = row
            .map(|r| normalize_reflections(&r.reflections))
            .unwrap_or_default();
        if translated.is_empty() {
            normalize_reflections(&report.reflections)
        } else {
            translated
        }
    }

    fn non_source_languages(report: &Report) -> Vec<LanguageKey> {
        let source = report.resolved_source_language();
        LanguageKey::ALL
            .iter()
            .copied()
            .filter(|lang| *lang != source)
            .collect()
    }
}

/// Successful items, with the source item standing in for each failure
fn with_fallback(
    results: Vec<Result<String, GenerationError>>,
    sources: &[String],
) -> (Vec<String>, usize) {
    let mut fallbacks = 0;
    let items: Vec<String> = results
        .into_iter()
        .zip(sources)
        .map(|(result, source)| {
            result.unwrap_or_else(|_| {
                fallbacks += 1;
                source.clone()
            })
        })
        .collect();
    (items, fallbacks)
}

fn trimmed(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.trim().to_string()
    } else {
        value.to_string()
    }
}

#[async_trait]
impl TranslationServiceApi for TranslationService {
    async fn report(&self, report_id: i64) -> Result<Report, TranslationServiceError> {
        self.report_repo
            .find_by_id(report_id)
            .await?
            .ok_or(TranslationServiceError::ReportNotFound(report_id))
    }

    async fn ensure_script(
        &self,
        report: &mut Report,
    ) -> Result<(String, Vec<String>), TranslationServiceError> {
        let script = report.current_script().to_string();
        if !script.is_empty() {
            return Ok((script, normalize_highlights(&report.highlights_final)));
        }

        tracing::info!(report_id = report.id, "Report has no script, generating one");
        let package = self
            .generation
            .generate_package(&report.source_content(), report.question_persona)
            .await?;

        report.script_draft = package.script.clone();
        report.script_final = package.script.clone();
        report.highlights_draft = package.highlights.clone();
        report.highlights_final = package.highlights.clone();
        report.reflections = package.reflections;
        report.questions = package.questions;
        *report = self.report_repo.update(report).await?;

        Ok((package.script, normalize_highlights(&package.highlights)))
    }

    async fn prepare_language(
        &self,
        report_id: i64,
        language: LanguageKey,
        policy: SynthesisPolicy,
    ) -> Result<Translation, TranslationServiceError> {
        let mut report = self.report(report_id).await?;
        let (script, highlights) = self.ensure_script(&mut report).await?;

        let fields = if language == report.resolved_source_language() {
            self.identity_fields(&report, &script, highlights).await
        } else {
            self.translated_fields(&report, language, &script, highlights, policy)
                .await?
        };

        let row = self
            .translation_repo
            .upsert(report_id, language, fields)
            .await?;

        tracing::info!(
            report_id = report_id,
            language = %language,
            audio_size = row.audio.len(),
            "Translation prepared"
        );
        Ok(row)
    }

    async fn refresh_all(&self, report_id: i64) -> Result<RefreshOutcome, TranslationServiceError> {
        let report = self.report(report_id).await?;
        let source_language = report.resolved_source_language();
        let targets = Self::non_source_languages(&report);

        if !report.has_script() {
            tracing::warn!(report_id = report_id, "Refresh skipped, report has no final script");
            return Ok(RefreshOutcome {
                report_id,
                source_language,
                source: Err("report has no final script".to_string()),
                languages: targets
                    .into_iter()
                    .map(|language| LanguageOutcome {
                        language,
                        result: Err("report has no final script".to_string()),
                    })
                    .collect(),
            });
        }

        let script = report.script_final.trim().to_string();
        let highlights = normalize_highlights(&report.highlights_final);

        let identity = self
            .identity_fields(&report, &script, highlights.clone())
            .await;
        let source = self
            .translation_repo
            .upsert(report_id, source_language, identity)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string());
        if let Err(error) = &source {
            tracing::warn!(
                report_id = report_id,
                language = %source_language,
                error = %error,
                "Source language copy not stored, refreshing targets anyway"
            );
        }

        let mut languages = Vec::with_capacity(targets.len());
        for language in targets {
            let result = match self
                .translated_fields(
                    &report,
                    language,
                    &script,
                    highlights.clone(),
                    SynthesisPolicy::BestEffort,
                )
                .await
            {
                Ok(fields) => self
                    .translation_repo
                    .upsert(report_id, language, fields)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            if let Err(error) = &result {
                tracing::warn!(
                    report_id = report_id,
                    language = %language,
                    error = %error,
                    "Language refresh failed, keeping previous translation"
                );
            }
            languages.push(LanguageOutcome { language, result });
        }

        let outcome = RefreshOutcome {
            report_id,
            source_language,
            source,
            languages,
        };
        tracing::info!(
            report_id = report_id,
            source_language = %source_language,
            failed = outcome.failed_languages().len(),
            "Translations refreshed"
        );
        Ok(outcome)
    }

    async fn synthesize_reflection_audio(
        &self,
        report_id: i64,
        languages: Option<Vec<LanguageKey>>,
    ) -> Result<ReflectionAudioOutcome, TranslationServiceError> {
        let report = self.report(report_id).await?;
        let targets: Vec<LanguageKey> = languages
            .unwrap_or_else(LanguageKey::audio_languages)
            .into_iter()
            .filter(LanguageKey::needs_audio)
            .collect();

        let mut outcome = ReflectionAudioOutcome::default();
        for language in targets {
            let row = self.translation_repo.get(report_id, language).await?;
            let texts = Self::reflection_texts(&report, row.as_ref());

            for (index, text) in texts.iter().enumerate() {
                let seq = index as i32 + 1;
                let hash = content_hash(text.trim());

                if self
                    .reflection_audio_repo
                    .get_valid(report_id, seq, language, &hash)
                    .await?
                    .is_some()
                {
                    outcome.cached += 1;
                    continue;
                }

                let audio = match self.speech.synthesize(text, language).await {
                    Ok(audio) => audio,
                    Err(e) => {
                        tracing::warn!(
                            report_id = report_id,
                            language = %language,
                            seq = seq,
                            error = %e,
                            "Reflection audio failed"
                        );
                        outcome.failed += 1;
                        continue;
                    }
                };

                match self
                    .reflection_audio_repo
                    .upsert(report_id, seq, language, &hash, &audio)
                    .await
                {
                    Ok(()) => outcome.synthesized += 1,
                    Err(e) => {
                        tracing::warn!(
                            report_id = report_id,
                            language = %language,
                            seq = seq,
                            error = %e,
                            "Reflection audio could not be stored"
                        );
                        outcome.failed += 1;
                    }
                }
            }
        }

        tracing::info!(
            report_id = report_id,
            synthesized = outcome.synthesized,
            cached = outcome.cached,
            failed = outcome.failed,
            "Reflection audio pass finished"
        );
        Ok(outcome)
    }

    async fn edit_translation(
        &self,
        report_id: i64,
        language: LanguageKey,
        request: UpdateTranslationRequest,
    ) -> Result<EditedTranslation, TranslationServiceError> {
        let report = self.report(report_id).await?;
        if language == report.resolved_source_language() {
            return Err(TranslationServiceError::SourceLanguageNoTranslation(
                language, report_id,
            ));
        }

        let current = match self.translation_repo.get(report_id, language).await? {
            Some(row) => row,
            None => {
                self.prepare_language(report_id, language, SynthesisPolicy::Required)
                    .await?
            }
        };
        let previous_reflections = normalize_reflections(&current.reflections);
        let mut fields = current.clone().into_fields();

        if let Some(title) = &request.title {
            fields.title_text = trimmed(title, &report.title);
        }
        let mut script_changed = false;
        if let Some(script) = &request.script_final {
            let script = script.trim();
            if !script.is_empty() {
                script_changed = script != current.script_text;
                fields.script_text = script.to_string();
            }
        }
        if let Some(highlights) = &request.highlights_final {
            fields.highlights = normalize_highlights(highlights);
        }
        if let Some(reflections) = &request.reflections_final {
            fields.reflections = normalize_reflections(reflections);
        }
        if let Some(questions) = &request.questions_final {
            fields.questions = normalize_questions(questions);
        }
        if request.question_persona.is_some() {
            fields.question_persona = QuestionPersona::normalize(request.question_persona.as_deref());
        }

        if language.needs_audio() && (script_changed || !current.has_audio()) {
            fields.audio = match self.speech.synthesize(&fields.script_text, language).await {
                Ok(audio) => audio,
                Err(e) => {
                    tracing::warn!(
                        report_id = report_id,
                        language = %language,
                        error = %e,
                        "Edited script stored without audio"
                    );
                    Vec::new()
                }
            };
        }

        let content_changed = fields.title_text != current.title_text
            || fields.script_text != current.script_text
            || fields.highlights != current.highlights
            || fields.reflections != current.reflections
            || fields.questions != current.questions
            || fields.question_persona != current.question_persona;

        match request.reviewed {
            Some(reviewed) => {
                fields.reviewed = reviewed;
                fields.reviewed_at = reviewed.then(Utc::now);
            }
            None if content_changed => {
                fields.reviewed = false;
                fields.reviewed_at = None;
            }
            None => {}
        }

        let reflections_changed = fields.reflections != previous_reflections;
        let translation = self
            .translation_repo
            .upsert(report_id, language, fields)
            .await?;

        tracing::info!(
            report_id = report_id,
            language = %language,
            reviewed = translation.reviewed,
            reflections_changed = reflections_changed,
            "Translation edited"
        );
        Ok(EditedTranslation {
            translation,
            reflections_changed,
        })
    }

    async fn list_translations(
        &self,
        report_id: i64,
    ) -> Result<TranslationListResponse, TranslationServiceError> {
        let report = self.report(report_id).await?;
        let source_language = report.resolved_source_language();
        let rows: BTreeMap<LanguageKey, Translation> = self
            .translation_repo
            .list_by_report(report_id)
            .await?
            .into_iter()
            .map(|row| (row.language_key, row))
            .collect();

        let base_highlights = normalize_highlights(&report.highlights_final);
        let base_reflections = normalize_reflections(&report.reflections);
        let base_questions = normalize_questions(&report.questions);

        let items = LanguageKey::ALL
            .iter()
            .copied()
            .map(|language| {
                if language == source_language {
                    return TranslationListItem {
                        language_key: language,
                        status: if report.has_script() {
                            TranslationStatus::Ready
                        } else {
                            TranslationStatus::Missing
                        },
                        error: String::new(),
                        reviewed: true,
                        reviewed_at: Some(report.updated_at),
                        title: report.title.clone(),
                        script_final: report.script_final.clone(),
                        highlights_final: base_highlights.clone(),
                        reflections_final: base_reflections.clone(),
                        questions_final: base_questions.clone(),
                        question_persona: report.question_persona,
                        render_mode: language.render_mode(),
                        audio_ready: true,
                    };
                }

                let job = self.jobs.get(report_id, language);
                let row = rows.get(&language);
                let status = resolve_status(job.as_ref(), row.is_some());
                let error = job.and_then(|j| j.error).unwrap_or_default();

                match row {
                    None => TranslationListItem {
                        language_key: language,
                        status,
                        error,
                        reviewed: false,
                        reviewed_at: None,
                        title: String::new(),
                        script_final: String::new(),
                        highlights_final: Vec::new(),
                        reflections_final: Vec::new(),
                        questions_final: Vec::new(),
                        question_persona: report.question_persona,
                        render_mode: language.render_mode(),
                        audio_ready: !language.needs_audio(),
                    },
                    Some(row) => {
                        let reflections = normalize_reflections(&row.reflections);
                        let questions = normalize_questions(&row.questions);
                        TranslationListItem {
                            language_key: language,
                            status,
                            error,
                            reviewed: row.reviewed,
                            reviewed_at: row.reviewed_at,
                            title: trimmed(&row.title_text, &report.title),
                            script_final: trimmed(&row.script_text, &report.script_final),
                            highlights_final: normalize_highlights(&row.highlights),
                            reflections_final: if reflections.is_empty() {
                                base_reflections.clone()
                            } else {
                                reflections
                            },
                            questions_final: if questions.is_empty() {
                                base_questions.clone()
                            } else {
                                questions
                            },
                            question_persona: row.question_persona,
                            render_mode: language.render_mode(),
                            audio_ready: row.audio_ready(),
                        }
                    }
                }
            })
            .collect();

        Ok(TranslationListResponse {
            report_id,
            source_language,
            items,
        })
    }

    async fn translation_jobs(
        &self,
        report_id: i64,
    ) -> Result<TranslationJobsResponse, TranslationServiceError> {
        let report = self.report(report_id).await?;
        let items = Self::non_source_languages(&report)
            .into_iter()
            .map(|language| match self.jobs.get(report_id, language) {
                Some(state) => TranslationJobItem {
                    language_key: language,
                    status: state.status.into(),
                    error: state.error.unwrap_or_default(),
                    updated_at: Some(state.updated_at),
                },
                None => TranslationJobItem {
                    language_key: language,
                    status: TranslationStatus::Missing,
                    error: String::new(),
                    updated_at: None,
                },
            })
            .collect();

        Ok(TranslationJobsResponse { report_id, items })
    }

    async fn reflections(
        &self,
        report_id: i64,
        language: Option<LanguageKey>,
    ) -> Result<ReflectionsResponse, TranslationServiceError> {
        let report = self.report(report_id).await?;
        let language = language.unwrap_or_else(|| report.resolved_source_language());

        let row = if language == report.resolved_source_language() {
            None
        } else {
            self.translation_repo.get(report_id, language).await?
        };
        let texts = Self::reflection_texts(&report, row.as_ref());

        let mut reflections = Vec::with_capacity(texts.len());
        for (index, text) in texts.into_iter().enumerate() {
            let seq = index as i32 + 1;
            let audio_base64 = if language.needs_audio() {
                self.reflection_audio_repo
                    .get_valid(report_id, seq, language, &content_hash(text.trim()))
                    .await?
                    .map(|audio| STANDARD.encode(audio))
            } else {
                None
            };
            reflections.push(ReflectionItem {
                seq,
                text,
                audio_base64,
            });
        }

        Ok(ReflectionsResponse {
            report_id,
            language_key: language,
            reflections,
        })
    }

    async fn localized_payload(
        &self,
        report: &Report,
        include_audio: bool,
        audio_filter: &[LanguageKey],
    ) -> Result<BTreeMap<LanguageKey, LocalizedView>, TranslationServiceError> {
        let rows = self.translation_repo.list_by_report(report.id).await?;
        Ok(build_localized_payload(
            report,
            &rows,
            include_audio,
            audio_filter,
        ))
    }
}
