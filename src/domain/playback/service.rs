use std::sync::Arc;

use super::{PlaybackItem, PlaybackQuery, PlaybackQueueResponse};
use crate::domain::language::parse_language_list;
use crate::domain::report::normalize::{
    normalize_highlights, normalize_questions, normalize_reflections,
};
use crate::domain::translation::{TranslationServiceApi, TranslationServiceError};
use crate::infrastructure::repositories::ReportRepository;

pub struct PlaybackService {
    report_repo: Arc<dyn ReportRepository>,
    translations: Arc<dyn TranslationServiceApi>,
}

impl PlaybackService {
    pub fn new(
        report_repo: Arc<dyn ReportRepository>,
        translations: Arc<dyn TranslationServiceApi>,
    ) -> Self {
        Self {
            report_repo,
            translations,
        }
    }

    /// Auto-play reports with a final script, newest first, each with its
    /// per-language views
    pub async fn queue(
        &self,
        query: PlaybackQuery,
    ) -> Result<PlaybackQueueResponse, TranslationServiceError> {
        let audio_filter = query
            .langs
            .as_deref()
            .map(parse_language_list)
            .unwrap_or_default();

        let reports = self.report_repo.list_auto_play().await?;
        let mut items = Vec::new();
        for report in reports {
            if query.report_id.is_some_and(|id| id != report.id) || !report.has_script() {
                continue;
            }

            let localized = self
                .translations
                .localized_payload(&report, query.include_audio, &audio_filter)
                .await?;
            items.push(PlaybackItem {
                id: report.id,
                source_language: report.resolved_source_language(),
                highlights_final: normalize_highlights(&report.highlights_final),
                reflections_final: normalize_reflections(&report.reflections),
                questions_final: normalize_questions(&report.questions),
                title: report.title,
                speaker: report.speaker,
                meeting_time: report.meeting_time,
                script_final: report.script_final,
                question_persona: report.question_persona,
                localized,
            });
        }

        tracing::debug!(
            total = items.len(),
            include_audio = query.include_audio,
            "Playback queue assembled"
        );
        Ok(PlaybackQueueResponse {
            total: items.len(),
            items,
        })
    }
}
