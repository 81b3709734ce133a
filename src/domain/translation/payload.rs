use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::BTreeMap;

use super::model::{LocalizedView, Translation};
use crate::domain::language::{LanguageKey, RenderMode};
use crate::domain::report::normalize::{
    normalize_highlights, normalize_questions, normalize_reflections,
};
use crate::domain::report::Report;

/// Per-language views served to playback clients.
///
/// The source language is always present and built from the report itself,
/// taking audio from its identity row when one exists. Every other language
/// appears only once a translation row exists, so a missing key means the
/// language has not been prepared yet. Empty translated reflection or
/// question lists fall back to the report's own. Audio bytes are included
/// only when `include_audio` is set and `audio_filter` is empty or names the
/// language.
pub fn build_localized_payload(
    report: &Report,
    translations: &[Translation],
    include_audio: bool,
    audio_filter: &[LanguageKey],
) -> BTreeMap<LanguageKey, LocalizedView> {
    let wants_audio =
        |lang: LanguageKey| include_audio && (audio_filter.is_empty() || audio_filter.contains(&lang));

    let source_language = report.resolved_source_language();
    let source_row = translations
        .iter()
        .find(|t| t.language_key == source_language);

    let mut payload = BTreeMap::new();

    let source_audio = source_row
        .filter(|row| source_language.needs_audio() && row.has_audio())
        .map(|row| row.audio.as_slice());
    payload.insert(
        source_language,
        LocalizedView {
            title: report.title.clone(),
            script_final: report.script_final.clone(),
            highlights_final: normalize_highlights(&report.highlights_final),
            reflections_final: normalize_reflections(&report.reflections),
            questions_final: normalize_questions(&report.questions),
            question_persona: report.question_persona,
            render_mode: source_language.render_mode(),
            audio_ready: !source_language.needs_audio() || source_audio.is_some(),
            audio_base64: source_audio
                .filter(|_| wants_audio(source_language))
                .map(|bytes| STANDARD.encode(bytes))
                .unwrap_or_default(),
        },
    );

    for row in translations {
        if row.language_key == source_language {
            continue;
        }
        let lang = row.language_key;
        let reflections = normalize_reflections(&row.reflections);
        let questions = normalize_questions(&row.questions);

        let audio_base64 = if lang.render_mode() == RenderMode::Audio && wants_audio(lang) {
            STANDARD.encode(&row.audio)
        } else {
            String::new()
        };

        payload.insert(
            lang,
            LocalizedView {
                title: non_empty_or(&row.title_text, &report.title),
                script_final: non_empty_or(&row.script_text, &report.script_final),
                highlights_final: normalize_highlights(&row.highlights),
                reflections_final: if reflections.is_empty() {
                    normalize_reflections(&report.reflections)
                } else {
                    reflections
                },
                questions_final: if questions.is_empty() {
                    normalize_questions(&report.questions)
                } else {
                    questions
                },
                question_persona: row.question_persona,
                render_mode: lang.render_mode(),
                audio_ready: row.audio_ready(),
                audio_base64,
            },
        );
    }

    payload
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
