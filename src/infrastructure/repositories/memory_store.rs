use super::reflection_audio_repository::ReflectionAudioRepository;
use super::report_repository::{ReportListFilter, ReportRepository};
use super::translation_repository::TranslationRepository;
use crate::domain::language::LanguageKey;
use crate::domain::report::{NewReport, Report, ReportStatus};
use crate::domain::translation::{ReflectionAudio, Translation, TranslationFields};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
struct Tables {
    next_id: i64,
    reports: BTreeMap<i64, Report>,
    translations: HashMap<(i64, LanguageKey), Translation>,
    reflection_audio: HashMap<(i64, i32, LanguageKey), ReflectionAudio>,
}

/// Process-local storage backend implementing every store trait.
///
/// Selected with `STORAGE_BACKEND=memory` and used by the test-suite.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a report under its own id, replacing any existing one
    pub fn put_report(&self, report: Report) {
        let mut tables = self.tables.write();
        tables.next_id = tables.next_id.max(report.id);
        tables.reports.insert(report.id, report);
    }

    pub fn reflection_audio_count(&self, report_id: i64) -> usize {
        self.tables
            .read()
            .reflection_audio
            .keys()
            .filter(|(id, _, _)| *id == report_id)
            .count()
    }
}

fn newest_first(a: &Report, b: &Report) -> std::cmp::Ordering {
    b.meeting_time
        .cmp(&a.meeting_time)
        .then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn list(&self, filter: &ReportListFilter) -> AppResult<(Vec<Report>, i64)> {
        let tables = self.tables.read();
        let mut matching: Vec<Report> = tables
            .reports
            .values()
            .filter(|r| filter.status.map_or(true, |status| r.status == status))
            .cloned()
            .collect();
        matching.sort_by(newest_first);

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size as usize)
            .collect();

        Ok((page, total))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Report>> {
        Ok(self.tables.read().reports.get(&id).cloned())
    }

    async fn find_latest_published(&self) -> AppResult<Option<Report>> {
        let tables = self.tables.read();
        let latest = tables
            .reports
            .values()
            .filter(|r| r.status == ReportStatus::Published)
            .max_by(|a, b| a.published_at.cmp(&b.published_at).then(a.id.cmp(&b.id)))
            .cloned();
        Ok(latest)
    }

    async fn find_by_source(
        &self,
        source_type: &str,
        source_meeting_id: &str,
    ) -> AppResult<Option<Report>> {
        let tables = self.tables.read();
        let found = tables
            .reports
            .values()
            .find(|r| {
                r.source_type.as_deref() == Some(source_type)
                    && r.source_meeting_id.as_deref() == Some(source_meeting_id)
            })
            .cloned();
        Ok(found)
    }

    async fn list_auto_play(&self) -> AppResult<Vec<Report>> {
        let tables = self.tables.read();
        let mut reports: Vec<Report> = tables
            .reports
            .values()
            .filter(|r| r.auto_play_enabled)
            .cloned()
            .collect();
        reports.sort_by(newest_first);
        Ok(reports)
    }

    async fn insert(&self, report: NewReport) -> AppResult<Report> {
        let mut tables = self.tables.write();

        if let (Some(source_type), Some(meeting_id)) =
            (&report.source_type, &report.source_meeting_id)
        {
            let duplicate = tables.reports.values().any(|r| {
                r.source_type.as_ref() == Some(source_type)
                    && r.source_meeting_id.as_ref() == Some(meeting_id)
            });
            if duplicate {
                return Err(AppError::Conflict(
                    "Report for this meeting already exists".to_string(),
                ));
            }
        }

        tables.next_id += 1;
        let stored = report.into_report(tables.next_id, Utc::now());
        tables.reports.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, report: &Report) -> AppResult<Report> {
        let mut tables = self.tables.write();
        let slot = tables
            .reports
            .get_mut(&report.id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report.id)))?;

        let mut stored = report.clone();
        stored.created_at = slot.created_at;
        stored.updated_at = Utc::now();
        *slot = stored.clone();
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write();
        let removed = tables.reports.remove(&id).is_some();
        if removed {
            tables.translations.retain(|(report_id, _), _| *report_id != id);
            tables
                .reflection_audio
                .retain(|(report_id, _, _), _| *report_id != id);
        }
        Ok(removed)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TranslationRepository for MemoryStore {
    async fn get(&self, report_id: i64, language: LanguageKey) -> AppResult<Option<Translation>> {
        Ok(self
            .tables
            .read()
            .translations
            .get(&(report_id, language))
            .cloned())
    }

    async fn upsert(
        &self,
        report_id: i64,
        language: LanguageKey,
        fields: TranslationFields,
    ) -> AppResult<Translation> {
        let mut tables = self.tables.write();
        if !tables.reports.contains_key(&report_id) {
            return Err(AppError::NotFound(format!("Report {} not found", report_id)));
        }

        let row = Translation {
            report_id,
            language_key: language,
            title_text: fields.title_text,
            script_text: fields.script_text,
            highlights: fields.highlights,
            reflections: fields.reflections,
            questions: fields.questions,
            question_persona: fields.question_persona,
            audio: fields.audio,
            reviewed: fields.reviewed,
            reviewed_at: fields.reviewed_at,
            updated_at: Utc::now(),
        };
        tables.translations.insert((report_id, language), row.clone());
        Ok(row)
    }

    async fn list_by_report(&self, report_id: i64) -> AppResult<Vec<Translation>> {
        let tables = self.tables.read();
        let mut rows: Vec<Translation> = tables
            .translations
            .values()
            .filter(|t| t.report_id == report_id)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.language_key);
        Ok(rows)
    }

    async fn reset_review_flag(&self, report_id: i64, language: LanguageKey) -> AppResult<()> {
        if let Some(row) = self
            .tables
            .write()
            .translations
            .get_mut(&(report_id, language))
        {
            row.reviewed = false;
            row.reviewed_at = None;
        }
        Ok(())
    }
}

#[async_trait]
impl ReflectionAudioRepository for MemoryStore {
    async fn get_valid(
        &self,
        report_id: i64,
        seq: i32,
        language: LanguageKey,
        current_hash: &str,
    ) -> AppResult<Option<Vec<u8>>> {
        let tables = self.tables.read();
        let audio = tables
            .reflection_audio
            .get(&(report_id, seq, language))
            .filter(|entry| entry.text_hash == current_hash && !entry.audio.is_empty())
            .map(|entry| entry.audio.clone());
        Ok(audio)
    }

    async fn upsert(
        &self,
        report_id: i64,
        seq: i32,
        language: LanguageKey,
        text_hash: &str,
        audio: &[u8],
    ) -> AppResult<()> {
        let mut tables = self.tables.write();
        if !tables.reports.contains_key(&report_id) {
            return Err(AppError::NotFound(format!("Report {} not found", report_id)));
        }

        let now = Utc::now();
        tables
            .reflection_audio
            .entry((report_id, seq, language))
            .and_modify(|entry| {
                entry.text_hash = text_hash.to_string();
                entry.audio = audio.to_vec();
                entry.updated_at = now;
            })
            .or_insert_with(|| ReflectionAudio {
                report_id,
                seq,
                language_key: language,
                text_hash: text_hash.to_string(),
                audio: audio.to_vec(),
                created_at: now,
                updated_at: now,
            });
        Ok(())
    }
}
