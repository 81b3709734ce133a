use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use report_broadcast_backend::domain::language::LanguageKey;
use report_broadcast_backend::domain::report::{NewReport, Report, ReportStatus};
use report_broadcast_backend::domain::translation::Translation;
use report_broadcast_backend::infrastructure::repositories::{
    MemoryStore, ReportRepository, TranslationRepository,
};
use std::sync::Arc;

pub struct TestFixtures {
    store: Arc<MemoryStore>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl TestFixtures {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Chinese report with summary only, nothing generated yet
    pub async fn create_draft_report(&self, title: &str) -> Result<Report> {
        let mut new = NewReport::new(title, "周一发布新产品，预算需要复核。", Utc::now());
        new.source_language = Some(LanguageKey::Zh);
        new.speaker = "王总".to_string();
        Ok(self.store.insert(new).await?)
    }

    /// Chinese report with a final script, highlights, reflections and questions
    pub async fn create_scripted_report(&self, title: &str) -> Result<Report> {
        self.create_scripted_report_at(title, Utc::now()).await
    }

    pub async fn create_scripted_report_at(
        &self,
        title: &str,
        meeting_time: DateTime<Utc>,
    ) -> Result<Report> {
        let mut new = NewReport::new(title, "周一发布新产品，预算需要复核。", meeting_time);
        new.source_language = Some(LanguageKey::Zh);
        new.speaker = "王总".to_string();
        new.script_final = "周一发布新产品。".to_string();
        new.highlights_final = strings(&["发布新产品", "复核预算"]);
        new.reflections = strings(&["建议A", "建议B"]);
        new.questions = strings(&["谁负责？"]);
        Ok(self.store.insert(new).await?)
    }

    /// Scripted report that shows up in the playback queue
    pub async fn create_playable_report(
        &self,
        title: &str,
        hours_ago: i64,
    ) -> Result<Report> {
        let mut report = self
            .create_scripted_report_at(title, Utc::now() - Duration::hours(hours_ago))
            .await?;
        report.auto_play_enabled = true;
        Ok(self.store.update(&report).await?)
    }

    pub async fn publish(&self, report: &Report) -> Result<Report> {
        let mut report = report.clone();
        report.status = ReportStatus::Published;
        report.published_at = Some(Utc::now());
        Ok(self.store.update(&report).await?)
    }

    pub async fn get_report(&self, report_id: i64) -> Result<Option<Report>> {
        Ok(self.store.find_by_id(report_id).await?)
    }

    pub async fn get_translation(
        &self,
        report_id: i64,
        language: LanguageKey,
    ) -> Result<Option<Translation>> {
        Ok(self.store.get(report_id, language).await?)
    }

    pub async fn translation_count(&self, report_id: i64) -> Result<usize> {
        Ok(self.store.list_by_report(report_id).await?.len())
    }

    pub fn reflection_audio_count(&self, report_id: i64) -> usize {
        self.store.reflection_audio_count(report_id)
    }
}
