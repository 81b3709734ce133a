use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use super::error::ImportServiceError;
use super::{
    ImportMeetingsRequest, ImportMeetingsResponse, ImportRow, ImportRowError, ImportRowsResponse,
    RawMeetingItem,
};
use crate::domain::language::detect_source_language;
use crate::domain::report::NewReport;
use crate::domain::translation::TranslationScheduler;
use crate::error::AppError;
use crate::infrastructure::repositories::{MeetingSourceRepository, ReportRepository};

const MEETING_SOURCE_TYPE: &str = "meeting";
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

pub struct ImportService {
    report_repo: Arc<dyn ReportRepository>,
    meeting_source: Arc<dyn MeetingSourceRepository>,
    scheduler: Arc<TranslationScheduler>,
}

impl ImportService {
    pub fn new(
        report_repo: Arc<dyn ReportRepository>,
        meeting_source: Arc<dyn MeetingSourceRepository>,
        scheduler: Arc<TranslationScheduler>,
    ) -> Self {
        Self {
            report_repo,
            meeting_source,
            scheduler,
        }
    }
}

#[async_trait]
pub trait ImportServiceApi: Send + Sync {
    /// Create one report per row; a bad row never stops the others
    async fn import_rows(
        &self,
        rows: Vec<ImportRow>,
    ) -> Result<ImportRowsResponse, ImportServiceError>;

    /// Create or refresh reports from the meeting source
    async fn import_meetings(
        &self,
        request: ImportMeetingsRequest,
    ) -> Result<ImportMeetingsResponse, ImportServiceError>;
}

impl ImportService {
    async fn import_row(&self, row: &ImportRow) -> Result<i64, String> {
        let title = row.title.trim();
        let speaker = row.speaker.trim();
        let summary = row.summary_raw.trim();
        if title.is_empty() {
            return Err("title is required".to_string());
        }
        if speaker.is_empty() {
            return Err("speaker is required".to_string());
        }
        if summary.is_empty() {
            return Err("summary_raw is required".to_string());
        }

        let meeting_time = match row.meeting_time.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_meeting_time(raw)?,
            _ => Utc::now(),
        };

        let mut new = NewReport::new(title, summary, meeting_time);
        new.speaker = speaker.to_string();
        new.source_language = Some(detect_source_language(title, summary, ""));

        self.report_repo
            .insert(new)
            .await
            .map(|report| report.id)
            .map_err(|e| e.to_string())
    }

    async fn upsert_meeting(
        &self,
        item: &RawMeetingItem,
        source_url: &str,
        auto_enable_playback: bool,
    ) -> Result<MeetingUpsert, ImportServiceError> {
        let summary = item.report_summary();
        let title = item.report_title();
        let minute_url = match item.minute_url.trim() {
            "" => source_url.to_string(),
            url => url.to_string(),
        };

        let existing = self
            .report_repo
            .find_by_source(MEETING_SOURCE_TYPE, &item.meeting_id)
            .await?;

        match existing {
            Some(mut report) => {
                report.title = title;
                report.summary_raw = summary;
                if let Some(start_time) = item.start_time {
                    report.meeting_time = start_time;
                }
                report.source_meeting_no = Some(item.meeting_no.clone());
                report.source_url = Some(minute_url);
                if auto_enable_playback {
                    report.auto_play_enabled = true;
                }
                let report = self.report_repo.update(&report).await?;
                if report.has_script() {
                    self.scheduler.schedule_refresh(&report);
                }
                Ok(MeetingUpsert::Updated(report.id))
            }
            None => {
                let mut new = NewReport::new(
                    &title,
                    &summary,
                    item.start_time.unwrap_or_else(Utc::now),
                );
                new.source_language = Some(detect_source_language(&title, &summary, ""));
                new.auto_play_enabled = auto_enable_playback;
                new.source_type = Some(MEETING_SOURCE_TYPE.to_string());
                new.source_meeting_id = Some(item.meeting_id.clone());
                new.source_meeting_no = Some(item.meeting_no.clone());
                new.source_url = Some(minute_url);

                match self.report_repo.insert(new).await {
                    Ok(report) => Ok(MeetingUpsert::Created(report.id)),
                    Err(AppError::Conflict(msg)) => {
                        tracing::warn!(
                            meeting_id = %item.meeting_id,
                            error = %msg,
                            "Meeting imported concurrently, skipping"
                        );
                        Ok(MeetingUpsert::Skipped)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}

enum MeetingUpsert {
    Created(i64),
    Updated(i64),
    Skipped,
}

/// RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (either separator) or a bare date; naive values are UTC
fn parse_meeting_time(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
        .ok_or_else(|| format!("invalid meeting_time: {}", raw))
}

#[async_trait]
impl ImportServiceApi for ImportService {
    async fn import_rows(
        &self,
        rows: Vec<ImportRow>,
    ) -> Result<ImportRowsResponse, ImportServiceError> {
        if rows.is_empty() {
            return Err(ImportServiceError::Invalid("no rows to import".to_string()));
        }

        let mut response = ImportRowsResponse::default();
        for (index, row) in rows.iter().enumerate() {
            match self.import_row(row).await {
                Ok(_) => response.success_count += 1,
                Err(message) => {
                    response.failed_count += 1;
                    response.errors.push(ImportRowError {
                        row: index + 1,
                        message,
                    });
                }
            }
        }

        tracing::info!(
            success_count = response.success_count,
            failed_count = response.failed_count,
            "Rows imported"
        );
        Ok(response)
    }

    async fn import_meetings(
        &self,
        request: ImportMeetingsRequest,
    ) -> Result<ImportMeetingsResponse, ImportServiceError> {
        let url = request.url.trim();
        if url.is_empty() {
            return Err(ImportServiceError::Invalid("url is required".to_string()));
        }

        let items = self
            .meeting_source
            .fetch_meeting_items(url, request.lookback_days)
            .await?;

        let mut seen = HashSet::new();
        let mut response = ImportMeetingsResponse::default();
        for item in &items {
            if !seen.insert(item.meeting_id.clone()) {
                continue;
            }
            if item.meeting_id.trim().is_empty() || item.report_summary().is_empty() {
                response.skipped += 1;
                continue;
            }

            match self
                .upsert_meeting(item, url, request.auto_enable_playback)
                .await?
            {
                MeetingUpsert::Created(id) => {
                    response.created += 1;
                    response.report_ids.push(id);
                }
                MeetingUpsert::Updated(id) => {
                    response.updated += 1;
                    response.report_ids.push(id);
                }
                MeetingUpsert::Skipped => response.skipped += 1,
            }
        }

        tracing::info!(
            url = %url,
            fetched = items.len(),
            created = response.created,
            updated = response.updated,
            skipped = response.skipped,
            "Meetings imported"
        );
        Ok(response)
    }
}
