use crate::domain::report::{NewReport, Report, ReportStatus};
use crate::error::AppResult;
use async_trait::async_trait;

/// Filter and page for listing reports
#[derive(Debug, Clone)]
pub struct ReportListFilter {
    pub status: Option<ReportStatus>,
    pub page: u32,
    pub page_size: u32,
}

impl ReportListFilter {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

/// Durable storage of reports.
///
/// Deleting a report removes its translations and reflection audio as well.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Page of reports, newest meeting first, with the total match count
    async fn list(&self, filter: &ReportListFilter) -> AppResult<(Vec<Report>, i64)>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Report>>;

    async fn find_latest_published(&self) -> AppResult<Option<Report>>;

    async fn find_by_source(
        &self,
        source_type: &str,
        source_meeting_id: &str,
    ) -> AppResult<Option<Report>>;

    /// Reports with auto-play enabled, newest meeting first
    async fn list_auto_play(&self) -> AppResult<Vec<Report>>;

    async fn insert(&self, report: NewReport) -> AppResult<Report>;

    /// Overwrite every mutable column and bump `updated_at`
    async fn update(&self, report: &Report) -> AppResult<Report>;

    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> AppResult<()>;
}
