use crate::domain::language::LanguageKey;
use crate::domain::translation::{Translation, TranslationFields};
use crate::error::AppResult;
use async_trait::async_trait;

/// Durable per-(report, language) translation rows.
///
/// At most one row exists per pair; `upsert` overwrites it in place.
#[async_trait]
pub trait TranslationRepository: Send + Sync {
    async fn get(&self, report_id: i64, language: LanguageKey) -> AppResult<Option<Translation>>;

    /// Insert or overwrite the row and refresh its `updated_at`
    async fn upsert(
        &self,
        report_id: i64,
        language: LanguageKey,
        fields: TranslationFields,
    ) -> AppResult<Translation>;

    async fn list_by_report(&self, report_id: i64) -> AppResult<Vec<Translation>>;

    /// Clear `reviewed` and `reviewed_at`; a missing row is not an error
    async fn reset_review_flag(&self, report_id: i64, language: LanguageKey) -> AppResult<()>;
}
