use crate::domain::language::LanguageKey;
use crate::error::AppResult;
use async_trait::async_trait;

/// Synthesized narration per (report, reflection, language), keyed by content hash
#[async_trait]
pub trait ReflectionAudioRepository: Send + Sync {
    /// Cached audio, only if it was synthesized from text hashing to `current_hash`.
    ///
    /// A stored row with a different hash is stale and reported as absent.
    async fn get_valid(
        &self,
        report_id: i64,
        seq: i32,
        language: LanguageKey,
        current_hash: &str,
    ) -> AppResult<Option<Vec<u8>>>;

    async fn upsert(
        &self,
        report_id: i64,
        seq: i32,
        language: LanguageKey,
        text_hash: &str,
        audio: &[u8],
    ) -> AppResult<()>;
}
