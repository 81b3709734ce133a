use super::reflection_audio_repository::ReflectionAudioRepository;
use crate::domain::language::LanguageKey;
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;

pub struct PostgresReflectionAudioRepository {
    pool: Arc<DbPool>,
}

impl PostgresReflectionAudioRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReflectionAudioRepository for PostgresReflectionAudioRepository {
    async fn get_valid(
        &self,
        report_id: i64,
        seq: i32,
        language: LanguageKey,
        current_hash: &str,
    ) -> AppResult<Option<Vec<u8>>> {
        let pool = self.pool.as_ref();
        let audio = sqlx::query_scalar::<_, Vec<u8>>(
            r#"
            SELECT audio
            FROM report_reflection_audio
            WHERE report_id = $1 AND seq = $2 AND language_key = $3 AND text_hash = $4
            "#,
        )
        .bind(report_id)
        .bind(seq)
        .bind(language)
        .bind(current_hash)
        .fetch_optional(pool)
        .await?;

        Ok(audio.filter(|bytes| !bytes.is_empty()))
    }

    async fn upsert(
        &self,
        report_id: i64,
        seq: i32,
        language: LanguageKey,
        text_hash: &str,
        audio: &[u8],
    ) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            INSERT INTO report_reflection_audio (
                report_id, seq, language_key, text_hash, audio, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (report_id, seq, language_key)
            DO UPDATE SET
                text_hash = EXCLUDED.text_hash,
                audio = EXCLUDED.audio,
                updated_at = NOW()
            "#,
        )
        .bind(report_id)
        .bind(seq)
        .bind(language)
        .bind(text_hash)
        .bind(audio)
        .execute(pool)
        .await?;

        Ok(())
    }
}
