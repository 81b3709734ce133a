use super::translation_repository::TranslationRepository;
use crate::domain::language::LanguageKey;
use crate::domain::report::QuestionPersona;
use crate::domain::translation::{Translation, TranslationFields};
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::sync::Arc;

/// List columns are stored as JSON arrays
#[derive(Debug, FromRow)]
struct TranslationRow {
    report_id: i64,
    language_key: LanguageKey,
    title_text: String,
    script_text: String,
    highlights: Json<Vec<String>>,
    reflections: Json<Vec<String>>,
    questions: Json<Vec<String>>,
    question_persona: QuestionPersona,
    audio: Vec<u8>,
    reviewed: bool,
    reviewed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl From<TranslationRow> for Translation {
    fn from(row: TranslationRow) -> Self {
        Self {
            report_id: row.report_id,
            language_key: row.language_key,
            title_text: row.title_text,
            script_text: row.script_text,
            highlights: row.highlights.0,
            reflections: row.reflections.0,
            questions: row.questions.0,
            question_persona: row.question_persona,
            audio: row.audio,
            reviewed: row.reviewed,
            reviewed_at: row.reviewed_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PostgresTranslationRepository {
    pool: Arc<DbPool>,
}

impl PostgresTranslationRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranslationRepository for PostgresTranslationRepository {
    async fn get(&self, report_id: i64, language: LanguageKey) -> AppResult<Option<Translation>> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, TranslationRow>(
            r#"
            SELECT *
            FROM report_translations
            WHERE report_id = $1 AND language_key = $2
            "#,
        )
        .bind(report_id)
        .bind(language)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Translation::from))
    }

    async fn upsert(
        &self,
        report_id: i64,
        language: LanguageKey,
        fields: TranslationFields,
    ) -> AppResult<Translation> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, TranslationRow>(
            r#"
            INSERT INTO report_translations (
                report_id, language_key, title_text, script_text,
                highlights, reflections, questions, question_persona,
                audio, reviewed, reviewed_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
            ON CONFLICT (report_id, language_key)
            DO UPDATE SET
                title_text = EXCLUDED.title_text,
                script_text = EXCLUDED.script_text,
                highlights = EXCLUDED.highlights,
                reflections = EXCLUDED.reflections,
                questions = EXCLUDED.questions,
                question_persona = EXCLUDED.question_persona,
                audio = EXCLUDED.audio,
                reviewed = EXCLUDED.reviewed,
                reviewed_at = EXCLUDED.reviewed_at,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(report_id)
        .bind(language)
        .bind(&fields.title_text)
        .bind(&fields.script_text)
        .bind(Json(&fields.highlights))
        .bind(Json(&fields.reflections))
        .bind(Json(&fields.questions))
        .bind(fields.question_persona)
        .bind(&fields.audio)
        .bind(fields.reviewed)
        .bind(fields.reviewed_at)
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    async fn list_by_report(&self, report_id: i64) -> AppResult<Vec<Translation>> {
        let pool = self.pool.as_ref();
        let rows = sqlx::query_as::<_, TranslationRow>(
            r#"
            SELECT *
            FROM report_translations
            WHERE report_id = $1
            ORDER BY language_key
            "#,
        )
        .bind(report_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Translation::from).collect())
    }

    async fn reset_review_flag(&self, report_id: i64, language: LanguageKey) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            UPDATE report_translations
            SET reviewed = FALSE, reviewed_at = NULL
            WHERE report_id = $1 AND language_key = $2
            "#,
        )
        .bind(report_id)
        .bind(language)
        .execute(pool)
        .await?;

        Ok(())
    }
}
