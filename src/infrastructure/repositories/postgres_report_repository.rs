use super::report_repository::{ReportListFilter, ReportRepository};
use crate::domain::report::{NewReport, Report};
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;

pub struct PostgresReportRepository {
    pool: Arc<DbPool>,
}

impl PostgresReportRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PostgresReportRepository {
    async fn list(&self, filter: &ReportListFilter) -> AppResult<(Vec<Report>, i64)> {
        let pool = self.pool.as_ref();

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM reports
            WHERE ($1::text IS NULL OR status = $1)
            "#,
        )
        .bind(filter.status)
        .fetch_one(pool)
        .await?;

        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT *
            FROM reports
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY meeting_time DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.status)
        .bind(i64::from(filter.page_size))
        .bind(filter.offset())
        .fetch_all(pool)
        .await?;

        Ok((reports, total))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Report>> {
        let pool = self.pool.as_ref();
        let report = sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(report)
    }

    async fn find_latest_published(&self) -> AppResult<Option<Report>> {
        let pool = self.pool.as_ref();
        let report = sqlx::query_as::<_, Report>(
            r#"
            SELECT *
            FROM reports
            WHERE status = 'published'
            ORDER BY published_at DESC NULLS LAST, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(pool)
        .await?;

        Ok(report)
    }

    async fn find_by_source(
        &self,
        source_type: &str,
        source_meeting_id: &str,
    ) -> AppResult<Option<Report>> {
        let pool = self.pool.as_ref();
        let report = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE source_type = $1 AND source_meeting_id = $2",
        )
        .bind(source_type)
        .bind(source_meeting_id)
        .fetch_optional(pool)
        .await?;

        Ok(report)
    }

    async fn list_auto_play(&self) -> AppResult<Vec<Report>> {
        let pool = self.pool.as_ref();
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT *
            FROM reports
            WHERE auto_play_enabled = TRUE
            ORDER BY meeting_time DESC, id DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(reports)
    }

    async fn insert(&self, report: NewReport) -> AppResult<Report> {
        let pool = self.pool.as_ref();
        let stored = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (
                title, summary_raw, source_language, speaker, meeting_time,
                script_final, highlights_final, reflections, questions,
                question_persona, auto_play_enabled,
                source_type, source_meeting_id, source_meeting_no, source_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(&report.title)
        .bind(&report.summary_raw)
        .bind(report.source_language)
        .bind(&report.speaker)
        .bind(report.meeting_time)
        .bind(&report.script_final)
        .bind(&report.highlights_final)
        .bind(&report.reflections)
        .bind(&report.questions)
        .bind(report.question_persona)
        .bind(report.auto_play_enabled)
        .bind(&report.source_type)
        .bind(&report.source_meeting_id)
        .bind(&report.source_meeting_no)
        .bind(&report.source_url)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("Report for this meeting already exists".to_string());
                }
            }
            AppError::from(e)
        })?;

        Ok(stored)
    }

    async fn update(&self, report: &Report) -> AppResult<Report> {
        let pool = self.pool.as_ref();
        let stored = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
            SET title = $2,
                summary_raw = $3,
                source_language = $4,
                speaker = $5,
                meeting_time = $6,
                script_draft = $7,
                script_final = $8,
                highlights_draft = $9,
                highlights_final = $10,
                reflections = $11,
                questions = $12,
                question_persona = $13,
                status = $14,
                auto_play_enabled = $15,
                source_type = $16,
                source_meeting_id = $17,
                source_meeting_no = $18,
                source_url = $19,
                published_at = $20,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(report.id)
        .bind(&report.title)
        .bind(&report.summary_raw)
        .bind(report.source_language)
        .bind(&report.speaker)
        .bind(report.meeting_time)
        .bind(&report.script_draft)
        .bind(&report.script_final)
        .bind(&report.highlights_draft)
        .bind(&report.highlights_final)
        .bind(&report.reflections)
        .bind(&report.questions)
        .bind(report.question_persona)
        .bind(report.status)
        .bind(report.auto_play_enabled)
        .bind(&report.source_type)
        .bind(&report.source_meeting_id)
        .bind(&report.source_meeting_no)
        .bind(&report.source_url)
        .bind(report.published_at)
        .fetch_optional(pool)
        .await?;

        stored.ok_or_else(|| AppError::NotFound(format!("Report {} not found", report.id)))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").fetch_one(self.pool.as_ref()).await?;
        Ok(())
    }
}
