use crate::e2e::helpers;

use chrono::{Duration, Utc};
use helpers::PostgresContext;
use pretty_assertions::assert_eq;
use report_broadcast_backend::domain::language::LanguageKey;
use report_broadcast_backend::domain::report::{NewReport, QuestionPersona, ReportStatus};
use report_broadcast_backend::domain::translation::TranslationFields;
use report_broadcast_backend::error::AppError;
use report_broadcast_backend::infrastructure::repositories::{
    ReflectionAudioRepository, ReportListFilter, ReportRepository, TranslationRepository,
};
use test_context::test_context;

fn new_report(title: &str, hours_ago: i64) -> NewReport {
    let mut report = NewReport::new(title, "周一发布新产品。", Utc::now() - Duration::hours(hours_ago));
    report.source_language = Some(LanguageKey::Zh);
    report.speaker = "王总".to_string();
    report.script_final = "周一发布新产品。".to_string();
    report.highlights_final = vec!["发布新产品".to_string()];
    report.reflections = vec!["建议A".to_string(), "建议B".to_string()];
    report
}

#[test_context(PostgresContext)]
#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn it_should_store_and_page_reports(ctx: &PostgresContext) {
    for (title, hours_ago) in [("oldest", 30), ("newest", 1), ("middle", 10)] {
        ctx.reports.insert(new_report(title, hours_ago)).await.unwrap();
    }

    let (page, total) = ctx
        .reports
        .list(&ReportListFilter {
            status: None,
            page: 1,
            page_size: 2,
        })
        .await
        .unwrap();
    assert_eq!(total, 3);
    let titles: Vec<&str> = page.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["newest", "middle"]);

    let stored = &page[0];
    assert_eq!(stored.source_language, Some(LanguageKey::Zh));
    assert_eq!(stored.reflections, vec!["建议A", "建议B"]);
    assert_eq!(stored.question_persona, QuestionPersona::BoardDirector);
    assert_eq!(stored.status, ReportStatus::Draft);
}

#[test_context(PostgresContext)]
#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn it_should_find_latest_published_report(ctx: &PostgresContext) {
    assert!(ctx.reports.find_latest_published().await.unwrap().is_none());

    let mut report = ctx.reports.insert(new_report("周会", 1)).await.unwrap();
    report.status = ReportStatus::Published;
    report.published_at = Some(Utc::now());
    let updated = ctx.reports.update(&report).await.unwrap();
    assert!(updated.updated_at >= report.updated_at);

    let latest = ctx.reports.find_latest_published().await.unwrap().unwrap();
    assert_eq!(latest.id, report.id);
    assert_eq!(latest.status, ReportStatus::Published);
}

#[test_context(PostgresContext)]
#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn it_should_reject_duplicate_meeting_source(ctx: &PostgresContext) {
    let mut first = new_report("周会", 1);
    first.source_type = Some("meeting".to_string());
    first.source_meeting_id = Some("m-1".to_string());
    ctx.reports.insert(first.clone()).await.unwrap();

    let err = ctx.reports.insert(first).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let found = ctx
        .reports
        .find_by_source("meeting", "m-1")
        .await
        .unwrap();
    assert!(found.is_some());
}

#[test_context(PostgresContext)]
#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn it_should_overwrite_translation_row(ctx: &PostgresContext) {
    let report = ctx.reports.insert(new_report("周会", 1)).await.unwrap();

    for script in ["first", "second"] {
        let fields = TranslationFields {
            title_text: "Weekly".to_string(),
            script_text: script.to_string(),
            reflections: vec!["Idea".to_string()],
            audio: vec![1, 2, 3],
            reviewed: true,
            reviewed_at: Some(Utc::now()),
            ..Default::default()
        };
        ctx.translations
            .upsert(report.id, LanguageKey::Ja, fields)
            .await
            .unwrap();
    }

    let rows = ctx.translations.list_by_report(report.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].script_text, "second");
    assert_eq!(rows[0].audio, vec![1, 2, 3]);
    assert!(rows[0].reviewed);

    ctx.translations
        .reset_review_flag(report.id, LanguageKey::Ja)
        .await
        .unwrap();
    let row = ctx
        .translations
        .get(report.id, LanguageKey::Ja)
        .await
        .unwrap()
        .unwrap();
    assert!(!row.reviewed);
    assert!(row.reviewed_at.is_none());
}

#[test_context(PostgresContext)]
#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn it_should_hide_reflection_audio_with_stale_hash(ctx: &PostgresContext) {
    let report = ctx.reports.insert(new_report("周会", 1)).await.unwrap();

    ctx.reflection_audio
        .upsert(report.id, 1, LanguageKey::Th, "hash-a", b"audio-a")
        .await
        .unwrap();

    let cached = ctx
        .reflection_audio
        .get_valid(report.id, 1, LanguageKey::Th, "hash-a")
        .await
        .unwrap();
    assert_eq!(cached, Some(b"audio-a".to_vec()));
    assert!(ctx
        .reflection_audio
        .get_valid(report.id, 1, LanguageKey::Th, "hash-b")
        .await
        .unwrap()
        .is_none());

    ctx.reflection_audio
        .upsert(report.id, 1, LanguageKey::Th, "hash-b", b"audio-b")
        .await
        .unwrap();
    assert_eq!(
        ctx.reflection_audio
            .get_valid(report.id, 1, LanguageKey::Th, "hash-b")
            .await
            .unwrap(),
        Some(b"audio-b".to_vec())
    );
}

#[test_context(PostgresContext)]
#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn it_should_cascade_report_deletion(ctx: &PostgresContext) {
    let report = ctx.reports.insert(new_report("周会", 1)).await.unwrap();
    ctx.translations
        .upsert(report.id, LanguageKey::En, TranslationFields::default())
        .await
        .unwrap();
    ctx.reflection_audio
        .upsert(report.id, 1, LanguageKey::Ja, "hash", b"audio")
        .await
        .unwrap();

    assert!(ctx.reports.delete(report.id).await.unwrap());
    assert!(ctx.reports.find_by_id(report.id).await.unwrap().is_none());
    assert!(ctx
        .translations
        .list_by_report(report.id)
        .await
        .unwrap()
        .is_empty());
    assert!(ctx
        .reflection_audio
        .get_valid(report.id, 1, LanguageKey::Ja, "hash")
        .await
        .unwrap()
        .is_none());
    assert!(!ctx.reports.delete(report.id).await.unwrap());
}
