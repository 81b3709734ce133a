use crate::e2e::helpers;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use helpers::assertions::{assert_language_status, assert_report_response, string_list};
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use report_broadcast_backend::domain::language::LanguageKey;
use report_broadcast_backend::domain::report::ReportResponse;
use serde_json::json;
use std::sync::atomic::Ordering;
use test_context::test_context;

fn scripted_report_body() -> serde_json::Value {
    json!({
        "title": "周会",
        "summary_raw": "周一发布新产品，预算需要复核。",
        "speaker": "王总",
        "script_final": "周一发布新产品。",
        "highlights_final": ["发布新产品", "复核预算"],
        "reflections_final": ["建议A", "建议B"],
        "questions_final": ["谁负责？"]
    })
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_create_report_and_detect_source_language(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/reports", &scripted_report_body())
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let body = response.body();
    assert_report_response(body, "周会");
    assert_eq!(body["source_language"], "zh");
    assert_eq!(body["status"], "draft");
    assert_eq!(body["question_persona"], "board_director");
    assert_eq!(
        string_list(&body["reflections_final"]),
        vec!["建议A".to_string(), "建议B".to_string()]
    );

    // Reflection audio is queued by the refresh once translations exist
    assert_eq!(ctx.dispatcher.pending(), vec!["refresh_translations"]);
    assert_eq!(ctx.run_background().await, 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_schedule_work_for_report_without_script(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/reports",
            &json!({
                "title": "Weekly sync",
                "summary_raw": "We launch on Monday."
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.body()["source_language"], "en");
    assert!(ctx.dispatcher.pending().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_report_without_title(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/reports",
            &json!({
                "title": "   ",
                "summary_raw": "周一发布新产品。"
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("title is required");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_reports_newest_first_with_paging(ctx: &TestContext) {
    let now = Utc::now();
    ctx.fixtures
        .create_scripted_report_at("最早", now - Duration::days(2))
        .await
        .unwrap();
    ctx.fixtures
        .create_scripted_report_at("最新", now)
        .await
        .unwrap();
    ctx.fixtures
        .create_scripted_report_at("中间", now - Duration::days(1))
        .await
        .unwrap();

    let response = ctx
        .client
        .get("/api/reports?page=1&page_size=2")
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 2);
    let titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["最新", "中间"]);

    let response = ctx
        .client
        .get("/api/reports?page=2&page_size=2")
        .await
        .unwrap();
    let body = response.body();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["title"], "最早");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_filter_reports_by_status(ctx: &TestContext) {
    let draft = ctx.fixtures.create_scripted_report("草稿").await.unwrap();
    let published = ctx.fixtures.create_scripted_report("已发布").await.unwrap();
    ctx.fixtures.publish(&published).await.unwrap();

    let response = ctx
        .client
        .get("/api/reports?status=published")
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], published.id);
    assert_ne!(body["items"][0]["id"], draft.id);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_report_by_id(ctx: &TestContext) {
    let report = ctx.fixtures.create_scripted_report("周会").await.unwrap();

    let response = ctx
        .client
        .get(&format!("/api/reports/{}", report.id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let fetched: ReportResponse = response.json().unwrap();
    assert_eq!(fetched.id, report.id);
    assert_eq!(fetched.script_final, "周一发布新产品。");
    assert_eq!(fetched.highlights_final, vec!["发布新产品", "复核预算"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_missing_report(ctx: &TestContext) {
    let response = ctx.client.get("/api/reports/424242").await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_too_many_highlights(ctx: &TestContext) {
    let report = ctx.fixtures.create_scripted_report("周会").await.unwrap();

    let response = ctx
        .client
        .put(
            &format!("/api/reports/{}", report.id),
            &json!({ "highlights_final": ["一", "二", "三"] }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("highlights_final accepts at most 2 entries");

    let stored = ctx.fixtures.get_report(report.id).await.unwrap().unwrap();
    assert_eq!(stored.highlights_final, vec!["发布新产品", "复核预算"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_refresh_translations_when_script_changes(ctx: &TestContext) {
    let report = ctx.fixtures.create_scripted_report("周会").await.unwrap();

    let response = ctx
        .client
        .put(
            &format!("/api/reports/{}", report.id),
            &json!({ "script_final": "新的播报稿。" }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["script_final"], "新的播报稿。");
    assert_eq!(ctx.dispatcher.pending(), vec!["refresh_translations"]);

    let jobs = ctx
        .client
        .get(&format!("/api/reports/{}/translation-jobs", report.id))
        .await
        .unwrap();
    assert_language_status(jobs.body(), "ja", "translating");

    ctx.run_background().await;

    let translations = ctx
        .client
        .get(&format!("/api/reports/{}/translations", report.id))
        .await
        .unwrap();
    translations.assert_status(StatusCode::OK);
    assert_language_status(translations.body(), "ja", "ready");
    assert_language_status(translations.body(), "en", "ready");

    let ja = ctx
        .fixtures
        .get_translation(report.id, LanguageKey::Ja)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ja.script_text, "[Japanese] 新的播报稿。");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_refresh_for_cosmetic_update(ctx: &TestContext) {
    let report = ctx.fixtures.create_scripted_report("周会").await.unwrap();

    let response = ctx
        .client
        .put(
            &format!("/api/reports/{}", report.id),
            &json!({ "speaker": "李总", "auto_play_enabled": true }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["speaker"], "李总");
    assert_eq!(response.body()["auto_play_enabled"], true);
    assert!(ctx.dispatcher.pending().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_delete_report_with_its_translations(ctx: &TestContext) {
    let report = ctx.fixtures.create_scripted_report("周会").await.unwrap();
    ctx.client
        .post_empty(&format!("/api/reports/{}/translations/ja/prepare", report.id))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
    assert_eq!(ctx.fixtures.translation_count(report.id).await.unwrap(), 1);

    let response = ctx
        .client
        .delete(&format!("/api/reports/{}", report.id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body(),
        &json!({ "ok": true, "deleted_id": report.id })
    );

    assert_eq!(ctx.fixtures.translation_count(report.id).await.unwrap(), 0);
    ctx.client
        .get(&format!("/api/reports/{}", report.id))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
    ctx.client
        .delete(&format!("/api/reports/{}", report.id))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_content_from_summary(ctx: &TestContext) {
    let report = ctx.fixtures.create_draft_report("周会").await.unwrap();

    let response = ctx
        .client
        .post_empty(&format!("/api/reports/{}/generate", report.id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["report_id"], report.id);
    assert_eq!(body["script_draft"], "播报：周一发布新产品，预算需要复核。");
    assert_eq!(body["highlights_draft"].as_array().unwrap().len(), 2);
    assert_eq!(body["reflections_draft"].as_array().unwrap().len(), 3);
    assert_eq!(
        string_list(&body["questions_draft"]),
        vec!["下一步谁负责？".to_string()]
    );
    assert_eq!(ctx.llm.package_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.dispatcher.pending(), vec!["refresh_translations"]);

    let stored = ctx.fixtures.get_report(report.id).await.unwrap().unwrap();
    assert_eq!(stored.script_final, stored.script_draft);
    assert_eq!(stored.highlights_final, stored.highlights_draft);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_publish_only_complete_reports(ctx: &TestContext) {
    let mut body = scripted_report_body();
    body["speaker"] = json!("");
    let created = ctx.client.post("/api/reports", &body).await.unwrap();
    let report_id = created.body()["id"].as_i64().unwrap();

    ctx.client
        .post_empty(&format!("/api/reports/{}/publish", report_id))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("speaker is empty");

    ctx.client
        .put(
            &format!("/api/reports/{}", report_id),
            &json!({ "speaker": "王总" }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post_empty(&format!("/api/reports/{}/publish", report_id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["status"], "published");
    assert!(response.body()["published_at"].is_string());

    let latest = ctx
        .client
        .get("/api/reports/latest-published")
        .await
        .unwrap();
    latest.assert_status(StatusCode::OK);
    assert_eq!(latest.body()["id"], report_id);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_when_nothing_is_published(ctx: &TestContext) {
    ctx.fixtures.create_scripted_report("草稿").await.unwrap();

    ctx.client
        .get("/api/reports/latest-published")
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("no published report");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_and_store_missing_questions(ctx: &TestContext) {
    let report = ctx.fixtures.create_draft_report("周会").await.unwrap();

    let response = ctx
        .client
        .get(&format!("/api/reports/{}/questions", report.id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body(),
        &json!({
            "report_id": report.id,
            "persona": "board_director",
            "questions": [{ "text": "board_director 关心的问题？" }]
        })
    );

    let stored = ctx.fixtures.get_report(report.id).await.unwrap().unwrap();
    assert_eq!(stored.questions, vec!["board_director 关心的问题？"]);

    // A different persona gets a fresh set that is not stored
    let response = ctx
        .client
        .get(&format!("/api/reports/{}/questions?persona=cfo", report.id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["persona"], "cfo");
    assert_eq!(response.body()["questions"][0]["text"], "cfo 关心的问题？");

    let stored = ctx.fixtures.get_report(report.id).await.unwrap().unwrap();
    assert_eq!(stored.questions, vec!["board_director 关心的问题？"]);
    assert_eq!(ctx.llm.question_calls.load(Ordering::SeqCst), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_translated_questions(ctx: &TestContext) {
    let report = ctx.fixtures.create_scripted_report("周会").await.unwrap();
    ctx.client
        .post_empty(&format!("/api/reports/{}/translations/ja/prepare", report.id))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .get(&format!("/api/reports/{}/questions?lang=ja", report.id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["questions"][0]["text"], "[Japanese] 谁负责？");

    let response = ctx
        .client
        .get(&format!("/api/reports/{}/questions", report.id))
        .await
        .unwrap();
    assert_eq!(response.body()["questions"][0]["text"], "谁负责？");
    assert_eq!(ctx.llm.question_calls.load(Ordering::SeqCst), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_serve_reflection_audio_after_background_synthesis(ctx: &TestContext) {
    let created = ctx
        .client
        .post("/api/reports", &scripted_report_body())
        .await
        .unwrap();
    let report_id = created.body()["id"].as_i64().unwrap();

    ctx.run_background().await;

    // Two reflections in each of the six narrated languages
    assert_eq!(ctx.fixtures.reflection_audio_count(report_id), 12);

    let response = ctx
        .client
        .get(&format!("/api/reports/{}/reflections?lang=ja", report_id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["language_key"], "ja");
    let reflections = body["reflections"].as_array().unwrap();
    assert_eq!(reflections.len(), 2);
    assert_eq!(reflections[0]["seq"], 1);
    assert_eq!(reflections[0]["text"], "[Japanese] 建议A");
    let audio = STANDARD
        .decode(reflections[0]["audio_base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(String::from_utf8(audio).unwrap(), "ja:[Japanese] 建议A");

    // The source language is shown as text
    let response = ctx
        .client
        .get(&format!("/api/reports/{}/reflections", report_id))
        .await
        .unwrap();
    let body = response.body();
    assert_eq!(body["language_key"], "zh");
    assert_eq!(body["reflections"][1]["text"], "建议B");
    assert!(body["reflections"][1]["audio_base64"].is_null());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_hide_stale_reflection_audio(ctx: &TestContext) {
    let created = ctx
        .client
        .post("/api/reports", &scripted_report_body())
        .await
        .unwrap();
    let report_id = created.body()["id"].as_i64().unwrap();
    ctx.run_background().await;

    ctx.client
        .put(
            &format!("/api/reports/{}/translations/ja", report_id),
            &json!({ "reflections_final": ["新建议A", "[Japanese] 建议B"] }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    // The edited reflection has no audio until the queued pass runs
    let response = ctx
        .client
        .get(&format!("/api/reports/{}/reflections?lang=ja", report_id))
        .await
        .unwrap();
    let reflections = response.body()["reflections"].as_array().unwrap().clone();
    assert!(reflections[0]["audio_base64"].is_null());
    assert!(reflections[1]["audio_base64"].is_string());

    assert_eq!(ctx.dispatcher.pending(), vec!["reflection_audio"]);
    let calls_before = ctx.tts.call_count();
    ctx.run_background().await;
    assert_eq!(ctx.tts.call_count(), calls_before + 1);

    let response = ctx
        .client
        .get(&format!("/api/reports/{}/reflections?lang=ja", report_id))
        .await
        .unwrap();
    assert!(response.body()["reflections"][0]["audio_base64"].is_string());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_language_for_reflections(ctx: &TestContext) {
    let report = ctx.fixtures.create_scripted_report("周会").await.unwrap();

    ctx.client
        .get(&format!("/api/reports/{}/reflections?lang=fr", report.id))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST);
}
