use crate::e2e::helpers;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_queue_only_playable_reports_newest_first(ctx: &TestContext) {
    let older = ctx.fixtures.create_playable_report("上周例会", 48).await.unwrap();
    let newer = ctx.fixtures.create_playable_report("本周例会", 2).await.unwrap();
    ctx.fixtures.create_scripted_report("未开启播放").await.unwrap();

    // Auto-play without a script is not playable yet
    let draft = ctx.fixtures.create_draft_report("无播报稿").await.unwrap();
    ctx.client
        .put(
            &format!("/api/reports/{}", draft.id),
            &json!({ "auto_play_enabled": true }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.get("/api/playback/queue").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["total"], 2);
    let ids: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let first = &body["items"][0];
    assert_eq!(first["source_language"], "zh");
    assert_eq!(first["script_final"], "周一发布新产品。");
    assert_eq!(first["localized"]["zh"]["render_mode"], "text");
    assert_eq!(first["localized"]["zh"]["title"], "本周例会");
    // No translations prepared yet, so only the source view is present
    assert_eq!(first["localized"].as_object().unwrap().len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_audio_only_for_requested_languages(ctx: &TestContext) {
    let report = ctx.fixtures.create_playable_report("本周例会", 1).await.unwrap();
    for language in ["ja", "yue", "en"] {
        ctx.client
            .post_empty(&format!(
                "/api/reports/{}/translations/{}/prepare",
                report.id, language
            ))
            .await
            .unwrap()
            .assert_status(StatusCode::OK);
    }

    let response = ctx
        .client
        .get("/api/playback/queue?include_audio=true&langs=ja")
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let localized = &response.body()["items"][0]["localized"];
    let ja_audio = STANDARD
        .decode(localized["ja"]["audio_base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(
        String::from_utf8(ja_audio).unwrap(),
        "ja:[Japanese] 周一发布新产品。"
    );
    assert_eq!(localized["ja"]["audio_ready"], true);
    assert_eq!(localized["yue"]["audio_base64"], "");
    assert_eq!(localized["yue"]["audio_ready"], true);
    assert_eq!(localized["en"]["render_mode"], "text");
    assert_eq!(localized["en"]["script_final"], "[English] 周一发布新产品。");

    let response = ctx.client.get("/api/playback/queue").await.unwrap();
    let localized = &response.body()["items"][0]["localized"];
    assert_eq!(localized["ja"]["audio_base64"], "");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_filter_queue_by_report(ctx: &TestContext) {
    let first = ctx.fixtures.create_playable_report("第一场", 3).await.unwrap();
    ctx.fixtures.create_playable_report("第二场", 1).await.unwrap();

    let response = ctx
        .client
        .get(&format!("/api/playback/queue?report_id={}", first.id))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], first.id);
    assert_eq!(body["items"][0]["title"], "第一场");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_empty_queue(ctx: &TestContext) {
    let response = ctx.client.get("/api/playback/queue").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body(), &json!({ "items": [], "total": 0 }));
}
