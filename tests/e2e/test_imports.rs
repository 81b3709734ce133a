use crate::e2e::helpers;

use chrono::{TimeZone, Utc};
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use report_broadcast_backend::domain::import::RawMeetingItem;
use serde_json::json;
use std::sync::atomic::Ordering;
use test_context::test_context;

fn meeting(meeting_id: &str, topic: &str, summary: &str) -> RawMeetingItem {
    RawMeetingItem {
        meeting_id: meeting_id.to_string(),
        meeting_no: format!("no-{}", meeting_id),
        topic: topic.to_string(),
        start_time: Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()),
        summary: summary.to_string(),
        ..Default::default()
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_import_rows_and_report_bad_ones(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/imports/rows",
            &json!({
                "rows": [
                    {
                        "标题": "产品周会",
                        "发言人": "王总",
                        "总结原文": "周一发布新产品。",
                        "时间": "2026-03-02 09:30"
                    },
                    {
                        "title": "Budget review",
                        "speaker": "Alex",
                        "summary_raw": "Budget approved for Q3."
                    },
                    {
                        "title": "缺少发言人",
                        "summary_raw": "内容"
                    }
                ]
            }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["success_count"], 2);
    assert_eq!(body["failed_count"], 1);
    assert_eq!(
        body["errors"],
        json!([{ "row": 3, "message": "speaker is required" }])
    );

    let reports = ctx.client.get("/api/reports").await.unwrap();
    let items = reports.body()["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 2);

    let chinese = items
        .iter()
        .find(|item| item["title"] == "产品周会")
        .unwrap();
    assert_eq!(chinese["source_language"], "zh");
    assert_eq!(chinese["speaker"], "王总");
    assert_eq!(chinese["meeting_time"], "2026-03-02T09:30:00Z");

    let english = items
        .iter()
        .find(|item| item["title"] == "Budget review")
        .unwrap();
    assert_eq!(english["source_language"], "en");

    // Imported rows have no script yet, nothing to translate
    assert!(ctx.dispatcher.pending().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_row_import(ctx: &TestContext) {
    ctx.client
        .post("/api/imports/rows", &json!({ "rows": [] }))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("no rows to import");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_invalid_meeting_time(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/imports/rows",
            &json!({
                "rows": [{
                    "title": "周会",
                    "speaker": "王总",
                    "summary_raw": "内容",
                    "meeting_time": "next tuesday"
                }]
            }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["success_count"], 0);
    assert_eq!(body["errors"][0]["row"], 1);
    assert_eq!(
        body["errors"][0]["message"],
        "invalid meeting_time: next tuesday"
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_import_meetings_and_update_on_reimport(ctx: &TestContext) {
    ctx.meetings.set_items(vec![
        meeting("m-1", "产品周会", "周一发布新产品。"),
        meeting("m-2", "Budget review", "Budget approved for Q3."),
        meeting("m-1", "产品周会", "周一发布新产品。"),
        meeting("m-3", "空会议", ""),
    ]);

    let request = json!({
        "url": "https://meetings.example.com/api",
        "lookback_days": 3,
        "auto_enable_playback": true
    });
    let response = ctx
        .client
        .post("/api/imports/meetings", &request)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["created"], 2);
    assert_eq!(body["updated"], 0);
    assert_eq!(body["skipped"], 1);
    assert_eq!(body["report_ids"].as_array().unwrap().len(), 2);
    assert_eq!(ctx.meetings.last_lookback_days.load(Ordering::SeqCst), 3);

    let first_id = body["report_ids"][0].as_i64().unwrap();
    let report = ctx
        .client
        .get(&format!("/api/reports/{}", first_id))
        .await
        .unwrap();
    let report = report.body();
    assert_eq!(report["title"], "产品周会");
    assert_eq!(report["source_language"], "zh");
    assert_eq!(report["source_type"], "meeting");
    assert_eq!(report["source_meeting_id"], "m-1");
    assert_eq!(report["source_meeting_no"], "no-m-1");
    assert_eq!(report["source_url"], "https://meetings.example.com/api");
    assert_eq!(report["auto_play_enabled"], true);
    assert_eq!(report["meeting_time"], "2026-03-02T09:30:00Z");

    // Give the first meeting a script, then import again with a new topic
    ctx.client
        .put(
            &format!("/api/reports/{}", first_id),
            &json!({ "script_final": "周一发布新产品。", "reflections_final": ["建议A"] }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
    ctx.run_background().await;

    ctx.meetings.set_items(vec![
        meeting("m-1", "产品周会（更新）", "周一发布新产品，预算待定。"),
        meeting("m-2", "Budget review", "Budget approved for Q3."),
    ]);
    let response = ctx
        .client
        .post("/api/imports/meetings", &request)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["created"], 0);
    assert_eq!(response.body()["updated"], 2);

    let stored = ctx.fixtures.get_report(first_id).await.unwrap().unwrap();
    assert_eq!(stored.title, "产品周会（更新）");
    assert_eq!(stored.summary_raw, "周一发布新产品，预算待定。");
    assert_eq!(stored.script_final, "周一发布新产品。");

    // Only the scripted meeting is re-translated, then its reflections narrated
    assert_eq!(ctx.dispatcher.pending(), vec!["refresh_translations"]);
    assert_eq!(ctx.run_background().await, 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_502_when_meeting_source_fails(ctx: &TestContext) {
    ctx.meetings.go_offline();

    ctx.client
        .post(
            "/api/imports/meetings",
            &json!({ "url": "https://meetings.example.com/api" }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("meeting source returned 503");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_meeting_source_url(ctx: &TestContext) {
    ctx.client
        .post("/api/imports/meetings", &json!({ "url": "  " }))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("url is required");

    assert_eq!(ctx.meetings.last_lookback_days.load(Ordering::SeqCst), 0);
}
