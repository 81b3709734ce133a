use super::meeting_source_repository::MeetingSourceRepository;
use crate::domain::import::RawMeetingItem;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use html2text::from_read;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct MeetingItemsResponse {
    #[serde(default)]
    items: Vec<RawMeetingItem>,
}

/// Meeting source backed by a JSON HTTP API
pub struct HttpMeetingSourceRepository {
    base_url: String,
    token: String,
    http_client: reqwest::Client,
    inline_whitespace: Regex,
    blank_lines: Regex,
}

impl HttpMeetingSourceRepository {
    pub fn new(base_url: String, token: String, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http_client,
            inline_whitespace: Regex::new(r"[ \t\u{00a0}]+")?,
            blank_lines: Regex::new(r"\n{3,}")?,
        })
    }

    /// Flatten HTML fragments to plain text, keeping line structure
    fn clean_text(&self, text: &str) -> String {
        if !text.contains('<') {
            return text.trim().to_string();
        }
        let plain_text = from_read(text.as_bytes(), usize::MAX);
        let collapsed = self.inline_whitespace.replace_all(&plain_text, " ");
        let compacted = self.blank_lines.replace_all(&collapsed, "\n\n");
        compacted.trim().to_string()
    }

    fn clean_item(&self, mut item: RawMeetingItem) -> RawMeetingItem {
        item.topic = self.clean_text(&item.topic);
        item.summary = self.clean_text(&item.summary);
        item.transcript = self.clean_text(&item.transcript);
        item.todos = item.todos.iter().map(|t| self.clean_text(t)).collect();
        item
    }
}

#[async_trait]
impl MeetingSourceRepository for HttpMeetingSourceRepository {
    async fn fetch_meeting_items(
        &self,
        url: &str,
        lookback_days: u32,
    ) -> AppResult<Vec<RawMeetingItem>> {
        if self.base_url.is_empty() {
            return Err(AppError::BadRequest(
                "Meeting source is not configured".to_string(),
            ));
        }

        let start_time = std::time::Instant::now();
        let lookback = lookback_days.to_string();
        let response = self
            .http_client
            .get(format!("{}/meetings", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("source_url", url), ("lookback_days", lookback.as_str())])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Meeting source request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::BadRequest(format!(
                "Meeting source rejected the url: {}",
                error_text
            )));
        }
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "Meeting source returned {}",
                status
            )));
        }

        let body = response
            .json::<MeetingItemsResponse>()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse meeting items: {}", e)))?;

        let items: Vec<RawMeetingItem> = body
            .items
            .into_iter()
            .filter(|item| !item.meeting_id.trim().is_empty())
            .map(|item| self.clean_item(item))
            .collect();

        tracing::info!(
            source_url = %url,
            lookback_days = lookback_days,
            item_count = items.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Fetched meeting items"
        );

        Ok(items)
    }
}
