pub mod error;
pub mod model;
pub mod service;

pub use error::ImportServiceError;
pub use model::RawMeetingItem;
pub use service::{ImportService, ImportServiceApi};

use serde::{Deserialize, Serialize};

/// One row of a spreadsheet import. Headers may use the Chinese column names.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportRow {
    #[serde(alias = "标题")]
    pub title: String,
    #[serde(alias = "发言人")]
    pub speaker: String,
    #[serde(alias = "总结原文")]
    pub summary_raw: String,
    #[serde(alias = "时间")]
    pub meeting_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportRowsRequest {
    pub rows: Vec<ImportRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportRowError {
    /// 1-based position in the submitted rows
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ImportRowsResponse {
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<ImportRowError>,
}

fn default_lookback_days() -> u32 {
    7
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportMeetingsRequest {
    pub url: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default)]
    pub auto_enable_playback: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ImportMeetingsResponse {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub report_ids: Vec<i64>,
}
