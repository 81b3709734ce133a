use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One meeting as returned by the meeting source, before any cleanup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMeetingItem {
    pub meeting_id: String,
    pub meeting_no: String,
    pub topic: String,
    pub start_time: Option<DateTime<Utc>>,
    pub minute_url: String,
    pub minute_token: String,
    pub summary: String,
    pub transcript: String,
    pub todos: Vec<String>,
}

impl RawMeetingItem {
    /// Report body assembled from the summary, action items and transcript
    pub fn report_summary(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        let summary = self.summary.trim();
        if !summary.is_empty() {
            sections.push(summary.to_string());
        }

        let todos: Vec<String> = self
            .todos
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| format!("- {}", t))
            .collect();
        if !todos.is_empty() {
            sections.push(format!("Action items:\n{}", todos.join("\n")));
        }

        let transcript = self.transcript.trim();
        if !transcript.is_empty() {
            sections.push(format!("Transcript:\n{}", transcript));
        }

        sections.join("\n\n")
    }

    pub fn report_title(&self) -> String {
        let topic = self.topic.trim();
        if topic.is_empty() {
            format!("Meeting {}", self.meeting_no.trim())
        } else {
            topic.to_string()
        }
    }
}
