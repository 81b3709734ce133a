use serde::{Deserialize, Serialize};

/// Report content handed to the language model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceContent {
    pub title: String,
    pub speaker: String,
    pub summary: String,
    pub script: String,
}

impl SourceContent {
    /// Script when present, otherwise the raw summary
    pub fn primary_text(&self) -> &str {
        let script = self.script.trim();
        if script.is_empty() {
            self.summary.trim()
        } else {
            script
        }
    }
}

/// Narration script plus the list fields generated alongside it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPackage {
    pub script: String,
    pub highlights: Vec<String>,
    pub reflections: Vec<String>,
    pub questions: Vec<String>,
}

/// The part of a report translated in a single model call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslatablePackage {
    pub title: String,
    pub script: String,
    pub highlights: Vec<String>,
}
