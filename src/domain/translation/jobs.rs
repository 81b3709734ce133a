use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

use super::model::TranslationStatus;
use crate::domain::language::LanguageKey;

/// Progress of background work for one (report, language)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Translating,
    Ready,
    Failed,
}

impl From<JobStatus> for TranslationStatus {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Translating => TranslationStatus::Translating,
            JobStatus::Ready => TranslationStatus::Ready,
            JobStatus::Failed => TranslationStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobState {
    pub status: JobStatus,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl JobState {
    pub fn new(status: JobStatus, error: Option<String>) -> Self {
        Self {
            status,
            error,
            updated_at: Utc::now(),
        }
    }
}

/// Process-lifetime status of translation jobs.
///
/// Not durable: the persisted translation row is the source of truth for
/// completed work, this only adds what is in flight or failed.
pub trait JobStateStore: Send + Sync {
    fn get(&self, report_id: i64, language: LanguageKey) -> Option<JobState>;

    fn set(&self, report_id: i64, language: LanguageKey, state: JobState);

    fn mark(&self, report_id: i64, language: LanguageKey, status: JobStatus, error: Option<String>) {
        self.set(report_id, language, JobState::new(status, error));
    }
}

#[derive(Default)]
pub struct InMemoryJobStateStore {
    states: Mutex<HashMap<(i64, LanguageKey), JobState>>,
}

impl InMemoryJobStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStateStore for InMemoryJobStateStore {
    fn get(&self, report_id: i64, language: LanguageKey) -> Option<JobState> {
        self.states.lock().get(&(report_id, language)).cloned()
    }

    fn set(&self, report_id: i64, language: LanguageKey, state: JobState) {
        self.states.lock().insert((report_id, language), state);
    }
}

/// Status a client sees for a non-source language.
///
/// An existing row is ready unless a job is translating it again or the
/// last job failed. Without a row the job state decides, else missing.
pub fn resolve_status(job: Option<&JobState>, has_row: bool) -> TranslationStatus {
    match (job.map(|j| j.status), has_row) {
        (Some(JobStatus::Translating), _) => TranslationStatus::Translating,
        (Some(JobStatus::Failed), _) => TranslationStatus::Failed,
        (_, true) => TranslationStatus::Ready,
        (Some(JobStatus::Ready), false) => TranslationStatus::Ready,
        (None, false) => TranslationStatus::Missing,
    }
}
