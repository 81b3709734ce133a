use crate::domain::import::RawMeetingItem;
use crate::error::AppResult;
use async_trait::async_trait;

/// Third-party meeting and minutes provider
#[async_trait]
pub trait MeetingSourceRepository: Send + Sync {
    /// Meetings reachable from `url` that started within the last `lookback_days`
    async fn fetch_meeting_items(
        &self,
        url: &str,
        lookback_days: u32,
    ) -> AppResult<Vec<RawMeetingItem>>;
}
