use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::domain::playback::{PlaybackQuery, PlaybackQueueResponse, PlaybackService};
use crate::error::AppResult;

pub struct PlaybackController {
    playback_service: Arc<PlaybackService>,
}

impl PlaybackController {
    pub fn new(playback_service: Arc<PlaybackService>) -> Self {
        Self { playback_service }
    }

    /// GET /api/playback/queue?include_audio=&langs=&report_id=
    pub async fn queue(
        State(controller): State<Arc<PlaybackController>>,
        Query(query): Query<PlaybackQuery>,
    ) -> AppResult<Json<PlaybackQueueResponse>> {
        let queue = controller.playback_service.queue(query).await?;
        Ok(Json(queue))
    }
}
