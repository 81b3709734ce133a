use axum::{extract::State, Json};
use std::sync::Arc;

use crate::domain::import::{
    ImportMeetingsRequest, ImportMeetingsResponse, ImportRowsRequest, ImportRowsResponse,
};
use crate::{
    domain::import::{ImportService, ImportServiceApi},
    error::AppResult,
};

pub struct ImportController {
    import_service: Arc<ImportService>,
}

impl ImportController {
    pub fn new(import_service: Arc<ImportService>) -> Self {
        Self { import_service }
    }

    /// POST /api/imports/rows
    pub async fn import_rows(
        State(controller): State<Arc<ImportController>>,
        Json(request): Json<ImportRowsRequest>,
    ) -> AppResult<Json<ImportRowsResponse>> {
        let result = controller.import_service.import_rows(request.rows).await?;
        Ok(Json(result))
    }

    /// POST /api/imports/meetings
    pub async fn import_meetings(
        State(controller): State<Arc<ImportController>>,
        Json(request): Json<ImportMeetingsRequest>,
    ) -> AppResult<Json<ImportMeetingsResponse>> {
        let result = controller.import_service.import_meetings(request).await?;
        Ok(Json(result))
    }
}
