//! HTTP handlers for growth record endpoints

use axum::{extract::State, Json};

use shared::GrowthRecord;

use crate::error::{AppError, AppResult};
use crate::services::growth::GrowthService;
use crate::AppState;

/// Most recent growth record
pub async fn latest_growth_record(State(state): State<AppState>) -> AppResult<Json<GrowthRecord>> {
    let service = GrowthService::new(state.db);
    let record = service
        .latest()
        .await?
        .ok_or_else(|| AppError::NotFound("Growth record".to_string()))?;
    Ok(Json(record))
}
