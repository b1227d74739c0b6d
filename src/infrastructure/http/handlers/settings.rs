//! Settings HTTP Handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::{Settings, UpdateSettings};
use crate::infrastructure::http::dto::{ApiResponse, UpdateSettingsRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Settings>> {
    Json(ApiResponse::success(state.preferences.load_settings().await))
}

/// 部分更新，返回生效后的设置
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<Settings>>, ApiError> {
    let settings = state
        .update_settings_handler
        .handle(UpdateSettings { patch: req.into() })
        .await?;
    Ok(Json(ApiResponse::success(settings)))
}
