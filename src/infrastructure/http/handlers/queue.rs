//! Translation Queue Handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::{SubmitTranslation, TranslationTask};
use crate::infrastructure::http::dto::{
    ApiResponse, SubmitTranslationRequest, SubmitTranslationResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 提交润色任务，立即返回任务 ID
pub async fn submit_translation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitTranslationRequest>,
) -> Result<Json<ApiResponse<SubmitTranslationResponse>>, ApiError> {
    let task_id = state
        .submit_translation_handler
        .handle(SubmitTranslation {
            story_name: req.story_name,
            chapter_number: req.chapter_number,
            raw_text: req.raw_text,
            tags: req.tags.into_tags(),
        })
        .await?;
    Ok(Json(ApiResponse::success(SubmitTranslationResponse { task_id })))
}

/// 队列中剩余的任务
pub async fn list_translation_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TranslationTask>>>, ApiError> {
    let tasks = state.list_translation_tasks_handler.handle().await?;
    Ok(Json(ApiResponse::success(tasks)))
}
