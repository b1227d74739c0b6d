//! Batch Refine Handlers
//!
//! 顺序润色整批章节；请求会持续到整批结束（项间有固定等待）

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::{BatchRefineHandler, RefineItem};
use crate::infrastructure::http::dto::{
    ApiResponse, BatchItemDto, BatchReportDto, BatchRunRequest, ItemOutcomeDto,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn batch_handler(state: &AppState) -> Result<&BatchRefineHandler, ApiError> {
    state
        .batch_refine_handler
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Batch refinement is not configured".into()))
}

pub async fn run_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRunRequest>,
) -> Result<Json<ApiResponse<BatchReportDto>>, ApiError> {
    let handler = batch_handler(&state)?;
    let items: Vec<RefineItem> = req.items.into_iter().map(RefineItem::from).collect();
    let report = handler.run(items, None).await?;
    Ok(Json(ApiResponse::success(report.into())))
}

/// 原样重试一项
pub async fn retry_batch_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchItemDto>,
) -> Result<Json<ApiResponse<ItemOutcomeDto>>, ApiError> {
    let handler = batch_handler(&state)?;
    let item = RefineItem::from(req);
    let outcome = handler.retry(&item).await?;
    Ok(Json(ApiResponse::success(ItemOutcomeDto::new(item.id, &outcome))))
}
