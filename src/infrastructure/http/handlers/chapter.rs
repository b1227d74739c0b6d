//! Chapter HTTP Handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::{DeleteChapter, RenameChapter, SaveChapter};
use crate::domain::library::{parse_tag_list, TagUpdate};
use crate::infrastructure::http::dto::{
    ApiResponse, ChangedResponse, DeleteChapterRequest, Empty, RenameChapterRequest,
    SaveChapterRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 保存一章（不存在的书会被创建）
pub async fn save_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveChapterRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let tags = match req.tags {
        Some(raw) => TagUpdate::Replace(parse_tag_list(&raw)),
        None => TagUpdate::Keep,
    };
    state
        .save_chapter_handler
        .handle(SaveChapter {
            story: req.story,
            chapter: req.chapter,
            text: req.text,
            tags,
        })
        .await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn rename_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenameChapterRequest>,
) -> Result<Json<ApiResponse<ChangedResponse>>, ApiError> {
    let changed = state
        .rename_chapter_handler
        .handle(RenameChapter {
            story: req.story,
            from: req.from,
            to: req.to,
        })
        .await?;
    Ok(Json(ApiResponse::success(ChangedResponse { changed })))
}

pub async fn delete_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteChapterRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_chapter_handler
        .handle(DeleteChapter {
            story: req.story,
            chapter: req.chapter,
        })
        .await?;
    Ok(Json(ApiResponse::ok()))
}
