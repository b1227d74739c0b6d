//! Library HTTP Handlers
//!
//! 整份文档的读取与替换，以及只读的列表/章节视图

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::application::{
    ChapterListView, ChapterView, GetChapter, ListChapters, ListStories, StoryListing,
};
use crate::domain::library::Library;
use crate::infrastructure::http::dto::{
    ApiResponse, ChapterParams, ChaptersParams, Empty, StoriesParams,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 读取整份书库文档
pub async fn get_library(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Library>>, ApiError> {
    let library = state.store.load().await?;
    Ok(Json(ApiResponse::success(library)))
}

/// 整份替换（后写者胜）
pub async fn put_library(
    State(state): State<Arc<AppState>>,
    Json(library): Json<Library>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.store.replace(&library).await?;
    tracing::info!(stories = library.len(), "Library replaced by client");
    Ok(Json(ApiResponse::ok()))
}

/// 书目列表，按最近修改排序，可按标签过滤
pub async fn list_stories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StoriesParams>,
) -> Result<Json<ApiResponse<StoryListing>>, ApiError> {
    let tag = params.tag.filter(|t| !t.trim().is_empty());
    let listing = state.list_stories_handler.handle(ListStories { tag }).await?;
    Ok(Json(ApiResponse::success(listing)))
}

/// 单章阅读视图
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChapterParams>,
) -> Result<Json<ApiResponse<ChapterView>>, ApiError> {
    let view = state
        .get_chapter_handler
        .handle(GetChapter {
            story: params.story,
            chapter: params.chapter,
        })
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// 目录（倒序）与建议的下一章号
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChaptersParams>,
) -> Result<Json<ApiResponse<ChapterListView>>, ApiError> {
    let view = state
        .list_chapters_handler
        .handle(ListChapters {
            story: params.story,
        })
        .await?;
    Ok(Json(ApiResponse::success(view)))
}
