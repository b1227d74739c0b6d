//! Story HTTP Handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::{AddStory, DeleteStory, RenameStory, SetStoryTags};
use crate::domain::library::parse_tag_list;
use crate::infrastructure::http::dto::{
    AddStoryRequest, ApiResponse, ChangedResponse, DeleteStoryRequest, Empty, NameResponse,
    RenameRequest, SetTagsRequest, TagsResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn add_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddStoryRequest>,
) -> Result<Json<ApiResponse<NameResponse>>, ApiError> {
    let name = state
        .add_story_handler
        .handle(AddStory {
            name: req.name,
            tags: req.tags,
        })
        .await?;
    Ok(Json(ApiResponse::success(NameResponse { name })))
}

pub async fn rename_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<ApiResponse<ChangedResponse>>, ApiError> {
    let changed = state
        .rename_story_handler
        .handle(RenameStory {
            from: req.from,
            to: req.to,
        })
        .await?;
    Ok(Json(ApiResponse::success(ChangedResponse { changed })))
}

pub async fn delete_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteStoryRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_story_handler
        .handle(DeleteStory { name: req.name })
        .await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn set_story_tags(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetTagsRequest>,
) -> Result<Json<ApiResponse<TagsResponse>>, ApiError> {
    let tags = state
        .set_story_tags_handler
        .handle(SetStoryTags {
            story: req.story,
            tags: parse_tag_list(&req.tags),
        })
        .await?;
    Ok(Json(ApiResponse::success(TagsResponse { tags })))
}
