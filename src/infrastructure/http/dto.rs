//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{BatchReport, Font, ItemOutcome, RefineItem, SettingsPatch, Theme};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// Library DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StoriesParams {
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChapterParams {
    pub story: String,
    pub chapter: String,
}

#[derive(Debug, Deserialize)]
pub struct ChaptersParams {
    pub story: String,
}

// ============================================================================
// Story DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddStoryRequest {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteStoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetTagsRequest {
    pub story: String,
    /// 逗号分隔，例如 `"Tiên Hiệp, Trọng Sinh"`
    pub tags: String,
}

#[derive(Debug, Serialize)]
pub struct NameResponse {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ChangedResponse {
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

// ============================================================================
// Chapter DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SaveChapterRequest {
    pub story: String,
    pub chapter: String,
    pub text: String,
    /// 不传则保留现有标签
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameChapterRequest {
    pub story: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteChapterRequest {
    pub story: String,
    pub chapter: String,
}

// ============================================================================
// Settings DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub theme: Option<Theme>,
    pub font: Option<Font>,
    pub font_size: Option<u32>,
}

impl From<UpdateSettingsRequest> for SettingsPatch {
    fn from(req: UpdateSettingsRequest) -> Self {
        Self {
            theme: req.theme,
            font: req.font,
            font_size: req.font_size,
        }
    }
}

// ============================================================================
// Queue DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTranslationRequest {
    pub story_name: String,
    pub chapter_number: String,
    pub raw_text: String,
    /// 数组或逗号分隔字符串
    #[serde(default)]
    pub tags: TagsInput,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl Default for TagsInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            Self::List(tags) => tags,
            Self::Text(raw) => crate::domain::library::parse_tag_list(&raw),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTranslationResponse {
    pub task_id: String,
}

// ============================================================================
// Batch DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemDto {
    /// 重试时沿用客户端保存的 ID
    pub id: Option<String>,
    pub story: String,
    pub chapter: String,
    pub raw_text: String,
    /// 逗号分隔
    #[serde(default)]
    pub tags: String,
}

impl From<BatchItemDto> for RefineItem {
    fn from(dto: BatchItemDto) -> Self {
        let mut item = RefineItem::new(dto.story, dto.chapter, dto.raw_text, dto.tags);
        if let Some(id) = dto.id.filter(|id| !id.is_empty()) {
            item.id = id;
        }
        item
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchRunRequest {
    pub items: Vec<BatchItemDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcomeDto {
    pub id: String,
    /// "saved" | "failed" | "pending"
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub can_retry: bool,
}

impl ItemOutcomeDto {
    pub fn new(id: String, outcome: &ItemOutcome) -> Self {
        let (status, error) = match outcome {
            ItemOutcome::Saved => ("saved", None),
            ItemOutcome::Failed { error } => ("failed", Some(error.to_string())),
            ItemOutcome::Pending => ("pending", None),
        };
        Self {
            id,
            status,
            error,
            can_retry: outcome.can_retry(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterRef {
    pub story: String,
    pub chapter: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextItemDto {
    pub story: String,
    pub chapter: String,
    pub tags: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReportDto {
    pub outcomes: Vec<ItemOutcomeDto>,
    pub halted: bool,
    pub first_opened: Option<ChapterRef>,
    pub next_item: Option<NextItemDto>,
}

impl From<BatchReport> for BatchReportDto {
    fn from(report: BatchReport) -> Self {
        Self {
            outcomes: report
                .outcomes
                .iter()
                .map(|(id, outcome)| ItemOutcomeDto::new(id.clone(), outcome))
                .collect(),
            halted: report.halted,
            first_opened: report
                .first_opened
                .map(|(story, chapter)| ChapterRef { story, chapter }),
            next_item: report.next_item.map(|item| NextItemDto {
                story: item.story,
                chapter: item.chapter,
                tags: item.tags,
            }),
        }
    }
}
