//! Translation Queue Port - 后台润色队列
//!
//! 提交后即返回，由后台 Worker 润色并写入书库，具体实现在 infrastructure/memory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Queue is full")]
    Full,

    #[error("Queue is closed")]
    Closed,
}

/// 任务状态（成功的任务直接从队列移除）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Error,
}

/// 润色任务
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationTask {
    pub id: String,
    pub story_name: String,
    pub chapter_number: String,
    pub raw_text: String,
    pub tags: Vec<String>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TranslationTask {
    pub fn new(
        story_name: String,
        chapter_number: String,
        raw_text: String,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            story_name,
            chapter_number,
            raw_text,
            tags,
            status: TaskStatus::Pending,
            error_message: None,
            created_at: Utc::now(),
        }
    }
}

/// Translation Queue Port
pub trait TranslationQueuePort: Send + Sync {
    /// 入队，返回任务 ID
    fn submit(&self, task: TranslationTask) -> Result<String, QueueError>;

    fn get(&self, task_id: &str) -> Option<TranslationTask>;

    /// 剩余任务（按提交时间）
    fn list(&self) -> Vec<TranslationTask>;

    fn mark_processing(&self, task_id: &str) -> Result<(), QueueError>;

    fn mark_failed(&self, task_id: &str, message: String) -> Result<(), QueueError>;

    /// 完成后移除
    fn remove(&self, task_id: &str) -> Option<TranslationTask>;
}
