//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{PreferencesError, QueueError, RefineError, StoreError};
use crate::domain::library::LibraryError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 与现有数据冲突（重名等）
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 润色服务错误
    #[error("Refinement failed: {0}")]
    Refine(#[from] RefineError),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建冲突错误
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<PreferencesError> for ApplicationError {
    fn from(err: PreferencesError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<QueueError> for ApplicationError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::NotFound(id) => Self::not_found("Task", id),
            other => Self::ExternalServiceError(other.to_string()),
        }
    }
}

impl From<LibraryError> for ApplicationError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::StoryNotFound(name) => Self::not_found("Story", name),
            LibraryError::ChapterNotFound { story, chapter } => {
                Self::not_found("Chapter", format!("{story}/{chapter}"))
            }
            LibraryError::StoryAlreadyExists(_) | LibraryError::ChapterAlreadyExists { .. } => {
                Self::Conflict(err.to_string())
            }
            LibraryError::InvalidStoryName(_)
            | LibraryError::InvalidChapterId(_)
            | LibraryError::EmptyContent => Self::ValidationError(err.to_string()),
        }
    }
}
