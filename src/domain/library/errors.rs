//! Library Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    #[error("书不存在: {0}")]
    StoryNotFound(String),

    #[error("书已存在: {0}")]
    StoryAlreadyExists(String),

    #[error("章节不存在: {story} / {chapter}")]
    ChapterNotFound { story: String, chapter: String },

    #[error("章节已存在: {story} / {chapter}")]
    ChapterAlreadyExists { story: String, chapter: String },

    #[error("无效的书名: {0}")]
    InvalidStoryName(String),

    #[error("无效的章节号: {0}")]
    InvalidChapterId(String),

    #[error("章节内容不能为空")]
    EmptyContent,
}

impl LibraryError {
    pub fn chapter_not_found(story: &str, chapter: &str) -> Self {
        Self::ChapterNotFound {
            story: story.to_string(),
            chapter: chapter.to_string(),
        }
    }

    pub fn chapter_exists(story: &str, chapter: &str) -> Self {
        Self::ChapterAlreadyExists {
            story: story.to_string(),
            chapter: chapter.to_string(),
        }
    }
}
