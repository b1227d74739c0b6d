//! Refine Commands - 润色批处理

use std::time::Duration;

use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::RefineError;
use crate::domain::library::{parse_tag_list, Library};
use crate::domain::{following_chapter, suggest_next_chapter};

/// 批处理中的一项（一章）
#[derive(Debug, Clone, PartialEq)]
pub struct RefineItem {
    pub id: String,
    pub story: String,
    pub chapter: String,
    pub raw_text: String,
    /// 逗号分隔的标签
    pub tags: String,
}

impl RefineItem {
    pub fn new(
        story: impl Into<String>,
        chapter: impl Into<String>,
        raw_text: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            story: story.into(),
            chapter: chapter.into(),
            raw_text: raw_text.into(),
            tags: tags.into(),
        }
    }

    pub fn blank() -> Self {
        Self::new("", "", "", "")
    }

    /// 继续某本书：章节号取建议的下一章，标签沿用
    pub fn starting_from(library: &Library, story: &str) -> Self {
        match library.story(story) {
            Some(s) => Self::new(
                story,
                suggest_next_chapter(s.chapters.keys()),
                "",
                s.tags.join(", "),
            ),
            None => Self::new(story, "1", "", ""),
        }
    }

    /// 紧随本项的下一项（同书同标签，章节号 +1，正文为空）
    pub fn follow_up(&self) -> Self {
        Self::new(
            self.story.clone(),
            following_chapter(&self.chapter).unwrap_or_default(),
            "",
            self.tags.clone(),
        )
    }

    pub fn tag_list(&self) -> Vec<String> {
        parse_tag_list(&self.tags)
    }

    /// 书名、章节号、正文都必须非空
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.story.trim().is_empty()
            || self.chapter.trim().is_empty()
            || self.raw_text.trim().is_empty()
        {
            return Err(ApplicationError::validation(format!(
                "item {}: story name, chapter number and text are all required",
                self.id
            )));
        }
        Ok(())
    }
}

/// 批处理进度事件
#[derive(Debug, Clone, PartialEq)]
pub enum BatchProgress {
    Started {
        item_id: String,
        position: usize,
        total: usize,
    },
    Saved {
        item_id: String,
        story: String,
        chapter: String,
    },
    Failed {
        item_id: String,
        error: RefineError,
    },
    Waiting {
        delay: Duration,
    },
    Halted {
        item_id: String,
    },
    Finished,
}

/// 单项结果
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Saved,
    Failed { error: RefineError },
    /// 批处理中止，未执行
    Pending,
}

impl ItemOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, ItemOutcome::Saved)
    }

    /// 可以原样重试
    pub fn can_retry(&self) -> bool {
        matches!(self, ItemOutcome::Failed { error } if error.is_retryable())
    }
}

/// 批处理结果
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub outcomes: Vec<(String, ItemOutcome)>,
    pub halted: bool,
    /// 第一个成功保存的章节，供阅读器自动打开
    pub first_opened: Option<(String, String)>,
    /// 全部成功时用于下一轮的新项
    pub next_item: Option<RefineItem>,
}

impl BatchReport {
    pub fn outcome(&self, item_id: &str) -> Option<&ItemOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == item_id)
            .map(|(_, outcome)| outcome)
    }

    pub fn saved_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_saved()).count()
    }
}

/// 提交到后台润色队列
#[derive(Debug, Clone)]
pub struct SubmitTranslation {
    pub story_name: String,
    pub chapter_number: String,
    pub raw_text: String,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::Story;

    #[test]
    fn test_follow_up_increments_integer_part() {
        let item = RefineItem::new("A", "4.5", "text", "x, y");
        let next = item.follow_up();
        assert_eq!(next.story, "A");
        assert_eq!(next.chapter, "5");
        assert_eq!(next.tags, "x, y");
        assert!(next.raw_text.is_empty());
        assert_ne!(next.id, item.id);

        assert_eq!(RefineItem::new("A", "extra", "", "").follow_up().chapter, "");
    }

    #[test]
    fn test_starting_from_library() {
        let mut library = Library::new();
        library.insert(
            "A",
            Story::new(1)
                .with_chapter("1", "a")
                .with_chapter("7", "b")
                .with_tags(vec!["x".into(), "y".into()]),
        );
        let item = RefineItem::starting_from(&library, "A");
        assert_eq!(item.chapter, "8");
        assert_eq!(item.tags, "x, y");

        assert_eq!(RefineItem::starting_from(&library, "New").chapter, "1");
    }

    #[test]
    fn test_validate() {
        assert!(RefineItem::new("A", "1", "text", "").validate().is_ok());
        assert!(RefineItem::new("A", " ", "text", "").validate().is_err());
        assert!(RefineItem::new("A", "1", "\n", "").validate().is_err());
        assert!(RefineItem::blank().validate().is_err());
    }
}
