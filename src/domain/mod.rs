//! Domain Layer - 领域层
//!
//! 包含一个限界上下文和三个纯计算模块:
//! - Library Context: 书库文档与整文档变换
//! - 章节索引: 章节号排序与上一章/下一章
//! - 段落切分
//! - 阅读进度: 滚动比例与段落点击

pub mod library;

mod chapter_index;
mod paragraphs;
mod progress;

pub use chapter_index::{
    following_chapter, order_chapters, order_chapters_desc, suggest_next_chapter, ChapterIndex,
    ChapterIndexMemo,
};
pub use paragraphs::{paragraph_count, split_paragraphs};
pub use progress::{
    click_paragraph, is_paragraph_read, open_action, read_to_index_on, toggle_bookmark,
    BookmarkToggle, OpenAction, ProgressChange, ScrollMetrics,
};
