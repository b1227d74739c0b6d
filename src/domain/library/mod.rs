//! Library Context - 书库限界上下文
//!
//! 职责:
//! - 书库文档（书 → 章节 / 标签 / 书签）
//! - 书签与已读进度的整文档变换
//! - 章节号解析与标签规范化

mod aggregate;
mod edits;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{Library, Story};
pub use edits::{LibraryEdit, TagUpdate};
pub use entities::{clamp_fraction, Bookmark};
pub use errors::LibraryError;
pub use value_objects::{merge_tags, normalize_tags, parse_chapter_number, parse_tag_list};
