//! Library Context - 整文档变换
//!
//! 每个编辑都是纯函数 `Library -> Library`，不做校验：
//! 目标书不存在、重命名源不存在或目标已存在时原样返回。
//! 校验与冲突报告由应用层命令处理器负责。

use chrono::Utc;

use super::value_objects::{merge_tags, normalize_tags};
use super::{Library, Story};

/// 保存章节时对标签的处理方式
#[derive(Debug, Clone, PartialEq)]
pub enum TagUpdate {
    /// 保持原有标签
    Keep,
    /// 整体替换
    Replace(Vec<String>),
    /// 与原有标签取并集
    Merge(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEdit {
    SetBookmark {
        story: String,
        chapter: String,
        scroll_position: f64,
    },
    /// `index == 0` 清除进度
    SetReadToIndex {
        story: String,
        chapter: String,
        index: usize,
    },
    RemoveBookmark {
        story: String,
    },
    RenameChapter {
        story: String,
        from: String,
        to: String,
    },
    DeleteChapter {
        story: String,
        chapter: String,
    },
    AddStory {
        name: String,
        tags: Vec<String>,
    },
    RenameStory {
        from: String,
        to: String,
    },
    DeleteStory {
        name: String,
    },
    SaveChapter {
        story: String,
        chapter: String,
        text: String,
        tags: TagUpdate,
    },
    SetTags {
        story: String,
        tags: Vec<String>,
    },
}

impl LibraryEdit {
    pub fn set_bookmark(story: &str, chapter: &str, scroll_position: f64) -> Self {
        Self::SetBookmark {
            story: story.to_string(),
            chapter: chapter.to_string(),
            scroll_position,
        }
    }

    pub fn set_read_to_index(story: &str, chapter: &str, index: usize) -> Self {
        Self::SetReadToIndex {
            story: story.to_string(),
            chapter: chapter.to_string(),
            index,
        }
    }

    pub fn remove_bookmark(story: &str) -> Self {
        Self::RemoveBookmark {
            story: story.to_string(),
        }
    }

    /// 操作的书名（用于日志）
    pub fn story(&self) -> &str {
        match self {
            Self::SetBookmark { story, .. }
            | Self::SetReadToIndex { story, .. }
            | Self::RemoveBookmark { story }
            | Self::RenameChapter { story, .. }
            | Self::DeleteChapter { story, .. }
            | Self::SaveChapter { story, .. }
            | Self::SetTags { story, .. } => story,
            Self::AddStory { name, .. } | Self::DeleteStory { name } => name,
            Self::RenameStory { from, .. } => from,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetBookmark { .. } => "set_bookmark",
            Self::SetReadToIndex { .. } => "set_read_to_index",
            Self::RemoveBookmark { .. } => "remove_bookmark",
            Self::RenameChapter { .. } => "rename_chapter",
            Self::DeleteChapter { .. } => "delete_chapter",
            Self::AddStory { .. } => "add_story",
            Self::RenameStory { .. } => "rename_story",
            Self::DeleteStory { .. } => "delete_story",
            Self::SaveChapter { .. } => "save_chapter",
            Self::SetTags { .. } => "set_tags",
        }
    }

    /// 以当前时间应用
    pub fn apply(&self, library: Library) -> Library {
        self.apply_at(library, Utc::now().timestamp_millis())
    }

    /// 以给定时间（毫秒）应用
    pub fn apply_at(&self, mut library: Library, now_ms: i64) -> Library {
        match self {
            Self::SetBookmark {
                story,
                chapter,
                scroll_position,
            } => {
                if let Some(s) = library.story_mut(story) {
                    s.place_bookmark(chapter, *scroll_position);
                }
            }
            Self::SetReadToIndex {
                story,
                chapter,
                index,
            } => {
                if let Some(s) = library.story_mut(story) {
                    s.mark_read_to(chapter, *index);
                }
            }
            Self::RemoveBookmark { story } => {
                if let Some(s) = library.story_mut(story) {
                    s.remove_bookmark();
                }
            }
            Self::RenameChapter { story, from, to } => {
                if let Some(s) = library.story_mut(story) {
                    rename_chapter(s, from, to, now_ms);
                }
            }
            Self::DeleteChapter { story, chapter } => {
                if let Some(s) = library.story_mut(story) {
                    if s.chapters.shift_remove(chapter).is_some() {
                        if s.bookmark_on(chapter).is_some() {
                            s.bookmark = None;
                        }
                        s.touch(now_ms);
                    }
                }
            }
            Self::AddStory { name, tags } => {
                if !library.contains(name) {
                    library.insert(name.clone(), Story::new(now_ms).with_tags(normalize_tags(tags)));
                }
            }
            Self::RenameStory { from, to } => {
                if from != to && !library.contains(to) {
                    if let Some(story) = library.remove(from) {
                        library.insert(to.clone(), story);
                    }
                }
            }
            Self::DeleteStory { name } => {
                library.remove(name);
            }
            Self::SaveChapter {
                story,
                chapter,
                text,
                tags,
            } => {
                if !library.contains(story) {
                    library.insert(story.clone(), Story::new(now_ms));
                }
                if let Some(s) = library.story_mut(story) {
                    s.chapters.insert(chapter.clone(), text.clone());
                    match tags {
                        TagUpdate::Keep => {}
                        TagUpdate::Replace(new_tags) => s.tags = normalize_tags(new_tags),
                        TagUpdate::Merge(new_tags) => s.tags = merge_tags(&s.tags, new_tags),
                    }
                    s.touch(now_ms);
                }
            }
            Self::SetTags { story, tags } => {
                if let Some(s) = library.story_mut(story) {
                    s.tags = normalize_tags(tags);
                    s.touch(now_ms);
                }
            }
        }
        library
    }
}

fn rename_chapter(story: &mut Story, from: &str, to: &str, now_ms: i64) {
    if from == to || story.has_chapter(to) {
        return;
    }
    let Some(index) = story.chapters.get_index_of(from) else {
        return;
    };
    if let Some(text) = story.chapters.shift_remove(from) {
        story.chapters.shift_insert(index, to.to_string(), text);
    }
    if let Some(bookmark) = story.bookmark.as_mut().filter(|b| b.is_on(from)) {
        bookmark.chapter = to.to_string();
    }
    story.touch(now_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Library {
        let mut library = Library::new();
        library.insert(
            "A",
            Story::new(100)
                .with_chapter("1", "one")
                .with_chapter("2", "two")
                .with_tags(vec!["x".to_string()]),
        );
        library
    }

    fn bookmark(library: &Library) -> Option<&crate::domain::library::Bookmark> {
        library.story("A").and_then(|s| s.bookmark.as_ref())
    }

    #[test]
    fn test_switching_chapter_clears_progress() {
        let library = LibraryEdit::set_read_to_index("A", "1", 5).apply_at(sample(), 200);
        let library = LibraryEdit::set_bookmark("A", "2", 0.3).apply_at(library, 300);

        let b = bookmark(&library).unwrap();
        assert_eq!(b.chapter, "2");
        assert_eq!(b.scroll_position, 0.3);
        assert_eq!(b.read_to_index, None);
    }

    #[test]
    fn test_bookmark_ops_keep_last_modified() {
        let library = LibraryEdit::set_bookmark("A", "1", 0.5).apply_at(sample(), 999);
        let library = LibraryEdit::set_read_to_index("A", "1", 2).apply_at(library, 999);
        let library = LibraryEdit::remove_bookmark("A").apply_at(library, 999);
        assert_eq!(library.story("A").unwrap().last_modified, 100);
    }

    #[test]
    fn test_set_read_to_index_zero_without_bookmark_is_noop() {
        let before = sample();
        let after = LibraryEdit::set_read_to_index("A", "1", 0).apply_at(before.clone(), 1);
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_read_to_index_creates_and_forces_chapter() {
        let library = LibraryEdit::set_read_to_index("A", "2", 4).apply_at(sample(), 1);
        let b = bookmark(&library).unwrap();
        assert_eq!((b.chapter.as_str(), b.scroll_position, b.read_to_index), ("2", 0.0, Some(4)));

        let library = LibraryEdit::set_bookmark("A", "2", 0.7).apply_at(library, 1);
        let library = LibraryEdit::set_read_to_index("A", "1", 1).apply_at(library, 1);
        let b = bookmark(&library).unwrap();
        assert_eq!((b.chapter.as_str(), b.scroll_position, b.read_to_index), ("1", 0.7, Some(1)));
    }

    #[test]
    fn test_remove_bookmark_is_idempotent() {
        let library = LibraryEdit::set_bookmark("A", "1", 0.5).apply_at(sample(), 1);
        let once = LibraryEdit::remove_bookmark("A").apply_at(library, 1);
        let twice = LibraryEdit::remove_bookmark("A").apply_at(once.clone(), 1);
        assert_eq!(once, twice);
        assert!(bookmark(&once).is_none());
    }

    #[test]
    fn test_missing_story_is_noop() {
        let before = sample();
        for edit in [
            LibraryEdit::set_bookmark("B", "1", 0.5),
            LibraryEdit::set_read_to_index("B", "1", 3),
            LibraryEdit::remove_bookmark("B"),
            LibraryEdit::SetTags {
                story: "B".into(),
                tags: vec!["t".into()],
            },
        ] {
            assert_eq!(edit.apply_at(before.clone(), 1), before);
        }
    }

    #[test]
    fn test_delete_bookmarked_chapter_removes_bookmark() {
        let library = LibraryEdit::set_bookmark("A", "2", 0.5).apply_at(sample(), 1);
        let library = LibraryEdit::DeleteChapter {
            story: "A".into(),
            chapter: "2".into(),
        }
        .apply_at(library, 500);

        let story = library.story("A").unwrap();
        assert!(!story.has_chapter("2"));
        assert!(story.bookmark.is_none());
        assert_eq!(story.last_modified, 500);
    }

    #[test]
    fn test_delete_other_chapter_keeps_bookmark() {
        let library = LibraryEdit::set_bookmark("A", "1", 0.5).apply_at(sample(), 1);
        let library = LibraryEdit::DeleteChapter {
            story: "A".into(),
            chapter: "2".into(),
        }
        .apply_at(library, 1);
        assert_eq!(bookmark(&library).unwrap().chapter, "1");
    }

    #[test]
    fn test_rename_chapter_moves_bookmark_and_keeps_position() {
        let library = LibraryEdit::set_read_to_index("A", "1", 2).apply_at(sample(), 1);
        let library = LibraryEdit::RenameChapter {
            story: "A".into(),
            from: "1".into(),
            to: "1.5".into(),
        }
        .apply_at(library, 700);

        let story = library.story("A").unwrap();
        let keys: Vec<_> = story.chapters.keys().cloned().collect();
        assert_eq!(keys, vec!["1.5", "2"]);
        let b = story.bookmark.as_ref().unwrap();
        assert_eq!(b.chapter, "1.5");
        assert_eq!(b.read_to_index, Some(2));
        assert_eq!(story.last_modified, 700);
    }

    #[test]
    fn test_rename_chapter_onto_existing_is_noop() {
        let before = sample();
        let after = LibraryEdit::RenameChapter {
            story: "A".into(),
            from: "1".into(),
            to: "2".into(),
        }
        .apply_at(before.clone(), 1);
        assert_eq!(before, after);
    }

    #[test]
    fn test_story_lifecycle() {
        let library = LibraryEdit::AddStory {
            name: "B".into(),
            tags: vec![" t ".into(), "t".into()],
        }
        .apply_at(sample(), 10);
        assert_eq!(library.story("B").unwrap().tags, vec!["t"]);
        assert_eq!(library.story("B").unwrap().last_modified, 10);

        let library = LibraryEdit::RenameStory {
            from: "A".into(),
            to: "B".into(),
        }
        .apply_at(library, 10);
        assert!(library.contains("A"));

        let library = LibraryEdit::RenameStory {
            from: "A".into(),
            to: "C".into(),
        }
        .apply_at(library, 10);
        assert!(!library.contains("A"));
        assert_eq!(library.story("C").unwrap().chapter("1"), Some("one"));

        let library = LibraryEdit::DeleteStory { name: "C".into() }.apply_at(library, 10);
        assert!(!library.contains("C"));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_save_chapter_creates_story_and_handles_tags() {
        let library = LibraryEdit::SaveChapter {
            story: "New".into(),
            chapter: "1".into(),
            text: "hello".into(),
            tags: TagUpdate::Replace(vec!["a".into()]),
        }
        .apply_at(Library::new(), 42);
        let story = library.story("New").unwrap();
        assert_eq!(story.chapter("1"), Some("hello"));
        assert_eq!(story.tags, vec!["a"]);
        assert_eq!(story.last_modified, 42);

        let library = LibraryEdit::SaveChapter {
            story: "New".into(),
            chapter: "1".into(),
            text: "hello again".into(),
            tags: TagUpdate::Merge(vec!["b".into(), "a".into()]),
        }
        .apply_at(library, 43);
        let story = library.story("New").unwrap();
        assert_eq!(story.chapter("1"), Some("hello again"));
        assert_eq!(story.tags, vec!["a", "b"]);

        let library = LibraryEdit::SaveChapter {
            story: "New".into(),
            chapter: "2".into(),
            text: "more".into(),
            tags: TagUpdate::Keep,
        }
        .apply_at(library, 44);
        assert_eq!(library.story("New").unwrap().tags, vec!["a", "b"]);
        assert_eq!(library.story("New").unwrap().last_modified, 44);
    }
}
