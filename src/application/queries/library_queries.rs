//! Library Queries - 书库读模型
//!
//! 读模型都由书库快照纯计算得到，阅读器和 HTTP 查询共用。

use serde::Serialize;

use crate::domain::library::{Bookmark, Library, Story};
use crate::domain::{
    is_paragraph_read, order_chapters_desc, read_to_index_on, split_paragraphs,
    suggest_next_chapter, ChapterIndex,
};

/// 章节缺失时显示的占位文本
pub const CHAPTER_NOT_FOUND: &str = "Chapter content not found.";

/// 列出书（可按标签过滤）
#[derive(Debug, Clone, Default)]
pub struct ListStories {
    pub tag: Option<String>,
}

/// 读取一章
#[derive(Debug, Clone)]
pub struct GetChapter {
    pub story: String,
    pub chapter: String,
}

/// 一本书的章节目录
#[derive(Debug, Clone)]
pub struct ListChapters {
    pub story: String,
}

// ============================================================================
// Read models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    pub name: String,
    pub chapter_count: usize,
    pub last_modified: i64,
    pub tags: Vec<String>,
    pub bookmark: Option<Bookmark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryListing {
    /// 按最近修改时间倒序
    pub stories: Vec<StorySummary>,
    /// 所有书的标签并集（排序）
    pub all_tags: Vec<String>,
}

impl StoryListing {
    pub fn build(library: &Library, tag: Option<&str>) -> Self {
        let mut stories: Vec<StorySummary> = library
            .stories()
            .filter(|(_, story)| tag.map_or(true, |t| story.tags.iter().any(|x| x == t)))
            .map(|(name, story)| StorySummary {
                name: name.clone(),
                chapter_count: story.chapters.len(),
                last_modified: story.last_modified,
                tags: story.tags.clone(),
                bookmark: story.bookmark.clone(),
            })
            .collect();
        stories.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));

        let mut all_tags: Vec<String> = library
            .stories()
            .flat_map(|(_, story)| story.tags.iter().cloned())
            .collect();
        all_tags.sort();
        all_tags.dedup();

        Self { stories, all_tags }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphView {
    pub index: usize,
    pub text: String,
    pub read: bool,
}

/// 阅读视图
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterView {
    pub story: String,
    pub chapter: String,
    pub found: bool,
    pub paragraphs: Vec<ParagraphView>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub chapters: Vec<String>,
    pub bookmark: Option<Bookmark>,
    pub read_to_index: Option<usize>,
}

impl ChapterView {
    pub fn build(story_name: &str, story: Option<&Story>, chapter: &str, index: &ChapterIndex) -> Self {
        let bookmark = story.and_then(|s| s.bookmark.as_ref());
        let text = story.and_then(|s| s.chapter(chapter));

        let paragraphs = split_paragraphs(text.unwrap_or(CHAPTER_NOT_FOUND))
            .into_iter()
            .enumerate()
            .map(|(i, p)| ParagraphView {
                index: i,
                text: p.to_string(),
                read: is_paragraph_read(bookmark, chapter, i),
            })
            .collect();

        Self {
            story: story_name.to_string(),
            chapter: chapter.to_string(),
            found: text.is_some(),
            paragraphs,
            prev: index.prev().map(str::to_string),
            next: index.next().map(str::to_string),
            chapters: index.ordered().to_vec(),
            bookmark: bookmark.cloned(),
            read_to_index: read_to_index_on(bookmark, chapter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterEntry {
    pub id: String,
    pub bookmarked: bool,
}

/// 章节目录（倒序，最新在前）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterListView {
    pub story: String,
    pub chapters: Vec<ChapterEntry>,
    pub bookmark: Option<Bookmark>,
    pub suggested_next: String,
}

impl ChapterListView {
    pub fn build(story_name: &str, story: &Story) -> Self {
        let bookmark = story.bookmark.as_ref();
        let chapters = order_chapters_desc(story.chapters.keys())
            .into_iter()
            .map(|id| ChapterEntry {
                bookmarked: bookmark.is_some_and(|b| b.is_on(&id)),
                id,
            })
            .collect();

        Self {
            story: story_name.to_string(),
            chapters,
            bookmark: bookmark.cloned(),
            suggested_next: suggest_next_chapter(story.chapters.keys()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::LibraryEdit;

    fn library() -> Library {
        let mut library = Library::new();
        library.insert(
            "Old",
            Story::new(100)
                .with_chapter("1", "x")
                .with_tags(vec!["Demo".into(), "Tiên Hiệp".into()]),
        );
        library.insert(
            "Story X",
            Story::new(300)
                .with_chapter("1", "a")
                .with_chapter("2", "p0\n\np1\n\n\np2")
                .with_chapter("10", "c")
                .with_tags(vec!["Demo".into()]),
        );
        library.insert("Empty", Story::new(200).with_tags(vec!["Alpha".into()]));
        library
    }

    #[test]
    fn test_listing_order_and_tags() {
        let listing = StoryListing::build(&library(), None);
        let names: Vec<_> = listing.stories.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Story X", "Empty", "Old"]);
        assert_eq!(listing.all_tags, vec!["Alpha", "Demo", "Tiên Hiệp"]);

        let filtered = StoryListing::build(&library(), Some("Demo"));
        let names: Vec<_> = filtered.stories.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Story X", "Old"]);
        assert_eq!(filtered.all_tags.len(), 3);
    }

    #[test]
    fn test_chapter_view_marks_read_paragraphs() {
        let library = LibraryEdit::set_read_to_index("Story X", "2", 2).apply_at(library(), 1);
        let story = library.story("Story X").unwrap();
        let index = ChapterIndex::build(&story.chapters, "2");
        let view = ChapterView::build("Story X", Some(story), "2", &index);

        assert!(view.found);
        let read: Vec<bool> = view.paragraphs.iter().map(|p| p.read).collect();
        assert_eq!(read, vec![true, true, false]);
        assert_eq!(view.prev.as_deref(), Some("1"));
        assert_eq!(view.next.as_deref(), Some("10"));
        assert_eq!(view.chapters, vec!["1", "2", "10"]);
        assert_eq!(view.read_to_index, Some(2));
    }

    #[test]
    fn test_missing_chapter_uses_placeholder() {
        let library = library();
        let story = library.story("Story X").unwrap();
        let index = ChapterIndex::build(&story.chapters, "99");
        let view = ChapterView::build("Story X", Some(story), "99", &index);

        assert!(!view.found);
        assert_eq!(view.paragraphs.len(), 1);
        assert_eq!(view.paragraphs[0].text, CHAPTER_NOT_FOUND);
        assert_eq!(view.prev, None);
        assert_eq!(view.next, None);
    }

    #[test]
    fn test_chapter_list_descending_with_suggestion() {
        let library = LibraryEdit::set_bookmark("Story X", "2", 0.5).apply_at(library(), 1);
        let view = ChapterListView::build("Story X", library.story("Story X").unwrap());
        let ids: Vec<_> = view.chapters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "2", "1"]);
        assert!(view.chapters[1].bookmarked);
        assert!(!view.chapters[0].bookmarked);
        assert_eq!(view.suggested_next, "11");
    }
}
