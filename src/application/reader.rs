//! Reader Controller - 阅读视图控制器
//!
//! 组合章节索引、阅读进度与同步网关：
//! - 打开章节时恢复或重置滚动位置
//! - 滚动静默后保存位置（防抖）
//! - 段落点击切换已读进度
//! - 书签按钮

use std::time::Duration;

use crate::application::error::ApplicationError;
use crate::application::queries::ChapterView;
use crate::application::sync::{Debouncer, SyncGateway};
use crate::domain::library::LibraryEdit;
use crate::domain::{
    click_paragraph, open_action, toggle_bookmark, BookmarkToggle, ChapterIndexMemo, OpenAction,
    ProgressChange, ScrollMetrics,
};

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// 滚动静默多久后保存位置
    pub scroll_debounce: Duration,
    /// 恢复滚动前等待内容布局的时间
    pub restore_delay: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            scroll_debounce: Duration::from_millis(500),
            restore_delay: Duration::from_millis(100),
        }
    }
}

/// 打开章节后视图应执行的滚动
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollInstruction {
    /// 等待 `delay` 后滚动到 `fraction` 处
    RestoreAfter { delay: Duration, fraction: f64 },
    /// 立即回到顶部
    Top,
}

impl ScrollInstruction {
    /// 按当前度量换算出目标偏移
    pub fn offset(&self, metrics: &ScrollMetrics) -> f64 {
        match self {
            Self::RestoreAfter { fraction, .. } => metrics.offset_for(*fraction),
            Self::Top => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenChapter {
    story: String,
    chapter: String,
}

pub struct ReaderController {
    gateway: SyncGateway,
    config: ReaderConfig,
    debounce: Debouncer,
    memo: ChapterIndexMemo,
    open: Option<OpenChapter>,
}

impl ReaderController {
    pub fn new(gateway: SyncGateway, config: ReaderConfig) -> Self {
        let debounce = Debouncer::new(config.scroll_debounce);
        Self {
            gateway,
            config,
            debounce,
            memo: ChapterIndexMemo::new(),
            open: None,
        }
    }

    pub fn current(&self) -> Option<(&str, &str)> {
        self.open
            .as_ref()
            .map(|o| (o.story.as_str(), o.chapter.as_str()))
    }

    fn require_open(&self) -> Result<&OpenChapter, ApplicationError> {
        self.open
            .as_ref()
            .ok_or_else(|| ApplicationError::validation("no chapter is open"))
    }

    /// 打开章节
    ///
    /// 书签就在本章时恢复位置；否则回到顶部并为本章写入零位置书签。
    /// 写入失败只记录日志。
    pub async fn open_chapter(&mut self, story: &str, chapter: &str) -> ScrollInstruction {
        self.debounce.cancel();
        self.open = Some(OpenChapter {
            story: story.to_string(),
            chapter: chapter.to_string(),
        });

        let library = self.gateway.snapshot();
        let entry = library.story(story);

        match open_action(entry.and_then(|s| s.bookmark.as_ref()), chapter) {
            OpenAction::Restore { fraction } => {
                tracing::debug!(story, chapter, fraction, "Restoring scroll position");
                ScrollInstruction::RestoreAfter {
                    delay: self.config.restore_delay,
                    fraction,
                }
            }
            OpenAction::ResetToTop => {
                if entry.is_some() {
                    let edit = LibraryEdit::set_bookmark(story, chapter, 0.0);
                    if let Err(e) = self.gateway.apply(&edit).await {
                        tracing::warn!(story, chapter, error = %e, "Failed to reset bookmark");
                    }
                }
                ScrollInstruction::Top
            }
        }
    }

    /// 上报滚动；静默一段时间后保存位置
    pub fn on_scroll(&self, metrics: ScrollMetrics) {
        let Some(open) = self.open.as_ref() else {
            return;
        };

        let edit = LibraryEdit::set_bookmark(&open.story, &open.chapter, metrics.fraction());
        let gateway = self.gateway.clone();
        self.debounce.arm(async move {
            if let Err(e) = gateway.apply(&edit).await {
                tracing::warn!(error = %e, "Failed to save scroll position");
            }
        });
    }

    /// 点击第 `index` 段
    pub async fn click_paragraph(&self, index: usize) -> Result<ProgressChange, ApplicationError> {
        let open = self.require_open()?;
        let library = self.gateway.snapshot();
        let bookmark = library
            .story(&open.story)
            .and_then(|s| s.bookmark.as_ref());

        let change = click_paragraph(bookmark, &open.chapter, index);
        let edit = LibraryEdit::set_read_to_index(&open.story, &open.chapter, change.as_index());
        if let Err(e) = self.gateway.apply(&edit).await {
            tracing::warn!(index, error = %e, "Failed to save reading progress");
        }
        Ok(change)
    }

    /// 书签按钮：本章已有书签则删除，否则在当前位置放置
    pub async fn toggle_bookmark(&self, metrics: ScrollMetrics) -> Result<BookmarkToggle, ApplicationError> {
        let open = self.require_open()?;
        let library = self.gateway.snapshot();
        let bookmark = library
            .story(&open.story)
            .and_then(|s| s.bookmark.as_ref());

        let toggle = toggle_bookmark(bookmark, &open.chapter, metrics.fraction());
        let edit = match toggle {
            BookmarkToggle::Remove => LibraryEdit::remove_bookmark(&open.story),
            BookmarkToggle::Place { scroll_position } => {
                LibraryEdit::set_bookmark(&open.story, &open.chapter, scroll_position)
            }
        };
        if let Err(e) = self.gateway.apply(&edit).await {
            tracing::warn!(error = %e, "Failed to toggle bookmark");
        }
        Ok(toggle)
    }

    /// 当前章节的阅读视图
    pub fn view(&mut self) -> Option<ChapterView> {
        let open = self.open.as_ref()?;
        let library = self.gateway.snapshot();
        let story = library.story(&open.story);

        let view = match story {
            Some(s) => {
                let index = self.memo.get(&s.chapters, &open.chapter);
                ChapterView::build(&open.story, Some(s), &open.chapter, index)
            }
            None => {
                self.memo.invalidate();
                let index = self.memo.get(&Default::default(), &open.chapter);
                ChapterView::build(&open.story, None, &open.chapter, index)
            }
        };
        Some(view)
    }

    /// 是否有待保存的滚动位置
    pub fn has_pending_save(&self) -> bool {
        self.debounce.is_armed()
    }

    /// 关闭阅读器，丢弃未触发的保存
    pub fn close(&mut self) {
        if self.debounce.cancel() {
            tracing::debug!("Pending scroll save discarded");
        }
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sync::GatewayConfig;
    use crate::domain::library::{Bookmark, Library, Story};
    use crate::infrastructure::memory::InMemoryLibraryStore;
    use std::sync::Arc;

    fn story_x() -> Library {
        let mut library = Library::new();
        library.insert(
            "Story X",
            Story::new(1)
                .with_chapter("1", "a")
                .with_chapter("2", "p0\n\np1\n\np2")
                .with_chapter("10", "c"),
        );
        library
    }

    fn reader(library: Library) -> (ReaderController, SyncGateway) {
        let gateway = SyncGateway::new(
            Arc::new(InMemoryLibraryStore::with_library(library.clone())),
            GatewayConfig::default(),
        );
        gateway.receive_remote(Arc::new(library));
        (ReaderController::new(gateway.clone(), ReaderConfig::default()), gateway)
    }

    fn bookmark(gateway: &SyncGateway) -> Option<Bookmark> {
        gateway
            .snapshot()
            .story("Story X")
            .and_then(|s| s.bookmark.clone())
    }

    #[tokio::test]
    async fn test_opening_other_chapter_resets_bookmark() {
        let mut library = story_x();
        if let Some(story) = library.story_mut("Story X") {
            story.bookmark = Some(Bookmark::new("2", 0.1).with_read_to_index(3));
        }
        let (mut reader, gateway) = reader(library);

        let instruction = reader.open_chapter("Story X", "10").await;
        assert_eq!(instruction, ScrollInstruction::Top);
        assert_eq!(bookmark(&gateway), Some(Bookmark::new("10", 0.0)));
    }

    #[tokio::test]
    async fn test_opening_bookmarked_chapter_restores() {
        let mut library = story_x();
        if let Some(story) = library.story_mut("Story X") {
            story.bookmark = Some(Bookmark::new("2", 0.25));
        }
        let (mut reader, _) = reader(library);

        let instruction = reader.open_chapter("Story X", "2").await;
        assert_eq!(
            instruction,
            ScrollInstruction::RestoreAfter {
                delay: Duration::from_millis(100),
                fraction: 0.25
            }
        );
        assert_eq!(instruction.offset(&ScrollMetrics::new(0.0, 900.0, 100.0)), 200.0);
    }

    #[tokio::test]
    async fn test_click_without_bookmark_starts_progress() {
        let (mut reader, gateway) = reader(story_x());
        reader.open_chapter("Story X", "2").await;

        let change = reader.click_paragraph(0).await.unwrap();
        assert_eq!(change, ProgressChange::ReadTo(1));
        assert_eq!(
            bookmark(&gateway),
            Some(Bookmark::new("2", 0.0).with_read_to_index(1))
        );

        let change = reader.click_paragraph(0).await.unwrap();
        assert_eq!(change, ProgressChange::Clear);
        assert_eq!(bookmark(&gateway).unwrap().read_to_index, None);

        let view = reader.view().unwrap();
        assert_eq!(view.paragraphs.len(), 3);
        assert!(view.paragraphs.iter().all(|p| !p.read));
        assert_eq!(view.prev.as_deref(), Some("1"));
        assert_eq!(view.next.as_deref(), Some("10"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_is_saved_after_quiet_period() {
        let (mut reader, gateway) = reader(story_x());
        reader.open_chapter("Story X", "2").await;

        reader.on_scroll(ScrollMetrics::new(100.0, 500.0, 100.0));
        tokio::time::sleep(Duration::from_millis(200)).await;
        reader.on_scroll(ScrollMetrics::new(200.0, 500.0, 100.0));
        assert!(reader.has_pending_save());
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(bookmark(&gateway).unwrap().scroll_position, 0.0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(bookmark(&gateway).unwrap().scroll_position, 0.5);
        assert!(!reader.has_pending_save());
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_chapter_cancels_pending_save() {
        let (mut reader, gateway) = reader(story_x());
        reader.open_chapter("Story X", "2").await;

        reader.on_scroll(ScrollMetrics::new(300.0, 500.0, 100.0));
        reader.open_chapter("Story X", "10").await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(bookmark(&gateway), Some(Bookmark::new("10", 0.0)));

        reader.on_scroll(ScrollMetrics::new(300.0, 500.0, 100.0));
        reader.close();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(bookmark(&gateway).unwrap().scroll_position, 0.0);
    }

    #[tokio::test]
    async fn test_toggle_bookmark() {
        let (mut reader, gateway) = reader(story_x());
        reader.open_chapter("Story X", "1").await;

        let metrics = ScrollMetrics::new(50.0, 200.0, 100.0);
        assert_eq!(
            reader.toggle_bookmark(metrics).await.unwrap(),
            BookmarkToggle::Remove
        );
        assert!(bookmark(&gateway).is_none());

        assert_eq!(
            reader.toggle_bookmark(metrics).await.unwrap(),
            BookmarkToggle::Place { scroll_position: 0.5 }
        );
        assert_eq!(bookmark(&gateway).unwrap().scroll_position, 0.5);
    }

    #[tokio::test]
    async fn test_missing_story_renders_placeholder() {
        let (mut reader, gateway) = reader(story_x());
        assert!(reader.click_paragraph(0).await.is_err());

        assert_eq!(reader.open_chapter("Ghost", "1").await, ScrollInstruction::Top);
        assert!(!gateway.snapshot().contains("Ghost"));
        let view = reader.view().unwrap();
        assert!(!view.found);
    }
}
