//! 阅读进度
//!
//! 把滚动和段落点击映射为书签字段，全部为纯函数。

use super::library::{clamp_fraction, Bookmark};

/// 阅读视图的滚动度量（像素）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// 可滚动的最大偏移
    pub fn max_offset(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// 当前滚动比例；内容不超过视口时恒为 0
    pub fn fraction(&self) -> f64 {
        if self.scroll_height > self.client_height {
            clamp_fraction(self.scroll_top / (self.scroll_height - self.client_height))
        } else {
            0.0
        }
    }

    /// 比例对应的像素偏移
    pub fn offset_for(&self, fraction: f64) -> f64 {
        clamp_fraction(fraction) * self.max_offset()
    }
}

/// 打开章节时对滚动位置的处理
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpenAction {
    /// 书签就在本章：恢复到该比例
    Restore { fraction: f64 },
    /// 回到顶部，并为本章写入新的零位置书签
    ResetToTop,
}

pub fn open_action(bookmark: Option<&Bookmark>, chapter: &str) -> OpenAction {
    match bookmark {
        Some(b) if b.is_on(chapter) => OpenAction::Restore {
            fraction: b.scroll_position,
        },
        _ => OpenAction::ResetToTop,
    }
}

/// 段落点击导致的进度变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressChange {
    /// 前 n 段已读
    ReadTo(usize),
    /// 清除进度
    Clear,
}

impl ProgressChange {
    /// 写入书库时使用的下标（0 表示清除）
    pub fn as_index(self) -> usize {
        match self {
            Self::ReadTo(n) => n,
            Self::Clear => 0,
        }
    }
}

/// 当前章节的已读进度
pub fn read_to_index_on(bookmark: Option<&Bookmark>, chapter: &str) -> Option<usize> {
    bookmark
        .filter(|b| b.is_on(chapter))
        .and_then(|b| b.read_to_index)
}

/// 点击第 `index` 段：再次点击进度边界那一段时清除，否则读到这一段为止
pub fn click_paragraph(bookmark: Option<&Bookmark>, chapter: &str, index: usize) -> ProgressChange {
    match read_to_index_on(bookmark, chapter) {
        Some(read_to) if index + 1 == read_to => ProgressChange::Clear,
        _ => ProgressChange::ReadTo(index + 1),
    }
}

/// 第 `index` 段是否显示为已读
pub fn is_paragraph_read(bookmark: Option<&Bookmark>, chapter: &str, index: usize) -> bool {
    read_to_index_on(bookmark, chapter).is_some_and(|read_to| index < read_to)
}

/// 书签按钮
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookmarkToggle {
    Remove,
    Place { scroll_position: f64 },
}

pub fn toggle_bookmark(bookmark: Option<&Bookmark>, chapter: &str, current_fraction: f64) -> BookmarkToggle {
    match bookmark {
        Some(b) if b.is_on(chapter) => BookmarkToggle::Remove,
        _ => BookmarkToggle::Place {
            scroll_position: clamp_fraction(current_fraction),
        },
    }
}
