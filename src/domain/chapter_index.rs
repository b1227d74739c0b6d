//! 章节索引
//!
//! 章节号由用户随手输入（"1"、"10.5"、"3b"），键的插入顺序不可信，
//! 阅读顺序按数值推导。

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::library::parse_chapter_number;

/// 排序比较：可解析的按数值升序，不可解析的排在最后
fn compare_ids(a: &Option<f64>, b: &Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 按章节号升序排列（稳定排序，相等时保持插入顺序）
pub fn order_chapters<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut keyed: Vec<(Option<f64>, &String)> = ids
        .into_iter()
        .map(|id| (parse_chapter_number(id), id))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_ids(a, b));
    keyed.into_iter().map(|(_, id)| id.clone()).collect()
}

/// 目录页使用的倒序
pub fn order_chapters_desc<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut ordered = order_chapters(ids);
    ordered.reverse();
    ordered
}

/// 建议的下一章：`floor(最大章节号) + 1`，没有可解析章节时为 "1"
pub fn suggest_next_chapter<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    ids.into_iter()
        .filter_map(|id| parse_chapter_number(id))
        .filter(|n| n.is_finite())
        .fold(None, |max: Option<f64>, n| Some(max.map_or(n, |m| m.max(n))))
        .map(increment)
        .unwrap_or_else(|| "1".to_string())
}

/// 紧随给定章节号的下一章：`floor(prev) + 1`，无法解析时为空
pub fn following_chapter(previous: &str) -> Option<String> {
    parse_chapter_number(previous)
        .filter(|n| n.is_finite())
        .map(increment)
}

/// `floor(n) + 1` 的十进制文本；超出整数精度的大数按浮点原样输出，不会溢出
fn increment(n: f64) -> String {
    format!("{}", n.floor() + 1.0)
}

/// 有序章节列表及当前章节位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterIndex {
    ordered: Vec<String>,
    position: Option<usize>,
}

impl ChapterIndex {
    pub fn build(chapters: &IndexMap<String, String>, current: &str) -> Self {
        let ordered = order_chapters(chapters.keys());
        let position = ordered.iter().position(|id| id == current);
        Self { ordered, position }
    }

    pub fn ordered(&self) -> &[String] {
        &self.ordered
    }

    pub fn current(&self) -> Option<&str> {
        self.position.map(|i| self.ordered[i].as_str())
    }

    pub fn prev(&self) -> Option<&str> {
        let i = self.position?;
        i.checked_sub(1).map(|p| self.ordered[p].as_str())
    }

    pub fn next(&self) -> Option<&str> {
        let i = self.position?;
        self.ordered.get(i + 1).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// 记忆化的章节索引
///
/// 仅在章节键集合或当前章节变化时重建，正文变化不触发重建。
#[derive(Debug, Default)]
pub struct ChapterIndexMemo {
    key: Option<(Vec<String>, String)>,
    index: Option<ChapterIndex>,
}

impl ChapterIndexMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, chapters: &IndexMap<String, String>, current: &str) -> &ChapterIndex {
        let fresh = match &self.key {
            Some((keys, cur)) => {
                cur == current
                    && keys.len() == chapters.len()
                    && keys.iter().zip(chapters.keys()).all(|(a, b)| a == b)
            }
            None => false,
        };

        if !fresh || self.index.is_none() {
            tracing::trace!(current, chapters = chapters.len(), "Rebuilding chapter index");
            self.key = Some((chapters.keys().cloned().collect(), current.to_string()));
            self.index = Some(ChapterIndex::build(chapters, current));
        }

        self.index.get_or_insert_with(|| ChapterIndex::build(chapters, current))
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.index = None;
    }
}
