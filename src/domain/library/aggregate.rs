//! Library Context - Aggregate Root

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::value_objects::deserialize_tags;
use super::Bookmark;

/// 书库聚合根 - 整个同步文档
///
/// 不变量:
/// - 书名唯一且区分大小写
/// - 展示顺序由 last_modified 推导，与插入顺序无关
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Library {
    stories: IndexMap<String, Story>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn story(&self, name: &str) -> Option<&Story> {
        self.stories.get(name)
    }

    pub fn story_mut(&mut self, name: &str) -> Option<&mut Story> {
        self.stories.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stories.contains_key(name)
    }

    /// 插入或覆盖一本书
    pub fn insert(&mut self, name: impl Into<String>, story: Story) {
        self.stories.insert(name.into(), story);
    }

    /// 删除一本书（保持其余书的插入顺序）
    pub fn remove(&mut self, name: &str) -> Option<Story> {
        self.stories.shift_remove(name)
    }

    pub fn stories(&self) -> impl Iterator<Item = (&String, &Story)> {
        self.stories.iter()
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

impl FromIterator<(String, Story)> for Library {
    fn from_iter<T: IntoIterator<Item = (String, Story)>>(iter: T) -> Self {
        Self {
            stories: iter.into_iter().collect(),
        }
    }
}

/// 一本书
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// 章节 ID → 正文，保持插入顺序，序列化为 JSON 对象
    #[serde(default)]
    pub chapters: IndexMap<String, String>,
    /// 最近一次章节或标签变更的时间（毫秒）
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub last_modified: i64,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_bookmark"
    )]
    pub bookmark: Option<Bookmark>,
}

impl Story {
    pub fn new(now_ms: i64) -> Self {
        Self {
            last_modified: now_ms,
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_chapter(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.chapters.insert(id.into(), text.into());
        self
    }

    pub fn chapter(&self, id: &str) -> Option<&str> {
        self.chapters.get(id).map(String::as_str)
    }

    pub fn has_chapter(&self, id: &str) -> bool {
        self.chapters.contains_key(id)
    }

    pub fn touch(&mut self, now_ms: i64) {
        self.last_modified = now_ms;
    }

    /// 放置书签；切换章节时丢弃已读进度
    pub fn place_bookmark(&mut self, chapter: &str, scroll_position: f64) {
        match self.bookmark.as_mut() {
            Some(bookmark) => {
                if !bookmark.is_on(chapter) {
                    bookmark.read_to_index = None;
                    bookmark.chapter = chapter.to_string();
                }
                bookmark.scroll_position = super::clamp_fraction(scroll_position);
            }
            None => self.bookmark = Some(Bookmark::new(chapter, scroll_position)),
        }
    }

    /// 设置已读进度；`index == 0` 表示清除
    ///
    /// 清除时不会创建书签；设置时会把书签移到该章节（保留滚动位置）
    pub fn mark_read_to(&mut self, chapter: &str, index: usize) {
        if index == 0 {
            if let Some(bookmark) = self.bookmark.as_mut() {
                bookmark.read_to_index = None;
            }
            return;
        }

        match self.bookmark.as_mut() {
            Some(bookmark) => {
                bookmark.chapter = chapter.to_string();
                bookmark.read_to_index = Some(index);
            }
            None => {
                self.bookmark = Some(Bookmark::new(chapter, 0.0).with_read_to_index(index));
            }
        }
    }

    /// 删除书签，返回是否真的删除了
    pub fn remove_bookmark(&mut self) -> bool {
        self.bookmark.take().is_some()
    }

    pub fn bookmark_on(&self, chapter: &str) -> Option<&Bookmark> {
        self.bookmark.as_ref().filter(|b| b.is_on(chapter))
    }
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let millis = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    };
    Ok(millis)
}

fn deserialize_bookmark<'de, D>(deserializer: D) -> Result<Option<Bookmark>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let bookmark = match value {
        Some(value @ Value::Object(_)) => match serde_json::from_value::<Bookmark>(value) {
            Ok(bookmark) => Some(bookmark),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed bookmark");
                None
            }
        },
        _ => None,
    };
    Ok(bookmark)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_decodes_with_defaults() {
        let story: Story = serde_json::from_str(r#"{"lastModified": 12}"#).unwrap();
        assert!(story.chapters.is_empty());
        assert!(story.tags.is_empty());
        assert!(story.bookmark.is_none());
        assert_eq!(story.last_modified, 12);
    }

    #[test]
    fn test_chapters_keep_insertion_order() {
        let story: Story =
            serde_json::from_str(r#"{"chapters":{"10":"j","2":"b","1":"a"},"lastModified":1}"#)
                .unwrap();
        let keys: Vec<_> = story.chapters.keys().cloned().collect();
        assert_eq!(keys, vec!["10", "2", "1"]);

        let json = serde_json::to_value(&story).unwrap();
        assert!(json["chapters"].is_object());
    }

    #[test]
    fn test_tags_from_flattened_object() {
        let story: Story =
            serde_json::from_str(r#"{"tags":{"0":"Tiên Hiệp","1":"Demo"}}"#).unwrap();
        assert_eq!(story.tags, vec!["Tiên Hiệp", "Demo"]);

        let story: Story = serde_json::from_str(r#"{"tags":"a, b"}"#).unwrap();
        assert_eq!(story.tags, vec!["a", "b"]);

        let story: Story = serde_json::from_str(r#"{"tags":42}"#).unwrap();
        assert!(story.tags.is_empty());
    }

    #[test]
    fn test_malformed_bookmark_is_dropped() {
        let story: Story = serde_json::from_str(r#"{"bookmark":{"scrollPosition":0.5}}"#).unwrap();
        assert!(story.bookmark.is_none());
    }

    #[test]
    fn test_place_bookmark_drops_progress_on_chapter_change() {
        let mut story = Story::new(0);
        story.mark_read_to("1", 3);
        story.place_bookmark("1", 0.4);
        assert_eq!(story.bookmark.as_ref().unwrap().read_to_index, Some(3));

        story.place_bookmark("2", 0.1);
        let bookmark = story.bookmark.as_ref().unwrap();
        assert_eq!(bookmark.chapter, "2");
        assert_eq!(bookmark.read_to_index, None);
        assert_eq!(bookmark.scroll_position, 0.1);
    }

    #[test]
    fn test_library_is_transparent_object() {
        let mut library = Library::new();
        library.insert("A", Story::new(5));
        let json = serde_json::to_value(&library).unwrap();
        assert_eq!(json["A"]["lastModified"], 5);

        let decoded: Library = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, library);
    }
}
