//! Library Context - Entities

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 把任意浮点值夹到 [0, 1]，NaN 视为 0
pub fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// 书签 - 每本书至多一个
///
/// 不变量:
/// - scroll_position 始终在 [0, 1]
/// - read_to_index 存在时 >= 1（0 表示"无进度"，以字段缺失表达）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// 书签所在章节 ID
    pub chapter: String,
    /// 章节内滚动比例
    #[serde(default, deserialize_with = "deserialize_fraction")]
    pub scroll_position: f64,
    /// 已读到的段落数（前 n 段已读）
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_read_to_index"
    )]
    pub read_to_index: Option<usize>,
}

impl Bookmark {
    pub fn new(chapter: impl Into<String>, scroll_position: f64) -> Self {
        Self {
            chapter: chapter.into(),
            scroll_position: clamp_fraction(scroll_position),
            read_to_index: None,
        }
    }

    pub fn with_read_to_index(mut self, read_to_index: usize) -> Self {
        self.read_to_index = (read_to_index > 0).then_some(read_to_index);
        self
    }

    pub fn is_on(&self, chapter: &str) -> bool {
        self.chapter == chapter
    }
}

fn deserialize_fraction<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_f64)
        .map(clamp_fraction)
        .unwrap_or(0.0))
}

fn deserialize_read_to_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let index = value
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n >= 1.0)
        .map(|n| n.trunc() as usize);
    Ok(index)
}
