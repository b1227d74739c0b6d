//! Library Context - Value Objects
//!
//! 章节号解析与标签规范化

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 解析章节号（与浏览器 `parseFloat` 行为一致）
///
/// 解析规则:
/// - 跳过开头空白
/// - 可选正负号，随后是数字、可选小数部分与指数，或 `Infinity`
/// - 只取最长的合法前缀，例如 `"3b"` → 3，`"10.5话"` → 10.5
/// - 没有合法前缀时返回 `None`（对应 `NaN`）
pub fn parse_chapter_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if digits + frac_digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }

    if digits == 0 {
        return None;
    }

    // 指数部分必须带数字，否则 "1e" 只解析到 "1"
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// 规范化标签：去除首尾空白、丢弃空标签、按首次出现去重
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || result.iter().any(|t| t == tag) {
            continue;
        }
        result.push(tag.to_string());
    }
    result
}

/// 解析逗号分隔的标签输入，例如 `"Tiên Hiệp, Trọng Sinh"`
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}

/// 合并两组标签（并集，保留已有顺序）
pub fn merge_tags(existing: &[String], incoming: &[String]) -> Vec<String> {
    normalize_tags(existing.iter().chain(incoming.iter()))
}

/// 宽松解析标签字段
///
/// 远端文档里的标签可能是数组、被展开成 `{"0": "a"}` 的对象，
/// 或者旧数据里的逗号分隔字符串；其余形态一律视为空列表。
pub(crate) fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let tags = match value {
        Some(Value::Array(items)) => normalize_tags(items.iter().filter_map(Value::as_str)),
        Some(Value::Object(map)) => normalize_tags(map.values().filter_map(Value::as_str)),
        Some(Value::String(raw)) => parse_tag_list(&raw),
        _ => Vec::new(),
    };
    Ok(tags)
}
