//! 段落切分
//!
//! 一个或多个空行分隔段落（`\n\s*\n`），切分后只含空白的段落被丢弃。
//! 段落下标即已读进度使用的下标，所以切分规则必须稳定。

/// 切分段落，返回原文切片（保留段内首尾空白）
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('\n') {
        let nl = cursor + offset;
        match blank_run_end(text, nl) {
            Some(end) => {
                push_paragraph(&mut paragraphs, &text[start..nl]);
                start = end;
                cursor = end;
            }
            None => cursor = nl + 1,
        }
    }

    push_paragraph(&mut paragraphs, &text[start..]);
    paragraphs
}

/// 段落数量
pub fn paragraph_count(text: &str) -> usize {
    split_paragraphs(text).len()
}

/// 从 `nl` 处的换行开始向后扫描空白，
/// 若空白串中还有另一个换行，返回最后一个换行之后的位置
fn blank_run_end(text: &str, nl: usize) -> Option<usize> {
    let mut last_newline = None;
    for (offset, ch) in text[nl + 1..].char_indices() {
        if !ch.is_whitespace() {
            break;
        }
        if ch == '\n' {
            last_newline = Some(nl + 1 + offset);
        }
    }
    last_newline.map(|pos| pos + 1)
}

#[inline]
fn push_paragraph<'a>(paragraphs: &mut Vec<&'a str>, candidate: &'a str) {
    if !candidate.trim().is_empty() {
        paragraphs.push(candidate);
    }
}
