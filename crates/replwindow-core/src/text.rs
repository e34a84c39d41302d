//! Line utilities shared by the composer and the window.
//!
//! All positions are byte offsets into UTF-8 text. Line breaks are `\r\n`, `\r`
//! or `\n`; the window itself only ever inserts its configured newline.

use std::ops::Range;

/// One line of text queued for submission, as produced by [`split_lines`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    /// The line's text without its line break.
    pub text: String,
    /// Whether the line was terminated by a line break.
    pub has_newline: bool,
}

impl PendingInput {
    pub fn new(text: impl Into<String>, has_newline: bool) -> Self {
        Self {
            text: text.into(),
            has_newline,
        }
    }
}

/// Splits text into lines, recognising `\r\n`, `\r` and `\n` as line breaks.
///
/// Every line except possibly the last reports `has_newline`. A trailing
/// fragment without a break is kept; an empty trailing fragment is not.
///
/// # Examples
///
/// ```
/// use replwindow_core::text::split_lines;
///
/// let lines = split_lines("foo(\r\n1)\n2");
/// assert_eq!(lines.len(), 3);
/// assert_eq!(lines[0].text, "foo(");
/// assert!(lines[1].has_newline);
/// assert!(!lines[2].has_newline);
/// ```
pub fn split_lines(text: &str) -> Vec<PendingInput> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(PendingInput::new(&text[start..i], true));
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(PendingInput::new(&text[start..i], true));
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < text.len() {
        lines.push(PendingInput::new(&text[start..], false));
    }
    lines
}

/// Byte offsets at which each line of `text` starts. Always contains `0`.
pub fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                starts.push(i + 2);
                i += 1;
            }
            b'\r' | b'\n' => starts.push(i + 1),
            _ => {}
        }
        i += 1;
    }
    starts
}

/// Zero-based line number containing `position`.
pub fn line_number_at(starts: &[usize], position: usize) -> usize {
    match starts.binary_search(&position) {
        Ok(line) => line,
        Err(next) => next.saturating_sub(1),
    }
}

/// Extent of `line` excluding its line break, or `None` past the last line.
pub fn line_extent(text: &str, starts: &[usize], line: usize) -> Option<Range<usize>> {
    let start = *starts.get(line)?;
    let end = match starts.get(line + 1) {
        Some(&next) => next - break_len_before(text, next),
        None => text.len(),
    };
    Some(start..end)
}

/// Extent of `line` including its line break.
pub fn line_extent_with_break(starts: &[usize], text_len: usize, line: usize) -> Option<Range<usize>> {
    let start = *starts.get(line)?;
    let end = starts.get(line + 1).copied().unwrap_or(text_len);
    Some(start..end)
}

fn break_len_before(text: &str, position: usize) -> usize {
    let bytes = text.as_bytes();
    if position >= 2 && &bytes[position - 2..position] == b"\r\n" {
        2
    } else {
        1
    }
}

/// Start of the character (or `\r\n` pair) ending at `position`.
pub fn previous_boundary(text: &str, position: usize) -> Option<usize> {
    if position == 0 {
        return None;
    }
    if position >= 2 && &text.as_bytes()[position - 2..position] == b"\r\n" {
        return Some(position - 2);
    }
    text[..position].char_indices().next_back().map(|(i, _)| i)
}

/// End of the character (or `\r\n` pair) starting at `position`.
pub fn next_boundary(text: &str, position: usize) -> Option<usize> {
    let rest = text.get(position..)?;
    if rest.starts_with("\r\n") {
        return Some(position + 2);
    }
    rest.chars().next().map(|c| position + c.len_utf8())
}

/// Clamps `position` to the text and moves it back onto a character boundary.
pub fn floor_boundary(text: &str, position: usize) -> usize {
    let mut position = position.min(text.len());
    while !text.is_char_boundary(position) {
        position -= 1;
    }
    position
}

/// Removes every trailing occurrence of `newline` from `text`.
pub fn trim_trailing_newlines<'a>(text: &'a str, newline: &str) -> &'a str {
    let mut text = text;
    while !newline.is_empty() && text.ends_with(newline) {
        text = &text[..text.len() - newline.len()];
    }
    text
}
