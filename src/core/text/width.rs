//! Display width of styled terminal text.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 3;

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    if emoji_get(grapheme).is_some() {
        return 2;
    }
    grapheme
        .chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

/// Byte length of the escape sequence starting at `idx`, if any.
///
/// Covers CSI (`ESC [ ... final`), OSC (`ESC ] ... BEL|ST`) and APC
/// (`ESC _ ... BEL|ST`); the cursor marker is an APC sequence.
pub fn escape_len(input: &str, idx: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(idx) != Some(&0x1b) {
        return None;
    }
    match bytes.get(idx + 1)? {
        b'[' => {
            let end = bytes[idx + 2..]
                .iter()
                .position(|b| (0x40..=0x7e).contains(b))?;
            Some(end + 3)
        }
        b']' | b'_' => {
            let mut pos = idx + 2;
            while pos < bytes.len() {
                if bytes[pos] == 0x07 {
                    return Some(pos + 1 - idx);
                }
                if bytes[pos] == 0x1b && bytes.get(pos + 1) == Some(&b'\\') {
                    return Some(pos + 2 - idx);
                }
                pos += 1;
            }
            None
        }
        _ => None,
    }
}

/// Strips escape sequences, keeping only printable text.
pub fn strip_escapes(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = escape_len(input, idx) {
            idx += len;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}

pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }
    strip_escapes(input).graphemes(true).map(grapheme_width).sum()
}

/// Cuts plain text to `max_width` columns, appending `ellipsis` when cut.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if visible_width(text) <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(visible_width(ellipsis));
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let width = grapheme_width(grapheme);
        if used + width > budget {
            break;
        }
        out.push_str(grapheme);
        used += width;
    }
    out.push_str(ellipsis);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cursor::CURSOR_MARKER;

    #[test]
    fn escapes_are_ignored_in_width() {
        assert_eq!(visible_width("hi\x1b[31m!!\x1b[0m"), 4);
        assert_eq!(visible_width(&format!("ab{CURSOR_MARKER}c")), 3);
        assert_eq!(visible_width("\x1b]8;;https://example.com\x07link\x1b]8;;\x07"), 4);
    }

    #[test]
    fn emoji_prefixes_are_double_width() {
        assert_eq!(visible_width("✨joke"), 6);
        assert_eq!(visible_width("😄"), 2);
    }

    #[test]
    fn truncation_respects_width_and_ellipsis() {
        assert_eq!(truncate_to_width("mention", 5, "…"), "ment…");
        assert_eq!(truncate_to_width("memo", 5, "…"), "memo");
    }
}
