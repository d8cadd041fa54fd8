//! Trigger detection over the text before the cursor.

use crate::core::document::Document;

pub const TRIGGER: &str = "<>";
/// Length of [`TRIGGER`] in document positions.
pub const TRIGGER_LEN: usize = 2;
/// Characters before the cursor that detection looks at.
pub const DETECTION_WINDOW: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    /// Position right after the trigger, where the query starts.
    pub anchor: usize,
    pub query: String,
}

/// Detects an open trigger in `text_before_cursor`.
///
/// Only the last [`DETECTION_WINDOW`] characters on the cursor's line are
/// considered. The match is the longest suffix of that line that starts with
/// [`TRIGGER`], so `<>a<>b` yields the query `a<>b`.
pub fn detect(text_before_cursor: &str, cursor: usize) -> Option<TriggerMatch> {
    let chars: Vec<char> = text_before_cursor.chars().collect();
    let window = &chars[chars.len().saturating_sub(DETECTION_WINDOW)..];
    let line_start = window
        .iter()
        .rposition(|ch| *ch == '\n')
        .map(|idx| idx + 1)
        .unwrap_or(0);
    let line: String = window[line_start..].iter().collect();

    let trigger_at = line.find(TRIGGER)?;
    let query = line[trigger_at + TRIGGER.len()..].to_string();
    let query_len = query.chars().count();
    let anchor = cursor.checked_sub(query_len)?;
    Some(TriggerMatch { anchor, query })
}

/// Runs [`detect`] against the document text before `cursor`.
pub fn detect_in(doc: &Document, cursor: usize) -> Option<TriggerMatch> {
    detect(&doc.line_text_before(cursor, DETECTION_WINDOW), cursor)
}
