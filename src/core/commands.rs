//! Default editing commands.
//!
//! Each command inspects a state and returns the transaction that performs
//! it, or `None` when it does not apply. Nothing here knows about mentions;
//! the autocomplete layer runs its own handlers before these.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::document::{Inline, ResolvedPos};
use crate::core::state::{EditorState, Selection};
use crate::core::transform::Transaction;
use crate::error::DocumentError;

/// Replaces the selection with `text`, leaving the cursor after it.
pub fn insert_text(state: &EditorState, text: &str) -> Result<Transaction, DocumentError> {
    let selection = state.selection();
    let mut tr = state.tr();
    tr.replace(
        selection.from(),
        selection.to(),
        Inline::from_plain_text(text),
    )?;
    Ok(tr)
}

pub fn insert_hard_break(state: &EditorState) -> Result<Transaction, DocumentError> {
    let selection = state.selection();
    let mut tr = state.tr();
    tr.replace(selection.from(), selection.to(), vec![Inline::HardBreak])?;
    Ok(tr)
}

/// Deletes the selection and splits the paragraph at the cursor.
pub fn split_block(state: &EditorState) -> Result<Transaction, DocumentError> {
    let selection = state.selection();
    let mut tr = state.tr();
    tr.delete(selection.from(), selection.to())?;
    tr.split(selection.from())?;
    Ok(tr)
}

pub fn delete_backward(state: &EditorState) -> Result<Option<Transaction>, DocumentError> {
    let selection = state.selection();
    if !selection.is_empty() {
        return delete_selection(state).map(Some);
    }
    let resolved = state.doc().resolve(selection.head)?;
    let mut tr = state.tr();
    if resolved.offset == 0 {
        if resolved.paragraph == 0 {
            return Ok(None);
        }
        // Join with the previous paragraph.
        tr.delete(selection.head - 2, selection.head)?;
        return Ok(Some(tr));
    }
    let width = grapheme_before(state, resolved);
    tr.delete(selection.head - width, selection.head)?;
    Ok(Some(tr))
}

pub fn delete_forward(state: &EditorState) -> Result<Option<Transaction>, DocumentError> {
    let selection = state.selection();
    if !selection.is_empty() {
        return delete_selection(state).map(Some);
    }
    let resolved = state.doc().resolve(selection.head)?;
    let paragraph = &state.doc().paragraphs()[resolved.paragraph];
    let mut tr = state.tr();
    if resolved.offset == paragraph.content_size() {
        if resolved.paragraph + 1 == state.doc().paragraphs().len() {
            return Ok(None);
        }
        tr.delete(selection.head, selection.head + 2)?;
        return Ok(Some(tr));
    }
    let width = grapheme_after(state, resolved);
    tr.delete(selection.head, selection.head + width)?;
    Ok(Some(tr))
}

pub fn delete_selection(state: &EditorState) -> Result<Transaction, DocumentError> {
    let selection = state.selection();
    let mut tr = state.tr();
    tr.delete(selection.from(), selection.to())?;
    Ok(tr)
}

pub fn move_left(state: &EditorState) -> Result<Option<Transaction>, DocumentError> {
    let selection = state.selection();
    if !selection.is_empty() {
        return Ok(Some(select(state, selection.from())));
    }
    let resolved = state.doc().resolve(selection.head)?;
    let target = if resolved.offset > 0 {
        selection.head - grapheme_before(state, resolved)
    } else if resolved.paragraph > 0 {
        selection.head - 2
    } else {
        return Ok(None);
    };
    Ok(Some(select(state, target)))
}

pub fn move_right(state: &EditorState) -> Result<Option<Transaction>, DocumentError> {
    let selection = state.selection();
    if !selection.is_empty() {
        return Ok(Some(select(state, selection.to())));
    }
    let resolved = state.doc().resolve(selection.head)?;
    let paragraph_size = state.doc().paragraphs()[resolved.paragraph].content_size();
    let target = if resolved.offset < paragraph_size {
        selection.head + grapheme_after(state, resolved)
    } else if resolved.paragraph + 1 < state.doc().paragraphs().len() {
        selection.head + 2
    } else {
        return Ok(None);
    };
    Ok(Some(select(state, target)))
}

/// Moves to the start of the visual line (paragraph start or after a hard break).
pub fn line_start(state: &EditorState) -> Result<Option<Transaction>, DocumentError> {
    let head = state.selection().head;
    let resolved = state.doc().resolve(head)?;
    let text: Vec<char> = state.doc().paragraphs()[resolved.paragraph]
        .text()
        .chars()
        .collect();
    let start = text[..resolved.offset]
        .iter()
        .rposition(|ch| *ch == '\n')
        .map(|idx| idx + 1)
        .unwrap_or(0);
    let target = resolved.content_start() + start;
    Ok((target != head || !state.selection().is_empty()).then(|| select(state, target)))
}

pub fn line_end(state: &EditorState) -> Result<Option<Transaction>, DocumentError> {
    let head = state.selection().head;
    let resolved = state.doc().resolve(head)?;
    let text: Vec<char> = state.doc().paragraphs()[resolved.paragraph]
        .text()
        .chars()
        .collect();
    let end = text[resolved.offset..]
        .iter()
        .position(|ch| *ch == '\n')
        .map(|idx| resolved.offset + idx)
        .unwrap_or(text.len());
    let target = resolved.content_start() + end;
    Ok((target != head || !state.selection().is_empty()).then(|| select(state, target)))
}

fn select(state: &EditorState, pos: usize) -> Transaction {
    let mut tr = state.tr();
    tr.set_selection(Selection::cursor(pos));
    tr
}

/// Number of positions covered by the grapheme cluster ending at `resolved`.
fn grapheme_before(state: &EditorState, resolved: ResolvedPos) -> usize {
    let text: String = state.doc().paragraphs()[resolved.paragraph]
        .text()
        .chars()
        .take(resolved.offset)
        .collect();
    text.graphemes(true)
        .next_back()
        .map(|grapheme| grapheme.chars().count())
        .unwrap_or(1)
}

fn grapheme_after(state: &EditorState, resolved: ResolvedPos) -> usize {
    let text: String = state.doc().paragraphs()[resolved.paragraph]
        .text()
        .chars()
        .skip(resolved.offset)
        .collect();
    text.graphemes(true)
        .next()
        .map(|grapheme| grapheme.chars().count())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(state: &EditorState, tr: Option<Transaction>) -> EditorState {
        match tr {
            Some(tr) => state.apply(&tr),
            None => state.clone(),
        }
    }

    #[test]
    fn insert_text_replaces_selection() {
        let state = EditorState::from_text("hello").with_selection(Selection::new(2, 4));
        let next = state.apply(&insert_text(&state, "ipp").unwrap());
        assert_eq!(next.doc().display_text(), "hippo");
        assert_eq!(next.selection(), Selection::cursor(5));
    }

    #[test]
    fn backspace_removes_whole_grapheme() {
        let state = EditorState::from_text("ok👍🏽");
        let next = run(&state, delete_backward(&state).unwrap());
        assert_eq!(next.doc().display_text(), "ok");
    }

    #[test]
    fn backspace_at_paragraph_start_joins() {
        let state = EditorState::from_text("ab\n\ncd").with_selection(Selection::cursor(5));
        let next = run(&state, delete_backward(&state).unwrap());
        assert_eq!(next.doc().display_text(), "abcd");
        assert_eq!(next.selection(), Selection::cursor(3));
    }

    #[test]
    fn backspace_at_document_start_is_noop() {
        let state = EditorState::from_text("ab").with_selection(Selection::cursor(1));
        assert!(delete_backward(&state).unwrap().is_none());
    }

    #[test]
    fn delete_forward_joins_next_paragraph() {
        let state = EditorState::from_text("ab\n\ncd").with_selection(Selection::cursor(3));
        let next = run(&state, delete_forward(&state).unwrap());
        assert_eq!(next.doc().display_text(), "abcd");
    }

    #[test]
    fn split_block_moves_cursor_into_new_paragraph() {
        let state = EditorState::from_text("abcd").with_selection(Selection::cursor(3));
        let next = state.apply(&split_block(&state).unwrap());
        assert_eq!(next.doc().display_text(), "ab\n\ncd");
        assert_eq!(next.selection(), Selection::cursor(5));
    }

    #[test]
    fn arrows_cross_paragraph_boundaries() {
        let state = EditorState::from_text("ab\n\ncd").with_selection(Selection::cursor(3));
        let right = run(&state, move_right(&state).unwrap());
        assert_eq!(right.selection(), Selection::cursor(5));
        let left = run(&right, move_left(&right).unwrap());
        assert_eq!(left.selection(), Selection::cursor(3));
    }

    #[test]
    fn line_bounds_respect_hard_breaks() {
        let state = EditorState::from_text("ab\ncd").with_selection(Selection::cursor(5));
        let start = run(&state, line_start(&state).unwrap());
        assert_eq!(start.selection(), Selection::cursor(4));
        let end = run(&state, line_end(&state).unwrap());
        assert_eq!(end.selection(), Selection::cursor(6));
    }
}
