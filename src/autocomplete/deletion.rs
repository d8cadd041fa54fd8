//! Mention-aware deletion.
//!
//! Backspace and Delete next to a mention remove the whole mention in one
//! step. Both representations are handled: an atomic node is one position
//! wide, a mark-based mention is the maximal run of characters carrying the
//! same mention mark. Handlers return `None` when no mention is involved so
//! the caller can fall through to the default command.

use crate::core::document::{Document, MentionMark, Unit};
use crate::core::state::{EditorState, Selection};
use crate::core::transform::Transaction;
use crate::error::DocumentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDirection {
    Backward,
    Forward,
}

/// Range of the mention that ends at or contains the position before `pos`.
pub fn mention_span_before(doc: &Document, pos: usize) -> Option<(usize, usize)> {
    match doc.unit_before(pos)? {
        Unit::Mention(_) => Some((pos - 1, pos)),
        unit => {
            let mark = unit.mention_mark()?;
            Some((scan_left(doc, pos, mark), scan_right(doc, pos, mark)))
        }
    }
}

/// Range of the mention that starts at or contains the position after `pos`.
pub fn mention_span_after(doc: &Document, pos: usize) -> Option<(usize, usize)> {
    match doc.unit_after(pos)? {
        Unit::Mention(_) => Some((pos, pos + 1)),
        unit => {
            let mark = unit.mention_mark()?;
            Some((scan_left(doc, pos, mark), scan_right(doc, pos, mark)))
        }
    }
}

/// Range of a mark-based mention that strictly contains `pos`.
pub fn mention_span_around(doc: &Document, pos: usize) -> Option<(usize, usize)> {
    let before = doc.unit_before(pos)?.mention_mark()?;
    let after = doc.unit_after(pos)?.mention_mark()?;
    if before != after {
        return None;
    }
    Some((scan_left(doc, pos, before), scan_right(doc, pos, before)))
}

/// Moves a position that sits inside a mark-based mention to its nearer edge
/// in `direction`.
pub fn snap_out_of_mention(doc: &Document, pos: usize, direction: DeleteDirection) -> usize {
    match mention_span_around(doc, pos) {
        Some((start, _)) if direction == DeleteDirection::Backward => start,
        Some((_, end)) => end,
        None => pos,
    }
}

/// Grows `selection` so that neither end sits inside a mark-based mention.
/// A cursor inside one moves to the mention's end, so typed text lands after
/// it.
pub fn widen_over_mentions(doc: &Document, selection: Selection) -> Selection {
    if selection.is_empty() {
        return Selection::cursor(snap_out_of_mention(
            doc,
            selection.head,
            DeleteDirection::Forward,
        ));
    }
    let from = mention_span_around(doc, selection.from()).map_or(selection.from(), |(start, _)| start);
    let to = mention_span_around(doc, selection.to()).map_or(selection.to(), |(_, end)| end);
    if selection.anchor <= selection.head {
        Selection::new(from, to)
    } else {
        Selection::new(to, from)
    }
}

fn scan_left(doc: &Document, mut pos: usize, mark: &MentionMark) -> usize {
    while doc
        .unit_before(pos)
        .and_then(|unit| unit.mention_mark())
        .is_some_and(|found| found == mark)
    {
        pos -= 1;
    }
    pos
}

fn scan_right(doc: &Document, mut pos: usize, mark: &MentionMark) -> usize {
    while doc
        .unit_after(pos)
        .and_then(|unit| unit.mention_mark())
        .is_some_and(|found| found == mark)
    {
        pos += 1;
    }
    pos
}

/// Deletes a whole mention next to the cursor, or widens a range selection
/// that cuts into one.
pub fn mention_delete(
    state: &EditorState,
    direction: DeleteDirection,
) -> Result<Option<Transaction>, DocumentError> {
    let doc = state.doc();
    let selection = state.selection();

    let range = if !selection.is_empty() {
        let widened = widen_over_mentions(doc, selection);
        (widened != selection).then_some((widened.from(), widened.to()))
    } else {
        let pos = selection.head;
        match direction {
            DeleteDirection::Backward => mention_span_before(doc, pos).or_else(|| {
                // Cursor after the separating space: take the space too.
                let is_plain_space = matches!(
                    doc.unit_before(pos),
                    Some(unit @ Unit::Char { ch: ' ', .. }) if unit.mention_mark().is_none()
                );
                if !is_plain_space {
                    return None;
                }
                mention_span_before(doc, pos - 1)
                    .filter(|(_, end)| *end == pos - 1)
                    .map(|(start, _)| (start, pos))
            }),
            DeleteDirection::Forward => mention_span_after(doc, pos),
        }
    };

    let Some((from, to)) = range else {
        return Ok(None);
    };
    let mut tr = state.tr();
    tr.delete(from, to)?;
    Ok(Some(tr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{Category, Inline, Mark, MentionAttrs, Paragraph, TextRun};
    use pretty_assertions::assert_eq;

    fn node_doc() -> Document {
        Document::new(vec![Paragraph::new(vec![
            Inline::text("hi "),
            Inline::Mention(MentionAttrs::new(Category::Person, "ann", None)),
            Inline::text(" there"),
        ])])
    }

    fn mark_doc() -> Document {
        let mark = Mark::Mention(MentionMark::new(Category::Tag, None));
        Document::new(vec![Paragraph::new(vec![
            Inline::text("hi "),
            Inline::Text(TextRun::with_marks("#todo", vec![mark])),
            Inline::text(" there"),
        ])])
    }

    fn run(doc: Document, selection: Selection, direction: DeleteDirection) -> Option<String> {
        let state = EditorState::new(doc).with_selection(selection);
        mention_delete(&state, direction)
            .unwrap()
            .map(|tr| state.apply(&tr).doc().display_text())
    }

    #[test]
    fn backspace_after_node_removes_it() {
        assert_eq!(
            run(node_doc(), Selection::cursor(5), DeleteDirection::Backward).as_deref(),
            Some("hi  there")
        );
    }

    #[test]
    fn backspace_after_separating_space_removes_node_and_space() {
        assert_eq!(
            run(node_doc(), Selection::cursor(6), DeleteDirection::Backward).as_deref(),
            Some("hi there")
        );
    }

    #[test]
    fn backspace_after_mark_mention_removes_whole_run() {
        assert_eq!(
            run(mark_doc(), Selection::cursor(9), DeleteDirection::Backward).as_deref(),
            Some("hi  there")
        );
        assert_eq!(
            run(mark_doc(), Selection::cursor(10), DeleteDirection::Backward).as_deref(),
            Some("hi there")
        );
    }

    #[test]
    fn backspace_inside_mark_mention_removes_whole_run() {
        assert_eq!(
            run(mark_doc(), Selection::cursor(6), DeleteDirection::Backward).as_deref(),
            Some("hi  there")
        );
    }

    #[test]
    fn delete_before_mention_removes_it() {
        assert_eq!(
            run(node_doc(), Selection::cursor(4), DeleteDirection::Forward).as_deref(),
            Some("hi  there")
        );
        assert_eq!(
            run(mark_doc(), Selection::cursor(4), DeleteDirection::Forward).as_deref(),
            Some("hi  there")
        );
    }

    #[test]
    fn plain_text_falls_through() {
        assert_eq!(run(node_doc(), Selection::cursor(3), DeleteDirection::Backward), None);
        assert_eq!(run(node_doc(), Selection::cursor(8), DeleteDirection::Backward), None);
        assert_eq!(run(mark_doc(), Selection::cursor(12), DeleteDirection::Forward), None);
    }

    #[test]
    fn range_cutting_into_mark_mention_is_widened() {
        assert_eq!(
            run(mark_doc(), Selection::new(2, 6), DeleteDirection::Backward).as_deref(),
            Some("h there")
        );
        assert_eq!(run(mark_doc(), Selection::new(1, 3), DeleteDirection::Backward), None);
    }

    #[test]
    fn snapping_moves_to_mention_edges() {
        let doc = mark_doc();
        assert_eq!(snap_out_of_mention(&doc, 6, DeleteDirection::Backward), 4);
        assert_eq!(snap_out_of_mention(&doc, 6, DeleteDirection::Forward), 9);
        assert_eq!(snap_out_of_mention(&doc, 4, DeleteDirection::Forward), 4);
    }

    #[test]
    fn widening_covers_mark_mentions_at_either_end() {
        let doc = mark_doc();
        assert_eq!(widen_over_mentions(&doc, Selection::new(2, 6)), Selection::new(2, 9));
        assert_eq!(widen_over_mentions(&doc, Selection::new(7, 2)), Selection::new(9, 2));
        assert_eq!(widen_over_mentions(&doc, Selection::new(5, 6)), Selection::new(4, 9));
        assert_eq!(widen_over_mentions(&doc, Selection::cursor(6)), Selection::cursor(9));
        assert_eq!(widen_over_mentions(&doc, Selection::new(1, 3)), Selection::new(1, 3));
        assert_eq!(widen_over_mentions(&node_doc(), Selection::cursor(5)), Selection::cursor(5));
    }
}
