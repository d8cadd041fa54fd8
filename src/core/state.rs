//! Editor state: a document plus a selection.

use crate::core::document::Document;
use crate::core::transform::{Assoc, StepMap, Transaction};

/// Text selection; `anchor == head` is a collapsed cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn cursor(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub(crate) fn map(&self, map: &StepMap, doc: &Document) -> Self {
        Self::new(map.map(self.anchor, Assoc::After), map.map(self.head, Assoc::After))
            .clamp_to(doc)
    }

    pub(crate) fn clamp_to(&self, doc: &Document) -> Self {
        Self::new(
            doc.nearest_inline_pos(self.anchor),
            doc.nearest_inline_pos(self.head),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    doc: Document,
    selection: Selection,
}

impl EditorState {
    /// State with the cursor at the end of the document.
    pub fn new(doc: Document) -> Self {
        let selection = Selection::cursor(doc.end_pos());
        Self { doc, selection }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(Document::from_text(text))
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection.clamp_to(&self.doc);
        self
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Starts a transaction against this state.
    pub fn tr(&self) -> Transaction {
        Transaction::new(self.doc.clone(), self.selection)
    }

    /// Produces the state a transaction describes.
    pub fn apply(&self, tr: &Transaction) -> EditorState {
        debug_assert!(
            tr.before() == &self.doc,
            "transaction was built against a different document"
        );
        EditorState {
            doc: tr.doc().clone(),
            selection: tr.selection(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_puts_cursor_at_end() {
        let state = EditorState::from_text("abc");
        assert_eq!(state.selection(), Selection::cursor(4));
    }

    #[test]
    fn selection_is_clamped_into_text() {
        let state = EditorState::from_text("ab\n\ncd").with_selection(Selection::cursor(4));
        assert_eq!(state.selection(), Selection::cursor(5));
    }

    #[test]
    fn apply_produces_new_state_without_touching_old() {
        let state = EditorState::from_text("ab");
        let mut tr = state.tr();
        tr.insert_text(3, "c").unwrap();
        let next = state.apply(&tr);
        assert_eq!(next.doc().display_text(), "abc");
        assert_eq!(next.selection(), Selection::cursor(4));
        assert_eq!(state.doc().display_text(), "ab");
    }

    #[test]
    fn range_selection_reports_ordered_bounds() {
        let selection = Selection::new(5, 2);
        assert_eq!((selection.from(), selection.to()), (2, 5));
        assert!(!selection.is_empty());
    }
}
