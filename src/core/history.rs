//! Snapshot-based undo/redo.

use tracing::trace;

use crate::core::document::Document;
use crate::core::state::{EditorState, Selection};
use crate::core::transform::Transaction;
use crate::error::DocumentError;

const DEFAULT_DEPTH: usize = 100;

/// Marks transactions produced by [`History::undo`] and [`History::redo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMeta {
    Undo,
    Redo,
}

#[derive(Debug, Clone)]
struct Snapshot {
    doc: Document,
    selection: Selection,
}

impl Snapshot {
    fn capture(state: &EditorState) -> Self {
        Self {
            doc: state.doc().clone(),
            selection: state.selection(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            depth: depth.max(1),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Records the state a document-changing transaction started from.
    pub fn record(&mut self, before: &EditorState, tr: &Transaction) {
        if !tr.doc_changed() || !tr.add_to_history() {
            return;
        }
        self.undo_stack.push(Snapshot::capture(before));
        if self.undo_stack.len() > self.depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, current: &EditorState) -> Result<Option<Transaction>, DocumentError> {
        let Some(snapshot) = self.undo_stack.pop() else {
            return Ok(None);
        };
        trace!(remaining = self.undo_stack.len(), "undo");
        self.redo_stack.push(Snapshot::capture(current));
        restore(current, snapshot, HistoryMeta::Undo).map(Some)
    }

    pub fn redo(&mut self, current: &EditorState) -> Result<Option<Transaction>, DocumentError> {
        let Some(snapshot) = self.redo_stack.pop() else {
            return Ok(None);
        };
        trace!(remaining = self.redo_stack.len(), "redo");
        self.undo_stack.push(Snapshot::capture(current));
        restore(current, snapshot, HistoryMeta::Redo).map(Some)
    }
}

fn restore(
    current: &EditorState,
    snapshot: Snapshot,
    meta: HistoryMeta,
) -> Result<Transaction, DocumentError> {
    let mut tr = current.tr();
    tr.replace_document(snapshot.doc)?;
    tr.set_selection(snapshot.selection)
        .set_add_to_history(false)
        .set_meta(meta);
    Ok(tr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn type_text(state: &EditorState, history: &mut History, text: &str) -> EditorState {
        let mut tr = state.tr();
        tr.insert_text(state.selection().head, text).unwrap();
        history.record(state, &tr);
        state.apply(&tr)
    }

    #[test]
    fn undo_then_redo_restores_states() {
        let mut history = History::default();
        let start = EditorState::from_text("a");
        let edited = type_text(&start, &mut history, "b");

        let undo = history.undo(&edited).unwrap().expect("undo available");
        assert_eq!(undo.meta::<HistoryMeta>(), Some(&HistoryMeta::Undo));
        assert!(!undo.add_to_history());
        let undone = edited.apply(&undo);
        assert_eq!(undone, start);

        let redo = history.redo(&undone).unwrap().expect("redo available");
        assert_eq!(undone.apply(&redo), edited);
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut history = History::default();
        let start = EditorState::from_text("");
        let edited = type_text(&start, &mut history, "x");
        let undo = history.undo(&edited).unwrap().unwrap();
        let undone = edited.apply(&undo);
        assert!(history.can_redo());
        type_text(&undone, &mut history, "y");
        assert!(!history.can_redo());
    }

    #[test]
    fn depth_is_bounded() {
        let mut history = History::new(2);
        let mut state = EditorState::from_text("");
        for ch in ["a", "b", "c"] {
            state = type_text(&state, &mut history, ch);
        }
        assert!(history.undo(&state).unwrap().is_some());
        assert!(history.undo(&state).unwrap().is_some());
        assert!(history.undo(&state).unwrap().is_none());
    }

    #[test]
    fn selection_only_changes_are_not_recorded() {
        let mut history = History::default();
        let state = EditorState::from_text("abc");
        let mut tr = state.tr();
        tr.set_selection(Selection::cursor(1));
        history.record(&state, &tr);
        assert!(!history.can_undo());
    }
}
