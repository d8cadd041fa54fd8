//! Autocomplete session state and its per-transaction reducer.

use tracing::debug;

use crate::autocomplete::trigger::detect_in;
use crate::core::state::EditorState;
use crate::core::transform::Transaction;

/// Snapshot of the autocomplete session.
///
/// Inactive sessions always have no anchor, an empty query and index 0; use
/// [`SessionState::inactive`] rather than building one by hand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub active: bool,
    pub anchor: Option<usize>,
    pub query: String,
    pub selected_index: usize,
}

impl SessionState {
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn open(anchor: usize, query: impl Into<String>) -> Self {
        Self {
            active: true,
            anchor: Some(anchor),
            query: query.into(),
            selected_index: 0,
        }
    }

    #[must_use]
    pub fn with_selected_index(mut self, selected_index: usize) -> Self {
        if self.active {
            self.selected_index = selected_index;
        }
        self
    }

    /// End of the trigger-plus-query range.
    pub fn query_end(&self) -> Option<usize> {
        self.anchor
            .map(|anchor| anchor + self.query.chars().count())
    }
}

/// Transaction metadata that replaces the session state verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOverride(pub SessionState);

/// Derives the next session state from the previous one and a transaction.
///
/// An override in the transaction wins. Otherwise a document change re-runs
/// trigger detection at the new cursor, and anything else leaves the state
/// untouched.
pub fn reduce(previous: &SessionState, tr: &Transaction, next: &EditorState) -> SessionState {
    if let Some(SessionOverride(state)) = tr.meta::<SessionOverride>() {
        return state.clone();
    }
    if !tr.doc_changed() {
        return previous.clone();
    }

    match detect_in(next.doc(), next.selection().from()) {
        Some(hit) => {
            let unchanged = previous.active
                && previous.anchor == Some(hit.anchor)
                && previous.query == hit.query;
            let selected_index = if unchanged { previous.selected_index } else { 0 };
            SessionState {
                active: true,
                anchor: Some(hit.anchor),
                query: hit.query,
                selected_index,
            }
        }
        None => SessionState::inactive(),
    }
}

/// Per-editor holder of the session state.
#[derive(Debug, Clone, Default)]
pub struct AutocompleteSession {
    state: SessionState,
}

impl AutocompleteSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Advances the session for a transaction that produced `next`.
    pub fn apply(&mut self, tr: &Transaction, next: &EditorState) -> &SessionState {
        let reduced = reduce(&self.state, tr, next);
        if reduced.active != self.state.active {
            debug!(
                active = reduced.active,
                anchor = ?reduced.anchor,
                query = %reduced.query,
                "autocomplete session changed"
            );
        }
        self.state = reduced;
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Selection;
    use pretty_assertions::assert_eq;

    fn type_into(state: &EditorState, session: &mut AutocompleteSession, text: &str) -> EditorState {
        let mut tr = state.tr();
        tr.insert_text(state.selection().head, text).unwrap();
        let next = state.apply(&tr);
        session.apply(&tr, &next);
        next
    }

    #[test]
    fn starts_inactive() {
        let session = AutocompleteSession::new();
        assert_eq!(session.state(), &SessionState::inactive());
    }

    #[test]
    fn typing_trigger_activates_and_tracks_query() {
        let mut session = AutocompleteSession::new();
        let mut state = EditorState::from_text("");
        state = type_into(&state, &mut session, "<>");
        assert_eq!(session.state(), &SessionState::open(3, ""));
        type_into(&state, &mut session, "me");
        assert_eq!(session.state(), &SessionState::open(3, "me"));
    }

    #[test]
    fn selection_only_changes_keep_state() {
        let mut session = AutocompleteSession::new();
        let state = type_into(&EditorState::from_text(""), &mut session, "<>me");
        let before = session.state().clone();
        let mut tr = state.tr();
        tr.set_selection(Selection::cursor(1));
        let next = state.apply(&tr);
        session.apply(&tr, &next);
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn override_wins_over_detection() {
        let mut session = AutocompleteSession::new();
        let state = type_into(&EditorState::from_text(""), &mut session, "<>me");
        let mut tr = state.tr();
        tr.insert_text(state.selection().head, "x").unwrap();
        tr.set_meta(SessionOverride(SessionState::inactive()));
        let next = state.apply(&tr);
        session.apply(&tr, &next);
        assert!(!session.is_active());
    }

    #[test]
    fn query_change_resets_selected_index() {
        let mut session = AutocompleteSession::new();
        let state = type_into(&EditorState::from_text(""), &mut session, "<>m");
        let mut tr = state.tr();
        tr.set_meta(SessionOverride(session.state().clone().with_selected_index(2)));
        let state = state.apply(&tr);
        session.apply(&tr, &state);
        assert_eq!(session.state().selected_index, 2);

        type_into(&state, &mut session, "e");
        assert_eq!(session.state().selected_index, 0);
    }

    #[test]
    fn edit_elsewhere_keeps_selected_index_when_query_is_unchanged() {
        let mut session = AutocompleteSession::new();
        let state = type_into(&EditorState::from_text(""), &mut session, "<>m");
        let mut tr = state.tr();
        tr.set_meta(SessionOverride(session.state().clone().with_selected_index(1)));
        let state = state.apply(&tr);
        session.apply(&tr, &state);

        // Replace the query with itself: document changes, anchor and query do not.
        let mut tr = state.tr();
        tr.delete(3, 4).unwrap().insert_text(3, "m").unwrap();
        let next = state.apply(&tr);
        session.apply(&tr, &next);
        assert_eq!(session.state(), &SessionState::open(3, "m").with_selected_index(1));
    }

    #[test]
    fn losing_the_trigger_deactivates() {
        let mut session = AutocompleteSession::new();
        let state = type_into(&EditorState::from_text(""), &mut session, "<>me");
        let mut tr = state.tr();
        tr.delete(1, 3).unwrap();
        let next = state.apply(&tr);
        session.apply(&tr, &next);
        assert_eq!(session.state(), &SessionState::inactive());
    }
}
