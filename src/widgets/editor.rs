//! Mention editor widget.
//!
//! Owns one editor state and the autocomplete plugins attached to it. Every
//! change goes through [`MentionEditor::dispatch`], which applies the
//! transaction, records history, remaps tracked placeholders and advances the
//! autocomplete session, in that order.

use std::sync::{Arc, PoisonError};

use tracing::{debug, trace, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::autocomplete::catalog::{Suggestion, SuggestionCatalog};
use crate::autocomplete::command::{
    completion_transaction, CommandCompletion, CommandRegistry, PendingCommand, PlaceholderTracker,
};
use crate::autocomplete::commit::{commit, CommitOutcome, MentionRepresentation};
use crate::autocomplete::deletion::{
    mention_delete, snap_out_of_mention, widen_over_mentions, DeleteDirection,
};
use crate::autocomplete::filter::{filter, navigate, Direction};
use crate::autocomplete::popup::{
    present_popup, PopupPlacement, PositionCoords, ScreenPoint, ScreenRect,
};
use crate::autocomplete::session::{AutocompleteSession, SessionOverride, SessionState};
use crate::config::{clamp_popup_max_visible, EnvConfig, DEFAULT_POPUP_MAX_VISIBLE};
use crate::core::commands;
use crate::core::component::{Component, Focusable};
use crate::core::cursor::{locate_cursor_marker, CursorPos, CURSOR_MARKER};
use crate::core::document::{Category, Document, Inline};
use crate::core::history::History;
use crate::core::input::KeyEventType;
use crate::core::input_event::{parse_input_events, InputEvent};
use crate::core::keybindings::{
    default_editor_keybindings_handle, EditorAction, EditorKeybindingsHandle,
};
use crate::core::state::{EditorState, Selection};
use crate::core::text::width::visible_width;
use crate::core::transform::Transaction;
use crate::error::DocumentError;
use crate::widgets::suggestion_list::{category_color, SuggestionList, SuggestionListTheme};

const POPUP_MAX_WIDTH: usize = 48;
const POPUP_MIN_WIDTH: usize = 20;

pub struct MentionEditorTheme {
    pub border_color: Box<dyn Fn(&str) -> String>,
    pub mention: Box<dyn Fn(Category, &str) -> String>,
    pub suggestion_list: SuggestionListTheme,
}

impl MentionEditorTheme {
    pub fn plain() -> Self {
        Self {
            border_color: Box::new(|text| text.to_string()),
            mention: Box::new(|_, text| text.to_string()),
            suggestion_list: SuggestionListTheme::plain(),
        }
    }

    pub fn ansi() -> Self {
        Self {
            border_color: Box::new(|text| format!("\x1b[90m{text}\x1b[39m")),
            mention: Box::new(|category, text| {
                format!("\x1b[1;{}m{text}\x1b[22;39m", category_color(category))
            }),
            suggestion_list: SuggestionListTheme::ansi(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub representation: MentionRepresentation,
    pub popup_max_visible: usize,
    pub history_depth: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            representation: MentionRepresentation::default(),
            popup_max_visible: DEFAULT_POPUP_MAX_VISIBLE,
            history_depth: 100,
        }
    }
}

impl EditorOptions {
    pub fn from_env_config(config: &EnvConfig) -> Self {
        Self {
            representation: config.representation,
            popup_max_visible: config.popup_max_visible,
            ..Self::default()
        }
    }
}

pub struct MentionEditor {
    state: EditorState,
    session: AutocompleteSession,
    catalog: SuggestionCatalog,
    registry: CommandRegistry,
    tracker: PlaceholderTracker,
    history: History,
    keybindings: EditorKeybindingsHandle,
    pending: Vec<PendingCommand>,
    suggestion_list: SuggestionList,
    border_color: Box<dyn Fn(&str) -> String>,
    mention_style: Box<dyn Fn(Category, &str) -> String>,
    representation: MentionRepresentation,
    focused: bool,
    last_cursor: Option<CursorPos>,
}

impl MentionEditor {
    pub fn new(theme: MentionEditorTheme, options: EditorOptions) -> Self {
        Self {
            state: EditorState::new(Document::empty()),
            session: AutocompleteSession::new(),
            catalog: SuggestionCatalog::default(),
            registry: CommandRegistry::new(),
            tracker: PlaceholderTracker::new(),
            history: History::new(options.history_depth),
            keybindings: default_editor_keybindings_handle(),
            pending: Vec::new(),
            suggestion_list: SuggestionList::new(
                clamp_popup_max_visible(options.popup_max_visible),
                theme.suggestion_list,
            ),
            border_color: theme.border_color,
            mention_style: theme.mention,
            representation: options.representation,
            focused: false,
            last_cursor: None,
        }
    }

    /// Replaces the document with `text` parsed as paragraphs and hard breaks.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.state = EditorState::from_text(text);
        self.session = AutocompleteSession::new();
        self.history = History::default();
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: SuggestionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_keybindings(mut self, keybindings: EditorKeybindingsHandle) -> Self {
        self.keybindings = keybindings;
        self
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Document {
        self.state.doc()
    }

    pub fn text(&self) -> String {
        self.state.doc().display_text()
    }

    pub fn session(&self) -> &SessionState {
        self.session.state()
    }

    pub fn catalog(&self) -> &SuggestionCatalog {
        &self.catalog
    }

    pub fn representation(&self) -> MentionRepresentation {
        self.representation
    }

    pub fn placeholders(&self) -> &PlaceholderTracker {
        &self.tracker
    }

    /// Candidates for the current query; empty while no session is open.
    pub fn filtered_suggestions(&self) -> Vec<&Suggestion> {
        let session = self.session.state();
        if !session.active {
            return Vec::new();
        }
        filter(&self.catalog, &session.query)
    }

    pub fn selected_suggestion(&self) -> Option<&Suggestion> {
        self.filtered_suggestions()
            .get(self.session.state().selected_index)
            .copied()
    }

    pub fn popup_placement(
        &self,
        coords: &dyn PositionCoords,
        origin: ScreenPoint,
        offset: i32,
    ) -> Option<PopupPlacement> {
        present_popup(
            self.session.state(),
            self.filtered_suggestions().len(),
            coords,
            origin,
            offset,
        )
    }

    /// Applies a transaction and runs every plugin over it.
    pub fn dispatch(&mut self, tr: Transaction) {
        let next = self.state.apply(&tr);
        self.history.record(&self.state, &tr);
        self.tracker.map(tr.mapping());
        self.session.apply(&tr, &next);
        self.state = next;
    }

    /// Moves the selection. Ends that land inside a mark-based mention are
    /// pushed to its edges.
    pub fn set_selection(&mut self, selection: Selection) {
        let mut tr = self.state.tr();
        tr.set_selection(selection);
        let widened = widen_over_mentions(tr.doc(), tr.selection());
        tr.set_selection(widened);
        self.dispatch(tr);
    }

    pub fn handle_input(&mut self, data: &str) {
        for event in parse_input_events(data) {
            self.handle_event(&event);
        }
    }

    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let state = self.edit_state();
        self.run(commands::insert_text(&state, text).map(Some));
    }

    /// Current state with the selection widened over partially covered
    /// mentions, for commands that replace the selection.
    fn edit_state(&self) -> EditorState {
        let selection = widen_over_mentions(self.state.doc(), self.state.selection());
        self.state.clone().with_selection(selection)
    }

    /// Commits the highlighted candidate. Returns `false` when nothing was
    /// committed.
    pub fn commit_selected(&mut self) -> bool {
        match self.selected_suggestion().cloned() {
            Some(suggestion) => self.commit_suggestion(&suggestion),
            None => false,
        }
    }

    /// Commits a candidate by id, as a pointer click on the popup would.
    pub fn select_suggestion(&mut self, id: &str) -> bool {
        let found = self
            .filtered_suggestions()
            .into_iter()
            .find(|suggestion| suggestion.id == id)
            .cloned();
        match found {
            Some(suggestion) => self.commit_suggestion(&suggestion),
            None => false,
        }
    }

    fn commit_suggestion(&mut self, suggestion: &Suggestion) -> bool {
        let outcome = commit(
            &self.state,
            self.session.state(),
            suggestion,
            self.representation,
            &self.registry,
        );
        match outcome {
            CommitOutcome::Committed(tr) => {
                self.dispatch(tr);
                true
            }
            CommitOutcome::Command {
                transaction,
                request,
            } => {
                self.dispatch(transaction);
                let pending = request.into_pending(&mut self.tracker);
                debug!(id = ?pending.id, suggestion = %pending.suggestion_id, "command started");
                self.pending.push(pending);
                true
            }
            CommitOutcome::Ignored(_) => false,
        }
    }

    /// Command runs started since the last call. The host awaits each
    /// [`PendingCommand::run`] and feeds the result to
    /// [`MentionEditor::complete_command`].
    pub fn take_pending_commands(&mut self) -> Vec<PendingCommand> {
        std::mem::take(&mut self.pending)
    }

    /// Replaces a command's placeholder with its outcome. Returns `false`
    /// when the placeholder is gone or was edited.
    pub fn complete_command(&mut self, completion: CommandCompletion) -> bool {
        if let Err(error) = &completion.result {
            warn!(id = ?completion.id, %error, "command generation failed");
        }
        let Some(placeholder) = self.tracker.take(completion.id) else {
            debug!(id = ?completion.id, "placeholder no longer tracked; completion abandoned");
            return false;
        };
        match completion_transaction(&self.state, &placeholder, &completion.result) {
            Ok(Some(tr)) => {
                self.dispatch(tr);
                true
            }
            Ok(None) => false,
            Err(error) => {
                debug!(id = ?completion.id, %error, "completion could not be applied");
                false
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        let result = self.history.undo(&self.state);
        self.run(result)
    }

    pub fn redo(&mut self) -> bool {
        let result = self.history.redo(&self.state);
        self.run(result)
    }

    /// Dispatches a command result; errors are logged and dropped.
    fn run(&mut self, result: Result<Option<Transaction>, DocumentError>) -> bool {
        match result {
            Ok(Some(tr)) => {
                self.dispatch(tr);
                true
            }
            Ok(None) => false,
            Err(error) => {
                debug!(%error, "command rejected");
                false
            }
        }
    }

    fn set_session(&mut self, session: SessionState) {
        let mut tr = self.state.tr();
        tr.set_meta(SessionOverride(session));
        self.dispatch(tr);
    }

    fn handle_key(&mut self, data: &str) {
        let keybindings = Arc::clone(&self.keybindings);
        let kb = keybindings.read().unwrap_or_else(PoisonError::into_inner);

        if self.session.is_active() {
            let session = self.session.state().clone();
            let count = self.filtered_suggestions().len();
            if kb.matches(data, EditorAction::SelectUp) {
                let index = navigate(session.selected_index, Direction::Previous, count);
                self.set_session(session.with_selected_index(index));
                return;
            }
            if kb.matches(data, EditorAction::SelectDown) {
                let index = navigate(session.selected_index, Direction::Next, count);
                self.set_session(session.with_selected_index(index));
                return;
            }
            if kb.matches(data, EditorAction::SelectCancel) {
                self.set_session(SessionState::inactive());
                return;
            }
            if kb.matches(data, EditorAction::SelectConfirm) && count > 0 {
                self.commit_selected();
                return;
            }
        }

        if kb.matches(data, EditorAction::Undo) {
            self.undo();
        } else if kb.matches(data, EditorAction::Redo) {
            self.redo();
        } else if kb.matches(data, EditorAction::DeleteCharBackward) {
            self.delete(DeleteDirection::Backward);
        } else if kb.matches(data, EditorAction::DeleteCharForward) {
            self.delete(DeleteDirection::Forward);
        } else if kb.matches(data, EditorAction::NewLine) {
            let state = self.edit_state();
            self.run(commands::insert_hard_break(&state).map(Some));
        } else if kb.matches(data, EditorAction::SplitBlock) {
            let state = self.edit_state();
            self.run(commands::split_block(&state).map(Some));
        } else if kb.matches(data, EditorAction::CursorLeft) {
            self.move_cursor(DeleteDirection::Backward);
        } else if kb.matches(data, EditorAction::CursorRight) {
            self.move_cursor(DeleteDirection::Forward);
        } else if kb.matches(data, EditorAction::CursorLineStart) {
            self.run(commands::line_start(&self.state));
        } else if kb.matches(data, EditorAction::CursorLineEnd) {
            self.run(commands::line_end(&self.state));
        } else {
            trace!(key = ?data, "unhandled key");
        }
    }

    /// Mention-aware deletion runs only while no session is open; during a
    /// session the default command edits the query.
    fn delete(&mut self, direction: DeleteDirection) {
        if !self.session.is_active() {
            match mention_delete(&self.state, direction) {
                Ok(Some(tr)) => {
                    debug!(?direction, "mention deleted");
                    self.dispatch(tr);
                    return;
                }
                Ok(None) => {}
                Err(error) => debug!(%error, "mention deletion rejected"),
            }
        }
        let result = match direction {
            DeleteDirection::Backward => commands::delete_backward(&self.state),
            DeleteDirection::Forward => commands::delete_forward(&self.state),
        };
        self.run(result);
    }

    /// Arrow movement that never stops inside a mark-based mention.
    fn move_cursor(&mut self, direction: DeleteDirection) {
        let result = match direction {
            DeleteDirection::Backward => commands::move_left(&self.state),
            DeleteDirection::Forward => commands::move_right(&self.state),
        };
        let result = result.map(|tr| {
            tr.map(|mut tr| {
                let head = tr.selection().head;
                let snapped = snap_out_of_mention(tr.doc(), head, direction);
                if snapped != head {
                    tr.set_selection(Selection::cursor(snapped));
                }
                tr
            })
        });
        self.run(result);
    }

    /// Content rows without borders, plus the cell of the session anchor.
    fn layout(&self, width: usize) -> (Vec<String>, Option<CursorPos>) {
        let head = self.state.selection().head;
        let anchor = self
            .session
            .state()
            .anchor
            .filter(|_| self.session.is_active());
        let mut builder = LineBuilder {
            rows: Vec::new(),
            current: String::new(),
            width: 0,
            max_width: width.max(1),
            mention_style: &*self.mention_style,
            marker: if self.focused { CURSOR_MARKER } else { "" },
            anchor_cell: None,
        };

        let mut start = 0;
        for paragraph in self.state.doc().paragraphs() {
            let mut pos = start + 1;
            for inline in paragraph.content() {
                match inline {
                    Inline::Text(run) => {
                        let style = run.mention_mark().map(|mark| mark.category);
                        for grapheme in run.text.graphemes(true) {
                            if Some(pos) == anchor {
                                builder.mark_anchor();
                            }
                            if pos == head {
                                builder.push_cursor(grapheme, style);
                            } else {
                                builder.push(grapheme, style);
                            }
                            pos += grapheme.chars().count();
                        }
                    }
                    Inline::HardBreak => {
                        if pos == head {
                            builder.push_cursor(" ", None);
                        }
                        builder.break_line();
                        pos += 1;
                    }
                    Inline::Mention(attrs) => {
                        if Some(pos) == anchor {
                            builder.mark_anchor();
                        }
                        let text = attrs.display_text();
                        if pos == head {
                            builder.push_cursor(&text, Some(attrs.category));
                        } else {
                            builder.push(&text, Some(attrs.category));
                        }
                        pos += 1;
                    }
                }
            }
            if Some(pos) == anchor {
                builder.mark_anchor();
            }
            if pos == head {
                builder.push_cursor(" ", None);
            }
            builder.break_line();
            start += paragraph.node_size();
        }
        let anchor_cell = builder.anchor_cell;
        (builder.rows, anchor_cell)
    }

    /// Popup rows and the content row they go in front of.
    fn popup_lines(
        &self,
        width: usize,
        anchor_cell: Option<CursorPos>,
    ) -> Option<(usize, Vec<String>)> {
        let cell = anchor_cell?;
        let anchor = self.session.state().anchor;
        let coords = move |pos: usize| {
            (Some(pos) == anchor).then_some(ScreenRect {
                left: cell.col as i32,
                top: cell.row as i32,
                right: cell.col as i32 + 1,
                bottom: cell.row as i32 + 1,
            })
        };
        let placement = self.popup_placement(&coords, ScreenPoint::default(), 0)?;

        let items = self.filtered_suggestions();
        let left = placement.left.max(0) as usize;
        let popup_width = POPUP_MAX_WIDTH
            .min(width.saturating_sub(left))
            .max(POPUP_MIN_WIDTH.min(width));
        let left = left.min(width - popup_width);
        let lines = self
            .suggestion_list
            .render(popup_width, &items, self.session.state().selected_index)
            .into_iter()
            .map(|line| format!("{}{line}", " ".repeat(left)))
            .collect();
        Some((placement.top.max(0) as usize, lines))
    }
}

impl Component for MentionEditor {
    fn render(&mut self, width: usize) -> Vec<String> {
        let width = width.max(1);
        let (mut rows, anchor_cell) = self.layout(width);
        if let Some((below, popup)) = self.popup_lines(width, anchor_cell) {
            let at = below.min(rows.len());
            rows.splice(at..at, popup);
        }

        let horizontal = (self.border_color)(&"─".repeat(width));
        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(horizontal.clone());
        for row in rows {
            let padding = " ".repeat(width.saturating_sub(visible_width(&row)));
            lines.push(format!("{row}{padding}"));
        }
        lines.push(horizontal);

        self.last_cursor = if self.focused {
            locate_cursor_marker(&lines)
        } else {
            None
        };
        lines
    }

    fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Text { text, .. } | InputEvent::Paste { text } => self.insert_text(text),
            InputEvent::Key {
                raw, event_type, ..
            } => {
                if *event_type != KeyEventType::Release {
                    self.handle_key(raw);
                }
            }
            InputEvent::UnknownRaw { raw } => trace!(raw = ?raw, "ignored input"),
        }
    }

    fn cursor_pos(&self) -> Option<CursorPos> {
        self.last_cursor
    }

    fn invalidate(&mut self) {
        self.last_cursor = None;
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for MentionEditor {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

/// Accumulates styled rows, hard-wrapping at `max_width` columns.
struct LineBuilder<'a> {
    rows: Vec<String>,
    current: String,
    width: usize,
    max_width: usize,
    mention_style: &'a dyn Fn(Category, &str) -> String,
    marker: &'static str,
    anchor_cell: Option<CursorPos>,
}

impl LineBuilder<'_> {
    fn wrap_for(&mut self, cells: usize) {
        if self.width > 0 && self.width + cells > self.max_width {
            self.break_line();
        }
    }

    fn style(&self, text: &str, style: Option<Category>) -> String {
        match style {
            Some(category) => (self.mention_style)(category, text),
            None => text.to_string(),
        }
    }

    fn push(&mut self, text: &str, style: Option<Category>) {
        let cells = visible_width(text);
        self.wrap_for(cells);
        let styled = self.style(text, style);
        self.current.push_str(&styled);
        self.width += cells;
    }

    fn push_cursor(&mut self, text: &str, style: Option<Category>) {
        let cells = visible_width(text).max(1);
        self.wrap_for(cells);
        let styled = self.style(text, style);
        self.current.push_str(self.marker);
        self.current.push_str(&format!("\x1b[7m{styled}\x1b[27m"));
        self.width += cells;
    }

    fn mark_anchor(&mut self) {
        // The anchor cell moves to the next row if the next grapheme wraps.
        let cell = if self.width + 1 > self.max_width && self.width > 0 {
            CursorPos {
                row: self.rows.len() + 1,
                col: 0,
            }
        } else {
            CursorPos {
                row: self.rows.len(),
                col: self.width,
            }
        };
        self.anchor_cell = Some(cell);
    }

    fn break_line(&mut self) {
        self.rows.push(std::mem::take(&mut self.current));
        self.width = 0;
    }
}
