//! Trigger-driven mention autocomplete for a terminal rich-text editor.
//!
//! Invariant: every document change is a [`Transaction`] dispatched through
//! [`MentionEditor::dispatch`], so history, placeholder tracking and the
//! autocomplete session all observe the same steps.
//!
//! # Public API Overview
//! - Edit a paragraph/hard-break/mention document via [`EditorState`] and
//!   [`Transaction`].
//! - Type `<>` to open a suggestion session; committing inserts a mention
//!   that behaves as one unit under deletion and cursor movement.
//! - Register asynchronous command generators in a [`CommandRegistry`]; their
//!   placeholders are replaced when the host feeds back completions.
//! - Render the editor and popup with [`MentionEditor`] as a [`Component`].

#![allow(clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod logging;

pub mod autocomplete;
pub mod core;
pub mod widgets;

/// Document model and transactions.
pub use crate::core::document::{
    Category, Document, Inline, Mark, MentionAttrs, MentionKind, MentionMark, MentionSpan,
    Paragraph, TextRun,
};
pub use crate::core::history::History;
pub use crate::core::state::{EditorState, Selection};
pub use crate::core::transform::{Assoc, Mapping, Step, StepMap, Transaction};

/// Autocomplete session, catalog and commit.
pub use crate::autocomplete::catalog::{Suggestion, SuggestionCatalog, DEFAULT_CATALOG};
pub use crate::autocomplete::command::{
    CommandCompletion, CommandRegistry, PendingCommand, PlaceholderId, PlaceholderTracker,
};
pub use crate::autocomplete::commit::{commit, CommitOutcome, IgnoreReason, MentionRepresentation};
pub use crate::autocomplete::deletion::{mention_delete, DeleteDirection};
pub use crate::autocomplete::popup::{present_popup, PopupPlacement, PositionCoords, ScreenPoint, ScreenRect};
pub use crate::autocomplete::session::{AutocompleteSession, SessionOverride, SessionState};
pub use crate::autocomplete::trigger::{TriggerMatch, TRIGGER};

/// Built-in UI components.
pub use crate::widgets::{
    EditorOptions, MentionEditor, MentionEditorTheme, SuggestionList, SuggestionListTheme,
};

/// Keybinding configuration and default mappings.
pub use crate::core::keybindings::{
    default_editor_keybindings_handle, EditorAction, EditorKeybindingsConfig,
    EditorKeybindingsHandle, EditorKeybindingsManager, KeyId, DEFAULT_EDITOR_KEYBINDINGS,
};

/// Keyboard input parsing and matching helpers.
pub use crate::core::input::{is_key_release, matches_key, parse_key, KeyEventType};
pub use crate::core::input_event::{parse_input_events, InputEvent};

/// Component traits and cursor marker helper.
pub use crate::core::component::{Component, Focusable};
pub use crate::core::cursor::{CursorPos, CURSOR_MARKER};

/// Configuration, logging and errors.
pub use crate::config::EnvConfig;
pub use crate::error::{CatalogError, DocumentError, LoggingError};
pub use crate::logging::init_logging;

/// Command generator contract, re-exported for hosts.
pub use command_provider::{CommandError, CommandGenerator, CommandPresentation};

/// Returns whether a component exposes focus behavior via [`Focusable`].
pub fn is_focusable(component: &mut dyn Component) -> bool {
    component.as_focusable().is_some()
}

/// ANSI-aware truncation helper.
pub use crate::core::text::width::truncate_to_width;
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
