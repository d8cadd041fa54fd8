//! Terminal widgets.

pub mod editor;
pub mod suggestion_list;

pub use editor::{EditorOptions, MentionEditor, MentionEditorTheme};
pub use suggestion_list::{SuggestionList, SuggestionListTheme};
