//! Editor keybindings.
//!
//! Each editor owns a manager. The defaults can be overridden per action
//! through [`EditorKeybindingsConfig`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::core::input::matches_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    CursorLeft,
    CursorRight,
    CursorLineStart,
    CursorLineEnd,
    DeleteCharBackward,
    DeleteCharForward,
    NewLine,
    SplitBlock,
    SelectUp,
    SelectDown,
    SelectConfirm,
    SelectCancel,
    Undo,
    Redo,
}

pub type KeyId = String;

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl KeyBinding {
    fn into_keys(self) -> Vec<KeyId> {
        match self {
            KeyBinding::Single(key) => vec![key],
            KeyBinding::Multiple(keys) => keys,
        }
    }
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorKeybindingsConfig {
    entries: HashMap<EditorAction, KeyBinding>,
}

impl EditorKeybindingsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: Into<KeyBinding>>(&mut self, action: EditorAction, keys: K) {
        self.entries.insert(action, keys.into());
    }
}

pub static DEFAULT_EDITOR_KEYBINDINGS: Lazy<HashMap<EditorAction, Vec<KeyId>>> =
    Lazy::new(|| {
        use EditorAction::*;

        let table: [(EditorAction, &[&str]); 14] = [
            (CursorLeft, &["left", "ctrl+b"]),
            (CursorRight, &["right", "ctrl+f"]),
            (CursorLineStart, &["home", "ctrl+a"]),
            (CursorLineEnd, &["end", "ctrl+e"]),
            (DeleteCharBackward, &["backspace"]),
            (DeleteCharForward, &["delete", "ctrl+d"]),
            (NewLine, &["shift+enter"]),
            (SplitBlock, &["enter"]),
            (SelectUp, &["up"]),
            (SelectDown, &["down"]),
            (SelectConfirm, &["enter", "tab"]),
            (SelectCancel, &["escape"]),
            (Undo, &["ctrl+-", "ctrl+z"]),
            (Redo, &["ctrl+y", "ctrl+shift+z"]),
        ];
        table
            .into_iter()
            .map(|(action, keys)| (action, keys.iter().map(|key| key.to_string()).collect()))
            .collect()
    });

#[derive(Debug, Clone)]
pub struct EditorKeybindingsManager {
    action_to_keys: HashMap<EditorAction, Vec<KeyId>>,
}

impl Default for EditorKeybindingsManager {
    fn default() -> Self {
        Self::new(EditorKeybindingsConfig::default())
    }
}

impl EditorKeybindingsManager {
    pub fn new(config: EditorKeybindingsConfig) -> Self {
        let mut action_to_keys = DEFAULT_EDITOR_KEYBINDINGS.clone();
        for (action, binding) in config.entries {
            action_to_keys.insert(action, binding.into_keys());
        }
        Self { action_to_keys }
    }

    pub fn matches(&self, data: &str, action: EditorAction) -> bool {
        self.action_to_keys
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|key| matches_key(data, key)))
    }

    pub fn get_keys(&self, action: EditorAction) -> Vec<KeyId> {
        self.action_to_keys.get(&action).cloned().unwrap_or_default()
    }
}

/// Shared handle so several editors can follow one rebinding.
pub type EditorKeybindingsHandle = Arc<RwLock<EditorKeybindingsManager>>;

pub fn default_editor_keybindings_handle() -> EditorKeybindingsHandle {
    Arc::new(RwLock::new(EditorKeybindingsManager::default()))
}
