//! Environment configuration.

use std::env;

use crate::autocomplete::commit::MentionRepresentation;

pub const DEFAULT_POPUP_MAX_VISIBLE: usize = 5;
pub const MIN_POPUP_MAX_VISIBLE: usize = 3;
pub const MAX_POPUP_MAX_VISIBLE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub debug: bool,
    pub log_file: Option<String>,
    pub representation: MentionRepresentation,
    pub popup_max_visible: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_file: None,
            representation: MentionRepresentation::default(),
            popup_max_visible: DEFAULT_POPUP_MAX_VISIBLE,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            debug: env_flag("MENTION_TUI_DEBUG"),
            log_file: env_string_opt("MENTION_TUI_LOG"),
            representation: env_string_opt("MENTION_TUI_REPRESENTATION")
                .and_then(|value| MentionRepresentation::parse(&value))
                .unwrap_or_default(),
            popup_max_visible: env_string_opt("MENTION_TUI_POPUP_MAX_VISIBLE")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .map(clamp_popup_max_visible)
                .unwrap_or(DEFAULT_POPUP_MAX_VISIBLE),
        }
    }
}

pub fn clamp_popup_max_visible(value: usize) -> usize {
    value.clamp(MIN_POPUP_MAX_VISIBLE, MAX_POPUP_MAX_VISIBLE)
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
