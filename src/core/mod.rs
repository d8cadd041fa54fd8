//! Document model, transactions and terminal input plumbing.

pub mod commands;
pub mod component;
pub mod cursor;
pub mod document;
pub mod history;
pub mod input;
pub mod input_event;
pub mod keybindings;
pub mod state;
pub mod text;
pub mod transform;
