//! Candidate filtering and cyclic navigation.

use crate::autocomplete::catalog::{Suggestion, SuggestionCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Case-insensitive label prefix match, in catalog order. An empty query
/// keeps every entry.
pub fn filter<'a>(catalog: &'a SuggestionCatalog, query: &str) -> Vec<&'a Suggestion> {
    let needle = query.to_lowercase();
    catalog
        .entries()
        .iter()
        .filter(|entry| entry.label.to_lowercase().starts_with(&needle))
        .collect()
}

/// Moves `current` one step in `direction`, wrapping around `count`.
/// Returns `current` unchanged when there is nothing to move over.
pub fn navigate(current: usize, direction: Direction, count: usize) -> usize {
    if count == 0 {
        return current;
    }
    let current = current % count;
    match direction {
        Direction::Next => (current + 1) % count,
        Direction::Previous => (current + count - 1) % count,
    }
}
