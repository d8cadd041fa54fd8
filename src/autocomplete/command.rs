//! Command suggestions: generator registry, tracked placeholders and
//! in-flight runs.
//!
//! Committing a command suggestion inserts a placeholder and hands back a
//! [`PendingCommand`]. The placeholder's range is remapped through every later
//! transaction, so the completion lands where the placeholder currently is,
//! not where it was inserted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use command_provider::{CommandError, CommandGenerator, CommandPresentation};
use tracing::debug;

use crate::core::document::Inline;
use crate::core::state::EditorState;
use crate::core::transform::{Assoc, Mapping, Transaction};
use crate::error::DocumentError;

/// Generators keyed by suggestion id.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    generators: HashMap<String, Arc<dyn CommandGenerator>>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.generators.keys().collect();
        ids.sort();
        f.debug_struct("CommandRegistry").field("ids", &ids).finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, id: impl Into<String>, generator: Arc<dyn CommandGenerator>) -> Self {
        self.register(id, generator);
        self
    }

    /// Registers a generator, returning the one it replaced.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        generator: Arc<dyn CommandGenerator>,
    ) -> Option<Arc<dyn CommandGenerator>> {
        self.generators.insert(id.into(), generator)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn CommandGenerator>> {
        self.generators.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.generators.contains_key(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPlaceholder {
    pub id: PlaceholderId,
    pub from: usize,
    pub to: usize,
    pub text: String,
    pub presentation: CommandPresentation,
}

/// Placeholder ranges that follow document edits.
#[derive(Debug, Default)]
pub struct PlaceholderTracker {
    next_id: u64,
    entries: Vec<TrackedPlaceholder>,
}

impl PlaceholderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `text` inserted at `from`.
    pub fn track(&mut self, from: usize, text: &str, presentation: CommandPresentation) -> PlaceholderId {
        let id = PlaceholderId(self.next_id);
        self.next_id += 1;
        self.entries.push(TrackedPlaceholder {
            id,
            from,
            to: from + text.chars().count(),
            text: text.to_string(),
            presentation,
        });
        id
    }

    /// Remaps every range. Text typed at either edge stays outside the range;
    /// ranges that collapse are dropped.
    pub fn map(&mut self, mapping: &Mapping) {
        if mapping.is_empty() {
            return;
        }
        self.entries.retain_mut(|entry| {
            entry.from = mapping.map(entry.from, Assoc::After);
            entry.to = mapping.map(entry.to, Assoc::Before);
            if entry.from >= entry.to {
                debug!(id = ?entry.id, "placeholder range collapsed");
                return false;
            }
            true
        });
    }

    pub fn get(&self, id: PlaceholderId) -> Option<&TrackedPlaceholder> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn take(&mut self, id: PlaceholderId) -> Option<TrackedPlaceholder> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A generator run waiting to be awaited by the host.
pub struct PendingCommand {
    pub id: PlaceholderId,
    pub suggestion_id: String,
    generator: Arc<dyn CommandGenerator>,
}

impl fmt::Debug for PendingCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCommand")
            .field("id", &self.id)
            .field("suggestion_id", &self.suggestion_id)
            .finish()
    }
}

impl PendingCommand {
    pub(crate) fn new(
        id: PlaceholderId,
        suggestion_id: impl Into<String>,
        generator: Arc<dyn CommandGenerator>,
    ) -> Self {
        Self {
            id,
            suggestion_id: suggestion_id.into(),
            generator,
        }
    }

    /// Awaits the generator. The future owns everything it needs, so the
    /// editor stays usable while it runs.
    pub async fn run(self) -> CommandCompletion {
        let result = self.generator.generate().await;
        CommandCompletion {
            id: self.id,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompletion {
    pub id: PlaceholderId,
    pub result: Result<String, CommandError>,
}

/// Builds the transaction that swaps a placeholder for its outcome.
///
/// Returns `None` when the placeholder text was edited in the meantime.
pub fn completion_transaction(
    state: &EditorState,
    placeholder: &TrackedPlaceholder,
    result: &Result<String, CommandError>,
) -> Result<Option<Transaction>, DocumentError> {
    let current = state
        .doc()
        .text_between(placeholder.from, placeholder.to, "\n");
    if current != placeholder.text {
        debug!(
            id = ?placeholder.id,
            expected = %placeholder.text,
            found = %current,
            "placeholder edited; completion abandoned"
        );
        return Ok(None);
    }
    let replacement = placeholder.presentation.replacement_for(result);
    let mut tr = state.tr();
    tr.replace(
        placeholder.from,
        placeholder.to,
        Inline::from_plain_text(&replacement),
    )?;
    Ok(Some(tr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::StepMap;
    use command_provider::DEFAULT_PLACEHOLDER;
    use pretty_assertions::assert_eq;

    fn mapping(maps: &[StepMap]) -> Mapping {
        let mut mapping = Mapping::new();
        for map in maps {
            mapping.push(*map);
        }
        mapping
    }

    #[test]
    fn edits_before_placeholder_shift_it() {
        let mut tracker = PlaceholderTracker::new();
        let id = tracker.track(5, "wait", CommandPresentation::default());
        tracker.map(&mapping(&[StepMap::new(1, 0, 3)]));
        let entry = tracker.get(id).unwrap();
        assert_eq!((entry.from, entry.to), (8, 12));
    }

    #[test]
    fn typing_at_edges_stays_outside() {
        let mut tracker = PlaceholderTracker::new();
        let id = tracker.track(5, "wait", CommandPresentation::default());
        tracker.map(&mapping(&[StepMap::new(5, 0, 1), StepMap::new(10, 0, 1)]));
        let entry = tracker.get(id).unwrap();
        assert_eq!((entry.from, entry.to), (6, 10));
    }

    #[test]
    fn deleted_placeholder_is_dropped() {
        let mut tracker = PlaceholderTracker::new();
        let id = tracker.track(5, "wait", CommandPresentation::default());
        tracker.map(&mapping(&[StepMap::new(3, 8, 0)]));
        assert!(tracker.get(id).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn completion_replaces_intact_placeholder() {
        let state = EditorState::from_text(&format!("a {DEFAULT_PLACEHOLDER} b"));
        let mut tracker = PlaceholderTracker::new();
        let id = tracker.track(3, DEFAULT_PLACEHOLDER, CommandPresentation::default());
        let placeholder = tracker.take(id).unwrap();
        let tr = completion_transaction(&state, &placeholder, &Ok("ha".to_string()))
            .unwrap()
            .expect("placeholder intact");
        assert_eq!(state.apply(&tr).doc().display_text(), "a 😄 ha b");
    }

    #[test]
    fn completion_abandons_edited_placeholder() {
        let state = EditorState::from_text("a changed b");
        let mut tracker = PlaceholderTracker::new();
        let id = tracker.track(3, "waiting", CommandPresentation::default());
        let placeholder = tracker.take(id).unwrap();
        let tr = completion_transaction(&state, &placeholder, &Ok("x".to_string())).unwrap();
        assert!(tr.is_none());
    }

    #[test]
    fn registry_looks_up_by_id() {
        struct Fixed;
        impl CommandGenerator for Fixed {
            fn generate(&self) -> command_provider::BoxFuture<'static, Result<String, CommandError>> {
                Box::pin(async { Ok("fixed".to_string()) })
            }
        }

        let registry = CommandRegistry::new().with("joke", Arc::new(Fixed));
        assert!(registry.contains("joke"));
        assert!(registry.get("other").is_none());
    }
}
