//! Document steps, position mapping and transactions.
//!
//! A [`Transaction`] is the only way to change an [`EditorState`]. It records
//! the steps it applied, the position mapping they produce, the resulting
//! selection, and typed metadata that plugins attach for each other.
//!
//! [`EditorState`]: crate::core::state::EditorState

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::core::document::{Document, Inline, Mark};
use crate::core::state::Selection;
use crate::error::DocumentError;

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    /// The position sat strictly inside a replaced range.
    pub deleted: bool,
}

/// Position mapping for a single replaced range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMap {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

impl StepMap {
    pub fn new(start: usize, old_size: usize, new_size: usize) -> Self {
        Self {
            start,
            old_size,
            new_size,
        }
    }

    pub fn identity() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let end = self.start + self.old_size;
        if pos < self.start || (self.old_size == 0 && self.new_size == 0) {
            return MapResult {
                pos,
                deleted: false,
            };
        }
        if pos > end {
            return MapResult {
                pos: pos - self.old_size + self.new_size,
                deleted: false,
            };
        }

        // Range edges stick to the surviving side; interior positions follow `assoc`.
        let side = if self.old_size == 0 {
            assoc
        } else if pos == self.start {
            Assoc::Before
        } else if pos == end {
            Assoc::After
        } else {
            assoc
        };
        let mapped = match side {
            Assoc::Before => self.start,
            Assoc::After => self.start + self.new_size,
        };
        MapResult {
            pos: mapped,
            deleted: pos > self.start && pos < end,
        }
    }
}

/// Ordered list of step maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        self.maps.iter().fold(
            MapResult {
                pos,
                deleted: false,
            },
            |acc, map| {
                let next = map.map_result(acc.pos, assoc);
                MapResult {
                    pos: next.pos,
                    deleted: acc.deleted || next.deleted,
                }
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Replace {
        from: usize,
        to: usize,
        content: Vec<Inline>,
    },
    Split {
        pos: usize,
    },
    AddMark {
        from: usize,
        to: usize,
        mark: Mark,
    },
    ReplaceAll {
        doc: Document,
    },
}

impl Step {
    pub fn apply(&self, doc: &Document) -> Result<(Document, StepMap), DocumentError> {
        match self {
            Step::Replace { from, to, content } => {
                let new_size = content.iter().map(Inline::size).sum();
                let next = doc.replace(*from, *to, content.clone())?;
                Ok((next, StepMap::new(*from, to - from, new_size)))
            }
            Step::Split { pos } => Ok((doc.split(*pos)?, StepMap::new(*pos, 0, 2))),
            Step::AddMark { from, to, mark } => {
                Ok((doc.add_mark(*from, *to, mark)?, StepMap::identity()))
            }
            Step::ReplaceAll { doc: next } => Ok((
                next.clone(),
                StepMap::new(0, doc.content_size(), next.content_size()),
            )),
        }
    }
}

/// A batch of steps applied atomically to one state.
pub struct Transaction {
    before: Document,
    doc: Document,
    steps: Vec<Step>,
    mapping: Mapping,
    selection: Selection,
    selection_set: bool,
    add_to_history: bool,
    meta: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("steps", &self.steps)
            .field("selection", &self.selection)
            .field("selection_set", &self.selection_set)
            .field("add_to_history", &self.add_to_history)
            .field("meta_entries", &self.meta.len())
            .finish()
    }
}

impl Transaction {
    pub(crate) fn new(doc: Document, selection: Selection) -> Self {
        Self {
            before: doc.clone(),
            doc,
            steps: Vec::new(),
            mapping: Mapping::new(),
            selection,
            selection_set: false,
            add_to_history: true,
            meta: HashMap::new(),
        }
    }

    /// Document the transaction started from.
    pub fn before(&self) -> &Document {
        &self.before
    }

    /// Document after every step so far.
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selection_set(&self) -> bool {
        self.selection_set
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn step(&mut self, step: Step) -> Result<&mut Self, DocumentError> {
        let (doc, map) = step.apply(&self.doc)?;
        self.doc = doc;
        self.mapping.push(map);
        self.steps.push(step);
        self.selection = self.selection.map(&map, &self.doc);
        Ok(self)
    }

    pub fn replace(
        &mut self,
        from: usize,
        to: usize,
        content: Vec<Inline>,
    ) -> Result<&mut Self, DocumentError> {
        if from == to && content.is_empty() {
            return Ok(self);
        }
        self.step(Step::Replace { from, to, content })
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, DocumentError> {
        self.replace(from, to, Vec::new())
    }

    pub fn insert(&mut self, pos: usize, content: Vec<Inline>) -> Result<&mut Self, DocumentError> {
        self.replace(pos, pos, content)
    }

    /// Inserts plain text; `\n` becomes a hard break.
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<&mut Self, DocumentError> {
        self.insert(pos, Inline::from_plain_text(text))
    }

    pub fn split(&mut self, pos: usize) -> Result<&mut Self, DocumentError> {
        self.step(Step::Split { pos })
    }

    pub fn add_mark(
        &mut self,
        from: usize,
        to: usize,
        mark: Mark,
    ) -> Result<&mut Self, DocumentError> {
        self.step(Step::AddMark { from, to, mark })
    }

    pub fn replace_document(&mut self, doc: Document) -> Result<&mut Self, DocumentError> {
        self.step(Step::ReplaceAll { doc })
    }

    /// Sets the resulting selection. Positions that do not land inside a
    /// paragraph are moved to the nearest one that does.
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = selection.clamp_to(&self.doc);
        self.selection_set = true;
        self
    }

    pub fn add_to_history(&self) -> bool {
        self.add_to_history
    }

    pub fn set_add_to_history(&mut self, add: bool) -> &mut Self {
        self.add_to_history = add;
        self
    }

    /// Attaches typed metadata; one value per type.
    pub fn set_meta<T: Any + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.meta.insert(TypeId::of::<T>(), Box::new(value));
        self
    }

    pub fn meta<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.meta
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::EditorState;
    use pretty_assertions::assert_eq;

    #[test]
    fn insertion_maps_by_assoc() {
        let map = StepMap::new(3, 0, 2);
        assert_eq!(map.map(2, Assoc::After), 2);
        assert_eq!(map.map(3, Assoc::Before), 3);
        assert_eq!(map.map(3, Assoc::After), 5);
        assert_eq!(map.map(4, Assoc::Before), 6);
    }

    #[test]
    fn deletion_marks_interior_positions() {
        let map = StepMap::new(2, 4, 0);
        assert_eq!(
            map.map_result(4, Assoc::After),
            MapResult {
                pos: 2,
                deleted: true
            }
        );
        assert!(!map.map_result(2, Assoc::After).deleted);
        assert!(!map.map_result(6, Assoc::Before).deleted);
        assert_eq!(map.map(8, Assoc::Before), 4);
    }

    #[test]
    fn mapping_composes_in_order() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap::new(1, 0, 3));
        mapping.push(StepMap::new(0, 2, 0));
        assert_eq!(mapping.map(5, Assoc::After), 6);
    }

    #[test]
    fn transaction_maps_selection_through_steps() {
        let state = EditorState::from_text("hello");
        let mut tr = state.tr();
        tr.set_selection(Selection::cursor(6));
        tr.insert_text(1, ">> ").unwrap();
        assert_eq!(tr.selection(), Selection::cursor(9));
        assert!(tr.doc_changed());
        assert_eq!(tr.doc().display_text(), ">> hello");
    }

    #[test]
    fn empty_replace_adds_no_step() {
        let state = EditorState::from_text("x");
        let mut tr = state.tr();
        tr.delete(1, 1).unwrap();
        assert!(!tr.doc_changed());
    }

    #[test]
    fn typed_meta_round_trips() {
        #[derive(Debug, PartialEq)]
        struct Tag(u8);

        let state = EditorState::from_text("");
        let mut tr = state.tr();
        assert_eq!(tr.meta::<Tag>(), None);
        tr.set_meta(Tag(7));
        assert_eq!(tr.meta::<Tag>(), Some(&Tag(7)));
    }

    #[test]
    fn failed_step_leaves_transaction_untouched() {
        let state = EditorState::from_text("ab");
        let mut tr = state.tr();
        assert!(tr.delete(1, 40).is_err());
        assert!(!tr.doc_changed());
        assert_eq!(tr.doc(), state.doc());
    }
}
