//! Suggestion catalog: the ordered candidate table the popup filters.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::core::document::Category;
use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: String,
    pub label: String,
    pub category: Category,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, label: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category,
            description: None,
            icon: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Label with the category prefix glyph, as committed into the document.
    pub fn display_label(&self) -> String {
        format!("{}{}", self.category.prefix(), self.label)
    }

    pub fn is_command(&self) -> bool {
        self.category == Category::Command
    }
}

/// Immutable, ordered suggestion table with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionCatalog {
    entries: Vec<Suggestion>,
}

impl SuggestionCatalog {
    pub fn new(entries: Vec<Suggestion>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.label.trim().is_empty() {
                return Err(CatalogError::EmptyLabel(entry.id.clone()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Suggestion] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Suggestion> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}

impl Default for SuggestionCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

/// Built-in entries loaded at startup.
pub static DEFAULT_CATALOG: Lazy<SuggestionCatalog> = Lazy::new(|| SuggestionCatalog {
    entries: vec![
        Suggestion::new("1", "mention", Category::Person).with_description("Mention someone"),
        Suggestion::new("2", "meeting", Category::Tag).with_description("Meeting notes"),
        Suggestion::new("3", "memo", Category::Tag).with_description("Quick memo"),
        Suggestion::new("4", "task", Category::Tag).with_description("Track a task"),
        Suggestion::new("5", "todo", Category::Tag).with_description("Something to do"),
        Suggestion::new("alice", "alice", Category::Person).with_icon("👩"),
        Suggestion::new("bob", "bob", Category::Person).with_icon("👨"),
        Suggestion::new("joke", "joke", Category::Command)
            .with_description("Tell a programming joke")
            .with_icon("🤖"),
    ],
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_valid() {
        let catalog = SuggestionCatalog::default();
        assert!(SuggestionCatalog::new(catalog.entries().to_vec()).is_ok());
        assert_eq!(catalog.get("joke").map(|s| s.category), Some(Category::Command));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = SuggestionCatalog::new(vec![
            Suggestion::new("a", "one", Category::Tag),
            Suggestion::new("a", "two", Category::Tag),
        ]);
        assert_eq!(result, Err(CatalogError::DuplicateId("a".to_string())));
    }

    #[test]
    fn blank_labels_are_rejected() {
        let result = SuggestionCatalog::new(vec![Suggestion::new("x", "  ", Category::Person)]);
        assert_eq!(result, Err(CatalogError::EmptyLabel("x".to_string())));
    }

    #[test]
    fn display_label_uses_category_prefix() {
        assert_eq!(
            Suggestion::new("1", "ann", Category::Person).display_label(),
            "@ann"
        );
        assert_eq!(Suggestion::new("2", "todo", Category::Tag).display_label(), "#todo");
        assert_eq!(
            Suggestion::new("3", "joke", Category::Command).display_label(),
            "✨joke"
        );
    }
}
