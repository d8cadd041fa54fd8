//! Popup list of filtered suggestions.
//!
//! The list owns no selection state: the autocomplete session does. Each
//! render receives the filtered candidates and the selected index.

use crate::autocomplete::catalog::Suggestion;
use crate::core::document::Category;
use crate::core::text::width::{truncate_to_width, visible_width};

const LABEL_COLUMN: usize = 16;
const MIN_DESCRIPTION_WIDTH: usize = 8;

pub struct SuggestionListTheme {
    pub selected_text: Box<dyn Fn(&str) -> String>,
    pub description: Box<dyn Fn(&str) -> String>,
    pub scroll_info: Box<dyn Fn(&str) -> String>,
    pub category: Box<dyn Fn(Category, &str) -> String>,
}

impl SuggestionListTheme {
    /// Theme that applies no styling.
    pub fn plain() -> Self {
        Self {
            selected_text: Box::new(|text| text.to_string()),
            description: Box::new(|text| text.to_string()),
            scroll_info: Box::new(|text| text.to_string()),
            category: Box::new(|_, text| text.to_string()),
        }
    }

    /// ANSI colours: people blue, commands magenta, tags green.
    pub fn ansi() -> Self {
        Self {
            selected_text: Box::new(|text| format!("\x1b[7m{text}\x1b[27m")),
            description: Box::new(|text| format!("\x1b[2m{text}\x1b[22m")),
            scroll_info: Box::new(|text| format!("\x1b[2m{text}\x1b[22m")),
            category: Box::new(|category, text| {
                format!("\x1b[{}m{text}\x1b[39m", category_color(category))
            }),
        }
    }
}

pub(crate) fn category_color(category: Category) -> u8 {
    match category {
        Category::Person => 34,
        Category::Command => 35,
        Category::Tag => 32,
    }
}

pub struct SuggestionList {
    max_visible: usize,
    theme: SuggestionListTheme,
}

impl SuggestionList {
    pub fn new(max_visible: usize, theme: SuggestionListTheme) -> Self {
        Self {
            max_visible: max_visible.max(1),
            theme,
        }
    }

    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    pub fn set_max_visible(&mut self, max_visible: usize) {
        self.max_visible = max_visible.max(1);
    }

    /// First visible row, keeping `selected` roughly centred.
    pub fn window_start(&self, count: usize, selected: usize) -> usize {
        let visible = self.max_visible.min(count);
        if count <= visible {
            return 0;
        }
        selected
            .saturating_sub(visible / 2)
            .min(count - visible)
    }

    pub fn render(&self, width: usize, items: &[&Suggestion], selected: usize) -> Vec<String> {
        if items.is_empty() || width == 0 {
            return Vec::new();
        }
        let selected = selected.min(items.len() - 1);
        let start = self.window_start(items.len(), selected);
        let end = (start + self.max_visible).min(items.len());

        let mut lines: Vec<String> = items[start..end]
            .iter()
            .enumerate()
            .map(|(offset, item)| self.render_item(width, item, start + offset == selected))
            .collect();

        if start > 0 || end < items.len() {
            let info = format!("  ({}/{})", selected + 1, items.len());
            lines.push((self.theme.scroll_info)(&truncate_to_width(&info, width, "")));
        }
        lines
    }

    fn render_item(&self, width: usize, item: &Suggestion, selected: bool) -> String {
        let marker = if selected { "→ " } else { "  " };
        let label = match item.icon.as_deref() {
            Some(icon) => format!("{icon} {}", item.display_label()),
            None => item.display_label(),
        };
        let label = truncate_to_width(
            &label,
            LABEL_COLUMN.min(width.saturating_sub(2)),
            "…",
        );
        let label_width = visible_width(&label);
        let styled_label = (self.theme.category)(item.category, &label);

        let description = item
            .description
            .as_deref()
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|text| !text.is_empty());
        let used = 2 + LABEL_COLUMN.max(label_width) + 1;
        let line = match description {
            Some(text) if width > used + MIN_DESCRIPTION_WIDTH => {
                let padding = " ".repeat(LABEL_COLUMN.saturating_sub(label_width) + 1);
                let text = truncate_to_width(&text, width - used, "…");
                format!("{marker}{styled_label}{padding}{}", (self.theme.description)(&text))
            }
            _ => format!("{marker}{styled_label}"),
        };
        if selected {
            (self.theme.selected_text)(&line)
        } else {
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocomplete::catalog::SuggestionCatalog;
    use crate::autocomplete::filter::filter;

    fn labels(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.split_whitespace().take(2).collect::<Vec<_>>().join(" "))
            .collect()
    }

    #[test]
    fn renders_prefixed_labels_with_marker() {
        let catalog = SuggestionCatalog::default();
        let items = filter(&catalog, "me");
        let list = SuggestionList::new(5, SuggestionListTheme::plain());
        let lines = list.render(20, &items, 1);
        assert_eq!(labels(&lines), ["@mention", "→ #meeting", "#memo"]);
    }

    #[test]
    fn long_lists_scroll_with_indicator() {
        let catalog = SuggestionCatalog::default();
        let items = filter(&catalog, "");
        let list = SuggestionList::new(3, SuggestionListTheme::plain());
        let lines = list.render(60, &items, 5);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3].trim(), format!("(6/{})", items.len()));
        assert!(lines[1].starts_with("→ "));
    }

    #[test]
    fn descriptions_fit_the_width() {
        let catalog = SuggestionCatalog::default();
        let items = filter(&catalog, "task");
        let list = SuggestionList::new(5, SuggestionListTheme::plain());
        let wide = list.render(60, &items, 0);
        assert!(wide[0].contains("Track a task"));
        let narrow = list.render(22, &items, 0);
        assert!(visible_width(&narrow[0]) <= 22);
    }

    #[test]
    fn icons_precede_the_prefixed_label() {
        let catalog = SuggestionCatalog::default();
        let items = filter(&catalog, "ali");
        let list = SuggestionList::new(5, SuggestionListTheme::plain());
        let lines = list.render(40, &items, 0);
        assert_eq!(lines, ["→ 👩 @alice"]);
    }

    #[test]
    fn empty_list_renders_nothing() {
        let list = SuggestionList::new(5, SuggestionListTheme::plain());
        assert!(list.render(40, &[], 0).is_empty());
    }
}
