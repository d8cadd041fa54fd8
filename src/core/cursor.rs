use crate::core::text::width::visible_width;

/// Zero-width APC sequence marking where the terminal cursor belongs.
pub const CURSOR_MARKER: &str = "\x1b_mention:c\x07";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub row: usize,
    pub col: usize,
}

/// Finds the cursor marker in rendered lines and returns its cell position.
/// The marker is left in place.
pub fn locate_cursor_marker(lines: &[String]) -> Option<CursorPos> {
    lines.iter().enumerate().find_map(|(row, line)| {
        line.find(CURSOR_MARKER).map(|index| CursorPos {
            row,
            col: visible_width(&line[..index]),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_column_ignores_styling() {
        let lines = vec![
            "top".to_string(),
            format!("\x1b[34m@ann\x1b[0m {CURSOR_MARKER}"),
        ];
        assert_eq!(
            locate_cursor_marker(&lines),
            Some(CursorPos { row: 1, col: 5 })
        );
    }

    #[test]
    fn missing_marker_yields_none() {
        assert_eq!(locate_cursor_marker(&["plain".to_string()]), None);
    }
}
