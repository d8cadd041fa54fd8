//! Component and Focusable traits.

use crate::core::cursor::CursorPos;
use crate::core::input_event::InputEvent;

/// Renderable, input-driven terminal component.
pub trait Component {
    /// Render to a list of lines at the given width.
    fn render(&mut self, width: usize) -> Vec<String>;

    fn handle_event(&mut self, _event: &InputEvent) {}

    /// Cursor position relative to the lines returned from the last `render()`.
    fn cursor_pos(&self) -> Option<CursorPos> {
        None
    }

    /// Invalidate any cached state.
    fn invalidate(&mut self) {}

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }
}

/// Components that only draw the cursor while focused.
pub trait Focusable {
    fn set_focused(&mut self, focused: bool);
    fn is_focused(&self) -> bool;
}
