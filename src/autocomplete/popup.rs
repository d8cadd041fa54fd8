//! Popup placement, derived from session state and anchor coordinates.

use crate::autocomplete::session::SessionState;

/// Vertical gap between the anchor's bottom edge and the popup.
pub const DEFAULT_POPUP_OFFSET: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub left: i32,
    pub top: i32,
}

/// Resolves document positions to screen rectangles.
pub trait PositionCoords {
    fn coords_at(&self, pos: usize) -> Option<ScreenRect>;
}

impl<F> PositionCoords for F
where
    F: Fn(usize) -> Option<ScreenRect>,
{
    fn coords_at(&self, pos: usize) -> Option<ScreenRect> {
        self(pos)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupPlacement {
    pub left: i32,
    pub top: i32,
}

/// Where the popup goes relative to `origin`, or `None` when nothing should
/// be shown.
pub fn present_popup(
    session: &SessionState,
    candidate_count: usize,
    coords: &dyn PositionCoords,
    origin: ScreenPoint,
    offset: i32,
) -> Option<PopupPlacement> {
    if !session.active || candidate_count == 0 {
        return None;
    }
    let rect = coords.coords_at(session.anchor?)?;
    Some(PopupPlacement {
        left: rect.left - origin.left,
        top: rect.bottom - origin.top + offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(pos: usize) -> Option<ScreenRect> {
        (pos < 100).then_some(ScreenRect {
            left: pos as i32 * 8,
            top: 40,
            right: pos as i32 * 8 + 8,
            bottom: 56,
        })
    }

    #[test]
    fn placement_is_relative_to_origin() {
        let placement = present_popup(
            &SessionState::open(5, "me"),
            3,
            &coords,
            ScreenPoint { left: 10, top: 30 },
            DEFAULT_POPUP_OFFSET,
        );
        assert_eq!(placement, Some(PopupPlacement { left: 30, top: 46 }));
    }

    #[test]
    fn nothing_to_show_yields_none() {
        let origin = ScreenPoint::default();
        assert_eq!(
            present_popup(&SessionState::inactive(), 3, &coords, origin, 0),
            None
        );
        assert_eq!(present_popup(&SessionState::open(5, "x"), 0, &coords, origin, 0), None);
        assert_eq!(present_popup(&SessionState::open(500, ""), 2, &coords, origin, 0), None);
    }
}
