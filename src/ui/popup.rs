//! Hover detail overlay.

use crate::core::geo::Point;
use crate::data::meteorites::Meteorite;

/// Gap between the pointer and the overlay's top edge
const POINTER_OFFSET: f64 = 20.0;
/// Overlay width used for placement
const POPUP_WIDTH: f64 = 200.0;
/// Margin kept from the right edge when the overlay would overflow
const EDGE_MARGIN: f64 = 10.0;

/// Collaborator that presents record details next to the pointer
pub trait Popup: Send {
    /// Opens (or moves) the overlay for a record hovered at `pointer`
    fn show(&mut self, meteorite: &Meteorite, pointer: Point, viewport_width: f64);

    /// Closes the overlay; closing a closed overlay is a no-op
    fn dismiss(&mut self);

    fn is_open(&self) -> bool;
}

/// What an open overlay shows and where
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub lines: Vec<String>,
    /// Top-left corner in viewport pixels
    pub position: Point,
}

impl PopupContent {
    pub fn new(meteorite: &Meteorite, pointer: Point, viewport_width: f64) -> Self {
        Self {
            lines: meteorite.detail_lines(),
            position: place(pointer, viewport_width),
        }
    }
}

/// Below-right of the pointer, pinned to the right edge when it would not fit
pub fn place(pointer: Point, viewport_width: f64) -> Point {
    let space = viewport_width - (pointer.x + POPUP_WIDTH + POINTER_OFFSET);
    let x = if space > 0.0 {
        pointer.x
    } else {
        viewport_width - POPUP_WIDTH - EDGE_MARGIN
    };
    Point::new(x, pointer.y + POINTER_OFFSET)
}

/// Headless overlay that records its current content
#[derive(Debug, Default)]
pub struct DetailPopup {
    content: Option<PopupContent>,
    shown: usize,
}

impl DetailPopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<&PopupContent> {
        self.content.as_ref()
    }

    /// Number of times the overlay was opened or moved
    pub fn times_shown(&self) -> usize {
        self.shown
    }
}

impl Popup for DetailPopup {
    fn show(&mut self, meteorite: &Meteorite, pointer: Point, viewport_width: f64) {
        self.content = Some(PopupContent::new(meteorite, pointer, viewport_width));
        self.shown += 1;
    }

    fn dismiss(&mut self) {
        self.content = None;
    }

    fn is_open(&self) -> bool {
        self.content.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement() {
        assert_eq!(place(Point::new(100.0, 50.0), 960.0), Point::new(100.0, 70.0));
        // 900 + 220 overflows a 960 px viewport
        assert_eq!(place(Point::new(900.0, 50.0), 960.0), Point::new(750.0, 70.0));
    }

    #[test]
    fn test_show_and_dismiss() {
        let meteorite = Meteorite {
            id: Some("7".into()),
            name: Some("Abee".into()),
            year: Some("1952-01-01T00:00:00.000".into()),
            mass: Some(serde_json::json!("107000")),
            recclass: Some("EH4".into()),
            reclat: Some("54.216670".into()),
            reclong: Some("-113.000000".into()),
            position: None,
        };
        let mut popup = DetailPopup::new();
        assert!(!popup.is_open());

        popup.show(&meteorite, Point::new(10.0, 10.0), 960.0);
        assert!(popup.is_open());
        let content = popup.content().unwrap();
        assert_eq!(content.lines[1], "name: Abee");
        assert_eq!(content.lines[2], "year: 1952");

        popup.dismiss();
        popup.dismiss();
        assert!(!popup.is_open());
        assert_eq!(popup.times_shown(), 1);
    }
}
