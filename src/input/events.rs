use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Raw input events delivered by the host, in device coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Primary button pressed
    MouseDown { position: Point },
    /// Primary button released
    MouseUp { position: Point },
    /// Pointer moved, pressed or not
    MouseMove { position: Point },
    /// Double click/tap
    DoubleClick { position: Point },
    /// Scroll wheel; positive `delta_y` scrolls down
    Wheel { delta_y: f64 },
    /// Touch events; `touches` lists the points still in contact
    Touch {
        event_type: TouchEventType,
        touches: Vec<TouchPoint>,
    },
    /// Viewport/window resize
    Resize { width: f64, height: f64 },
}

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchEventType {
    Start,
    Move,
    End,
    Cancel,
}

/// Individual touch point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, position: Point) -> Self {
        Self { id, position }
    }
}

impl InputEvent {
    /// Single-touch convenience constructor
    pub fn touch(event_type: TouchEventType, position: Option<Point>) -> Self {
        InputEvent::Touch {
            event_type,
            touches: position
                .map(|p| vec![TouchPoint::new(0, p)])
                .unwrap_or_default(),
        }
    }

    /// Normalized pointer position: the mouse position, or the first active touch
    ///
    /// Non-finite coordinates count as missing.
    pub fn position(&self) -> Option<Point> {
        let position = match self {
            InputEvent::MouseDown { position }
            | InputEvent::MouseUp { position }
            | InputEvent::MouseMove { position }
            | InputEvent::DoubleClick { position } => Some(*position),
            InputEvent::Touch { touches, .. } => touches.first().map(|t| t.position),
            InputEvent::Wheel { .. } | InputEvent::Resize { .. } => None,
        };
        position.filter(Point::is_finite)
    }

    /// Checks if this is a mouse/pointer event
    pub fn is_pointer_event(&self) -> bool {
        matches!(
            self,
            InputEvent::MouseDown { .. }
                | InputEvent::MouseUp { .. }
                | InputEvent::MouseMove { .. }
                | InputEvent::DoubleClick { .. }
                | InputEvent::Wheel { .. }
        )
    }

    /// Checks if this is a touch event
    pub fn is_touch_event(&self) -> bool {
        matches!(self, InputEvent::Touch { .. })
    }
}
