use crate::{
    core::{config::MapOptions, geo::Point, projection::ViewportContext},
    input::events::{InputEvent, TouchEventType},
};

/// Normalized instruction produced from a raw input event
///
/// Actions come out in the order they must be applied: zoom start/end first,
/// then the overlay policy, then drag position updates.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Press began: arm the hold-to-zoom timer
    ZoomStart,
    /// Press released or pointer moved: cancel the hold timer
    ZoomEnd,
    DragStart(Point),
    DragMove(Point),
    /// Release, with the release position when the device reports one
    Drop(Option<Point>),
    /// A drag is confirmed in progress: hide the detail overlay
    DismissOverlay,
    /// Pointer moved without a press: inspect what lies underneath
    Hover(Point),
    Wheel(f64),
    DoubleActivate,
    Resize(ViewportContext),
}

/// Routes device events to the zoom and drag controllers
pub struct InputRouter {
    enabled: bool,
    dragging: bool,
    hold_zoom: bool,
    scroll_wheel_zoom: bool,
    double_click_zoom: bool,
    hover_details: bool,
    viewport_height: f64,
    max_viewport_width: f64,
}

impl InputRouter {
    pub fn new(options: &MapOptions) -> Self {
        Self {
            enabled: true,
            dragging: options.dragging,
            hold_zoom: options.hold_zoom,
            scroll_wheel_zoom: options.scroll_wheel_zoom,
            double_click_zoom: options.double_click_zoom,
            hover_details: options.hover_details,
            viewport_height: options.viewport_height,
            max_viewport_width: options.max_viewport_width,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stops or resumes routing altogether
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_dragging(&mut self, enabled: bool) {
        self.dragging = enabled;
    }

    pub fn hold_zoom(&self) -> bool {
        self.hold_zoom
    }

    pub fn set_hold_zoom(&mut self, enabled: bool) {
        self.hold_zoom = enabled;
    }

    pub fn set_scroll_wheel_zoom(&mut self, enabled: bool) {
        self.scroll_wheel_zoom = enabled;
    }

    pub fn set_double_click_zoom(&mut self, enabled: bool) {
        self.double_click_zoom = enabled;
    }

    pub fn set_hover_details(&mut self, enabled: bool) {
        self.hover_details = enabled;
    }

    /// Translates one event into actions
    ///
    /// `drag_armed` tells whether a press is currently in progress. Malformed
    /// events (touches without a touch point, non-finite values) yield nothing.
    pub fn handle_event(&mut self, event: InputEvent, drag_armed: bool) -> Vec<Action> {
        if !self.enabled {
            return vec![];
        }

        let position = event.position();
        let mut actions = vec![];

        match event {
            InputEvent::MouseDown { .. } => {
                if let Some(point) = position {
                    self.press(point, &mut actions);
                }
            }
            InputEvent::MouseUp { .. } => self.release(position, &mut actions),
            InputEvent::MouseMove { .. } => {
                if let Some(point) = position {
                    self.pointer_moved(point, drag_armed, true, &mut actions);
                }
            }
            InputEvent::Touch { event_type, .. } => match (event_type, position) {
                (TouchEventType::Start, Some(point)) => self.press(point, &mut actions),
                (TouchEventType::Move, Some(point)) => {
                    self.pointer_moved(point, drag_armed, false, &mut actions)
                }
                // Touch lists on release only hold the remaining contacts
                (TouchEventType::End | TouchEventType::Cancel, _) => {
                    self.release(None, &mut actions)
                }
                (event_type, None) => {
                    log::debug!("touch {:?} without a touch point ignored", event_type);
                }
            },
            InputEvent::Wheel { delta_y } => {
                if self.scroll_wheel_zoom && delta_y.is_finite() {
                    actions.push(Action::Wheel(delta_y));
                }
            }
            InputEvent::DoubleClick { .. } => {
                if self.double_click_zoom {
                    actions.push(Action::DoubleActivate);
                }
            }
            InputEvent::Resize { width, .. } => {
                match ViewportContext::from_client(width, self.viewport_height, self.max_viewport_width) {
                    Ok(viewport) => actions.push(Action::Resize(viewport)),
                    Err(e) => log::warn!("resize ignored: {}", e),
                }
            }
        }

        actions
    }

    fn press(&self, point: Point, actions: &mut Vec<Action>) {
        if self.hold_zoom {
            actions.push(Action::ZoomStart);
        }
        if self.dragging {
            actions.push(Action::DragStart(point));
        }
    }

    fn release(&self, position: Option<Point>, actions: &mut Vec<Action>) {
        if self.hold_zoom {
            actions.push(Action::ZoomEnd);
        }
        if self.dragging {
            actions.push(Action::Drop(position));
        }
    }

    fn pointer_moved(&self, point: Point, drag_armed: bool, can_hover: bool, actions: &mut Vec<Action>) {
        if self.hold_zoom {
            actions.push(Action::ZoomEnd);
        }
        if drag_armed && self.dragging {
            actions.push(Action::DismissOverlay);
            actions.push(Action::DragMove(point));
        } else if can_hover && self.hover_details {
            actions.push(Action::Hover(point));
        }
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(&MapOptions::default())
    }
}
