pub mod drag;
pub mod events;
pub mod handler;
pub mod zoom;

// Re-export the essential types
pub use drag::{DragController, GestureSession};
pub use events::{InputEvent, TouchEventType, TouchPoint};
pub use handler::{Action, InputRouter};
pub use zoom::{ZoomController, ZoomFollowUp, ZoomState, ZoomTask, ZoomTrigger};
