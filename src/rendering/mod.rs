pub mod context;
pub mod scheduler;

pub use context::{DrawCommand, FrameSink, RecordingSink, RenderContext};
pub use scheduler::{FrameReport, PreFrame, RenderScheduler};
