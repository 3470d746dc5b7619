use crate::{
    core::geo::Point,
    layers::vector::{LineStyle, PointStyle, PolygonStyle},
};

/// Commands recorded by layers during a draw pass
///
/// The host turns these into actual vector paths; stroking and filling are
/// not this crate's concern.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Point {
        position: Point,
        style: PointStyle,
    },
    Line {
        points: Vec<Point>,
        style: LineStyle,
    },
    Polygon {
        exterior: Vec<Point>,
        holes: Vec<Vec<Point>>,
        style: PolygonStyle,
    },
}

/// Draw-command buffer filled once per frame
pub struct RenderContext {
    pub width: f64,
    pub height: f64,
    /// Commands of the current frame, in paint order
    pub drawing_queue: Vec<DrawCommand>,
}

impl RenderContext {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
        }
    }

    /// Begin a frame
    pub fn begin_frame(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.drawing_queue.clear();
    }

    /// Render a point at the given position with the given style
    pub fn render_point(&mut self, position: &Point, style: &PointStyle) {
        self.drawing_queue.push(DrawCommand::Point {
            position: *position,
            style: style.clone(),
        });
    }

    /// Render a line with the given points and style
    pub fn render_line(&mut self, points: &[Point], style: &LineStyle) {
        if points.len() < 2 {
            return;
        }
        self.drawing_queue.push(DrawCommand::Line {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    /// Render a polygon with exterior ring, holes, and style
    pub fn render_polygon(&mut self, exterior: &[Point], holes: &[Vec<Point>], style: &PolygonStyle) {
        if exterior.len() < 3 {
            return;
        }
        self.drawing_queue.push(DrawCommand::Polygon {
            exterior: exterior.to_vec(),
            holes: holes.to_vec(),
            style: style.clone(),
        });
    }

    /// Get the current drawing queue
    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    /// Clear the drawing queue
    pub fn clear_queue(&mut self) {
        self.drawing_queue.clear();
    }
}

/// Frame-draw hook, invoked once per coalesced frame with the recorded commands
pub trait FrameSink {
    fn present(&mut self, frame: &RenderContext);
}

/// Sink that keeps the last presented frame; used by headless hosts and tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames_presented: u64,
    pub last_frame: Vec<DrawCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_points(&self) -> usize {
        self.last_frame
            .iter()
            .filter(|command| matches!(command, DrawCommand::Point { .. }))
            .count()
    }

    pub fn count_lines(&self) -> usize {
        self.last_frame
            .iter()
            .filter(|command| matches!(command, DrawCommand::Line { .. }))
            .count()
    }

    pub fn count_polygons(&self) -> usize {
        self.last_frame
            .iter()
            .filter(|command| matches!(command, DrawCommand::Polygon { .. }))
            .count()
    }
}

impl FrameSink for RecordingSink {
    fn present(&mut self, frame: &RenderContext) {
        self.frames_presented += 1;
        self.last_frame = frame.get_drawing_queue().to_vec();
    }
}
