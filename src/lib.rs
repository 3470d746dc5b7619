//! # meteormap
//!
//! An interactive world map engine rendering a scattered point dataset over an
//! equirectangular projection.
//!
//! The heart of the crate is the interaction/render coordination engine in
//! [`core::map::MapView`]: a frame scheduler that coalesces redraw requests,
//! a hold-to-zoom state machine driven by deferred tasks, and a drag controller
//! that previews translation live and re-centers the projection on release.
//! Drawing primitives are left to the host through [`rendering::context::FrameSink`].

pub mod background;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::MapOptions,
    geo::{LatLng, Point},
    map::MapView,
    projection::{ProjectionState, ViewportContext},
};

pub use input::{
    drag::DragController,
    events::InputEvent,
    handler::{Action, InputRouter},
    zoom::{ZoomController, ZoomState},
};

pub use layers::base::LayerTrait;

pub use rendering::{
    context::{DrawCommand, FrameSink, RenderContext},
    scheduler::RenderScheduler,
};

pub use data::{
    geojson::GeoJson,
    meteorites::{MeteorDataset, Meteorite, SizeBuckets},
    topojson::Topology,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),
}

/// Error type alias for convenience
pub type Error = MapError;
