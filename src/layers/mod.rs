pub mod base;
pub mod macros;
pub mod manager;
pub mod marker;
pub mod vector;

pub use base::{LayerProperties, LayerTrait, LayerType};
pub use manager::LayerManager;
pub use marker::{CrosshairLayer, MeteorLayer};
pub use vector::{Color, GraticuleLayer, LineStyle, PathLayer, PointStyle, PolygonStyle};
