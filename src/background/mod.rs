pub mod geometry;

#[cfg(feature = "tokio-runtime")]
pub use geometry::spawn_geometry_load;
pub use geometry::{
    load_geometry, GeometrySource, HttpGeometrySource, PendingGeometry, StaticGeometrySource,
    WorldGeometry,
};
