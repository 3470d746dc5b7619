pub mod geojson;
pub mod meteorites;
pub mod topojson;
