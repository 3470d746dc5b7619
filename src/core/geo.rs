use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate from a GeoJSON/TopoJSON position, which is `[lng, lat]` ordered
    pub fn from_position(position: [f64; 2]) -> Self {
        Self::new(position[1], position[0])
    }

    /// The geographic origin (0°, 0°)
    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Offsets this coordinate by the given deltas in degrees
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> LatLng {
        LatLng::new(self.lat + d_lat, self.lng + d_lng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::origin()
    }
}

/// Represents a point in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
