use crate::core::geo::LatLng;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<HashMap<String, serde_json::Value>>,
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
}

impl GeoJson {
    /// Parses a GeoJSON document
    pub fn parse(geojson_str: &str) -> Result<Self> {
        serde_json::from_str(geojson_str)
            .map_err(|e| MapError::ParseError(format!("Invalid GeoJSON: {}", e)))
    }

    /// All features in document order
    pub fn features(&self) -> Vec<&GeoJsonFeature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features.iter().collect(),
        }
    }
}

impl GeoJsonFeature {
    /// Raw property value
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.as_ref().and_then(|props| props.get(key))
    }

    /// Property rendered as text; numbers are formatted, null and missing give `None`
    pub fn property_text(&self, key: &str) -> Option<String> {
        match self.property(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Point position of this feature, if its geometry is a point
    pub fn point(&self) -> Option<LatLng> {
        match self.geometry.as_ref()? {
            GeoJsonGeometry::Point { coordinates } => Some(LatLng::from_position(*coordinates)),
            _ => None,
        }
    }
}

impl GeoJsonGeometry {
    /// Converts coordinates to LatLng points
    pub fn to_lat_lng_points(&self) -> Vec<LatLng> {
        match self {
            GeoJsonGeometry::Point { coordinates } => vec![LatLng::from_position(*coordinates)],
            GeoJsonGeometry::LineString { coordinates }
            | GeoJsonGeometry::MultiPoint { coordinates } => {
                coordinates.iter().copied().map(LatLng::from_position).collect()
            }
            GeoJsonGeometry::Polygon { coordinates }
            | GeoJsonGeometry::MultiLineString { coordinates } => coordinates
                .iter()
                .flatten()
                .copied()
                .map(LatLng::from_position)
                .collect(),
            GeoJsonGeometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flatten()
                .flatten()
                .copied()
                .map(LatLng::from_position)
                .collect(),
            GeoJsonGeometry::GeometryCollection { geometries } => geometries
                .iter()
                .flat_map(GeoJsonGeometry::to_lat_lng_points)
                .collect(),
        }
    }

    /// Polygons of this geometry as rings (exterior first)
    pub fn polygons(&self) -> Vec<&Vec<Vec<[f64; 2]>>> {
        match self {
            GeoJsonGeometry::Polygon { coordinates } => vec![coordinates],
            GeoJsonGeometry::MultiPolygon { coordinates } => coordinates.iter().collect(),
            GeoJsonGeometry::GeometryCollection { geometries } => {
                geometries.iter().flat_map(GeoJsonGeometry::polygons).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Line strings of this geometry
    pub fn lines(&self) -> Vec<&Vec<[f64; 2]>> {
        match self {
            GeoJsonGeometry::LineString { coordinates } => vec![coordinates],
            GeoJsonGeometry::MultiLineString { coordinates } => coordinates.iter().collect(),
            GeoJsonGeometry::GeometryCollection { geometries } => {
                geometries.iter().flat_map(GeoJsonGeometry::lines).collect()
            }
            _ => Vec::new(),
        }
    }
}
