//! TopoJSON decoding for the landmass and country-boundary resource.
//!
//! Only what the map draws is supported: converting an object into GeoJSON
//! geometry (`feature`) and extracting shared arcs as lines (`mesh`).

use crate::data::geojson::GeoJsonGeometry;
use crate::{MapError, Result};
use fxhash::FxHashMap;
use serde::Deserialize;
use std::collections::HashMap;

/// Quantization transform of a topology
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TopoTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl TopoTransform {
    fn apply(&self, position: [f64; 2]) -> [f64; 2] {
        [
            position[0] * self.scale[0] + self.translate[0],
            position[1] * self.scale[1] + self.translate[1],
        ]
    }
}

/// A geometry object inside a topology; line and polygon parts reference arcs by index
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum TopoObject {
    Point {
        coordinates: [f64; 2],
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    LineString {
        arcs: Vec<i64>,
    },
    MultiLineString {
        arcs: Vec<Vec<i64>>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
    },
    GeometryCollection {
        geometries: Vec<TopoObject>,
    },
    #[serde(other)]
    Empty,
}

impl TopoObject {
    /// Visits every arc reference of this object, in document order
    fn for_each_arc(&self, f: &mut impl FnMut(i64)) {
        match self {
            TopoObject::LineString { arcs } => arcs.iter().copied().for_each(f),
            TopoObject::MultiLineString { arcs } | TopoObject::Polygon { arcs } => {
                arcs.iter().flatten().copied().for_each(f)
            }
            TopoObject::MultiPolygon { arcs } => arcs.iter().flatten().flatten().copied().for_each(f),
            TopoObject::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.for_each_arc(&mut *f);
                }
            }
            TopoObject::Point { .. } | TopoObject::MultiPoint { .. } | TopoObject::Empty => {}
        }
    }

    /// Leaf geometries, flattening nested collections
    fn leaves<'a>(&'a self, out: &mut Vec<&'a TopoObject>) {
        match self {
            TopoObject::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.leaves(out);
                }
            }
            other => out.push(other),
        }
    }
}

/// A decoded TopoJSON topology with absolute arc coordinates
#[derive(Debug, Clone)]
pub struct Topology {
    arcs: Vec<Vec<[f64; 2]>>,
    transform: Option<TopoTransform>,
    objects: HashMap<String, TopoObject>,
}

#[derive(Deserialize)]
struct RawTopology {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<TopoTransform>,
    #[serde(default)]
    arcs: Vec<Vec<[f64; 2]>>,
    #[serde(default)]
    objects: HashMap<String, TopoObject>,
}

impl Topology {
    pub fn parse(topojson_str: &str) -> Result<Self> {
        let raw: RawTopology = serde_json::from_str(topojson_str)
            .map_err(|e| MapError::ParseError(format!("Invalid TopoJSON: {}", e)))?;
        if raw.kind != "Topology" {
            return Err(MapError::ParseError(format!(
                "Expected a Topology, found {}",
                raw.kind
            )));
        }

        let arcs = match raw.transform {
            Some(transform) => raw
                .arcs
                .into_iter()
                .map(|arc| decode_quantized_arc(&arc, &transform))
                .collect(),
            None => raw.arcs,
        };

        Ok(Self {
            arcs,
            transform: raw.transform,
            objects: raw.objects,
        })
    }

    pub fn object(&self, name: &str) -> Option<&TopoObject> {
        self.objects.get(name)
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Converts a topology object into GeoJSON geometry
    pub fn feature(&self, object: &TopoObject) -> Result<GeoJsonGeometry> {
        Ok(match object {
            TopoObject::Point { coordinates } => GeoJsonGeometry::Point {
                coordinates: self.point(*coordinates),
            },
            TopoObject::MultiPoint { coordinates } => GeoJsonGeometry::MultiPoint {
                coordinates: coordinates.iter().map(|c| self.point(*c)).collect(),
            },
            TopoObject::LineString { arcs } => GeoJsonGeometry::LineString {
                coordinates: self.line(arcs)?,
            },
            TopoObject::MultiLineString { arcs } => GeoJsonGeometry::MultiLineString {
                coordinates: arcs.iter().map(|a| self.line(a)).collect::<Result<_>>()?,
            },
            TopoObject::Polygon { arcs } => GeoJsonGeometry::Polygon {
                coordinates: self.polygon(arcs)?,
            },
            TopoObject::MultiPolygon { arcs } => GeoJsonGeometry::MultiPolygon {
                coordinates: arcs.iter().map(|p| self.polygon(p)).collect::<Result<_>>()?,
            },
            TopoObject::GeometryCollection { geometries } => GeoJsonGeometry::GeometryCollection {
                geometries: geometries
                    .iter()
                    .filter(|g| !matches!(g, TopoObject::Empty))
                    .map(|g| self.feature(g))
                    .collect::<Result<_>>()?,
            },
            TopoObject::Empty => GeoJsonGeometry::GeometryCollection {
                geometries: Vec::new(),
            },
        })
    }

    /// Looks up a named object and converts it
    pub fn feature_named(&self, name: &str) -> Result<GeoJsonGeometry> {
        let object = self
            .object(name)
            .ok_or_else(|| MapError::Geometry(format!("Topology has no object '{}'", name)))?;
        self.feature(object)
    }

    /// Extracts the arcs of `object` as a MultiLineString.
    ///
    /// Every arc appears once. With a filter, an arc is kept only when
    /// `filter(first, last)` holds, where `first` and `last` index the leaf
    /// geometries (nested collections flattened) that reference the arc first and
    /// last. An arc used by a single geometry passes that geometry's index twice.
    /// Arcs are not stitched together.
    pub fn mesh<F>(&self, object: &TopoObject, filter: Option<F>) -> Result<GeoJsonGeometry>
    where
        F: Fn(usize, usize) -> bool,
    {
        let mut leaves = Vec::new();
        object.leaves(&mut leaves);

        let mut geoms_by_arc: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        let mut arc_order = Vec::new();
        for (geometry_index, leaf) in leaves.iter().enumerate() {
            let mut bad_index = None;
            leaf.for_each_arc(&mut |index| {
                let arc = arc_slot(index);
                if arc >= self.arcs.len() {
                    bad_index.get_or_insert(index);
                    return;
                }
                let geoms = geoms_by_arc.entry(arc).or_insert_with(|| {
                    arc_order.push(arc);
                    Vec::new()
                });
                geoms.push(geometry_index);
            });
            if let Some(index) = bad_index {
                return Err(out_of_range(index));
            }
        }

        let lines = arc_order
            .into_iter()
            .filter(|arc| match (&filter, geoms_by_arc.get(arc)) {
                (Some(keep), Some(geoms)) => match (geoms.first(), geoms.last()) {
                    (Some(first), Some(last)) => keep(*first, *last),
                    _ => false,
                },
                (None, _) => true,
                _ => false,
            })
            .map(|arc| self.arcs[arc].clone())
            .filter(|points| points.len() >= 2)
            .collect();

        Ok(GeoJsonGeometry::MultiLineString { coordinates: lines })
    }

    fn point(&self, position: [f64; 2]) -> [f64; 2] {
        match &self.transform {
            Some(transform) => transform.apply(position),
            None => position,
        }
    }

    /// Concatenates arcs, dropping the shared point between consecutive arcs
    fn stitch(&self, arcs: &[i64]) -> Result<Vec<[f64; 2]>> {
        let mut points: Vec<[f64; 2]> = Vec::new();
        for &index in arcs {
            let arc = self.arcs.get(arc_slot(index)).ok_or_else(|| out_of_range(index))?;
            points.pop();
            if index < 0 {
                points.extend(arc.iter().rev());
            } else {
                points.extend(arc.iter());
            }
        }
        Ok(points)
    }

    fn line(&self, arcs: &[i64]) -> Result<Vec<[f64; 2]>> {
        let mut points = self.stitch(arcs)?;
        if points.len() == 1 {
            points.push(points[0]);
        }
        Ok(points)
    }

    fn ring(&self, arcs: &[i64]) -> Result<Vec<[f64; 2]>> {
        let mut points = self.stitch(arcs)?;
        if let Some(&first) = points.first() {
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(points)
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<[f64; 2]>>> {
        rings.iter().map(|ring| self.ring(ring)).collect()
    }
}

/// Negative indices reference the reversed arc `!index`
fn arc_slot(index: i64) -> usize {
    let slot = if index < 0 { !index } else { index };
    slot as usize
}

fn out_of_range(index: i64) -> MapError {
    MapError::Geometry(format!("Arc index {} out of range", index))
}

fn decode_quantized_arc(arc: &[[f64; 2]], transform: &TopoTransform) -> Vec<[f64; 2]> {
    let (mut x, mut y) = (0.0, 0.0);
    arc.iter()
        .map(|delta| {
            x += delta[0];
            y += delta[1];
            transform.apply([x, y])
        })
        .collect()
}
