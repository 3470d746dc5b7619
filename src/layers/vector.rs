use crate::{
    core::{
        constants::{GRATICULE_PRECISION, GRATICULE_STEP},
        geo::{LatLng, Point},
        projection::ProjectionState,
    },
    data::geojson::GeoJsonGeometry,
    impl_layer_trait,
    layers::base::{LayerProperties, LayerTrait, LayerType},
    rendering::context::RenderContext,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#rrggbb` or `#rgb`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || MapError::ParseError(format!("Invalid color: {}", hex));
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match digits.len() {
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

/// Style for point features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f64,
    /// Point radius in pixels
    pub radius: f64,
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            fill_color: Color::rgb(255, 0, 0),
            stroke_color: Color::rgb(255, 255, 255),
            stroke_width: 1.0,
            radius: 4.5,
            opacity: 1.0,
        }
    }
}

/// Style for line features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(0, 0, 255),
            width: 1.0,
            opacity: 1.0,
        }
    }
}

/// Style for polygon features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonStyle {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f64,
    /// Fill opacity (0.0 to 1.0)
    pub fill_opacity: f32,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            fill_color: Color::rgb(0, 200, 0),
            stroke_color: Color::TRANSPARENT,
            stroke_width: 0.0,
            fill_opacity: 1.0,
        }
    }
}

fn project_path(projection: &ProjectionState, coordinates: &[[f64; 2]]) -> Vec<Point> {
    coordinates
        .iter()
        .map(|c| projection.project(&LatLng::from_position(*c)))
        .collect()
}

/// Draws a decoded geometry: polygons filled, lines stroked.
///
/// Empty until geometry is attached, which is how the landmass and boundary
/// layers behave while their resource is still loading (or failed to load).
pub struct PathLayer {
    properties: LayerProperties,
    geometry: Option<GeoJsonGeometry>,
    line_style: LineStyle,
    polygon_style: PolygonStyle,
}

impl PathLayer {
    pub fn new(id: String, name: String) -> Self {
        Self {
            properties: LayerProperties::new(id, name, LayerType::Vector),
            geometry: None,
            line_style: LineStyle::default(),
            polygon_style: PolygonStyle::default(),
        }
    }

    /// Land fill
    pub fn land() -> Self {
        let mut layer = Self::new("land".into(), "Land".into());
        layer.polygon_style = PolygonStyle {
            fill_color: Color::rgb(0xd7, 0xd3, 0xc8),
            ..Default::default()
        };
        layer.properties.z_index = 0;
        layer
    }

    /// Country boundaries
    pub fn boundaries() -> Self {
        let mut layer = Self::new("boundary".into(), "Country boundaries".into());
        layer.line_style = LineStyle {
            color: Color::rgb(0xff, 0xff, 0xff),
            width: 0.5,
            opacity: 1.0,
        };
        layer.properties.z_index = 1;
        layer
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.properties.z_index = z_index;
        self
    }

    pub fn set_geometry(&mut self, geometry: GeoJsonGeometry) {
        self.geometry = Some(geometry);
    }

    pub fn geometry(&self) -> Option<&GeoJsonGeometry> {
        self.geometry.as_ref()
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }
}

impl LayerTrait for PathLayer {
    impl_layer_trait!(properties);

    fn render(&mut self, context: &mut RenderContext, projection: &ProjectionState) -> Result<()> {
        let Some(geometry) = &self.geometry else {
            return Ok(());
        };

        for polygon in geometry.polygons() {
            let mut rings = polygon.iter().map(|ring| project_path(projection, ring));
            if let Some(exterior) = rings.next() {
                let holes: Vec<Vec<Point>> = rings.collect();
                context.render_polygon(&exterior, &holes, &self.polygon_style);
            }
        }
        for line in geometry.lines() {
            context.render_line(&project_path(projection, line), &self.line_style);
        }
        Ok(())
    }
}

/// Meridians and parallels every 10°.
///
/// Minor lines stop at ±80° latitude; the lines on multiples of 90° span the
/// full globe. Lines are sampled every 2.5° so they bend with any projection.
pub struct GraticuleLayer {
    properties: LayerProperties,
    lines: Vec<Vec<LatLng>>,
    style: LineStyle,
}

impl GraticuleLayer {
    pub fn new() -> Self {
        Self {
            properties: LayerProperties::new(
                "graticule".into(),
                "Graticule".into(),
                LayerType::Vector,
            )
            .with_z_index(2),
            lines: graticule_lines(GRATICULE_STEP, GRATICULE_PRECISION),
            style: LineStyle {
                color: Color::new(0x77, 0x77, 0x77, 0x80),
                width: 0.5,
                opacity: 0.5,
            },
        }
    }

    pub fn lines(&self) -> &[Vec<LatLng>] {
        &self.lines
    }
}

impl Default for GraticuleLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTrait for GraticuleLayer {
    impl_layer_trait!(properties);

    fn render(&mut self, context: &mut RenderContext, projection: &ProjectionState) -> Result<()> {
        for line in &self.lines {
            let points: Vec<Point> = line.iter().map(|p| projection.project(p)).collect();
            context.render_line(&points, &self.style);
        }
        Ok(())
    }
}

fn sample(from: f64, to: f64, precision: f64) -> Vec<f64> {
    let count = ((to - from) / precision).round() as usize;
    (0..=count).map(|i| from + precision * i as f64).collect()
}

fn graticule_lines(step: f64, precision: f64) -> Vec<Vec<LatLng>> {
    let is_major = |v: f64| (v % 90.0).abs() < f64::EPSILON;
    let steps = |from: f64, to: f64| {
        let count = ((to - from) / step).round() as usize;
        (0..=count).map(move |i| from + step * i as f64)
    };

    let mut lines = Vec::new();

    // Meridians; 180 coincides with -180.
    for lng in steps(-180.0, 170.0) {
        let extent = if is_major(lng) { 90.0 } else { 80.0 };
        lines.push(
            sample(-extent, extent, precision)
                .into_iter()
                .map(|lat| LatLng::new(lat, lng))
                .collect(),
        );
    }

    // Parallels; the poles are single points and carry no line.
    for lat in steps(-80.0, 80.0) {
        lines.push(
            sample(-180.0, 180.0, precision)
                .into_iter()
                .map(|lng| LatLng::new(lat, lng))
                .collect(),
        );
    }

    lines
}
