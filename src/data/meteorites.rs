//! Meteorite landing records and mass-based marker sizing.

use crate::core::constants::{DEFAULT_MARKER_RADIUS, MARKER_RADIUS_OFFSET, MARKER_SIZES};
use crate::core::geo::LatLng;
use crate::data::geojson::{GeoJson, GeoJsonFeature};
use crate::Result;
use serde_json::Value;

/// One landing record of the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Meteorite {
    pub id: Option<String>,
    pub name: Option<String>,
    /// ISO timestamp as published, e.g. `1880-01-01T00:00:00.000`
    pub year: Option<String>,
    /// Raw `mass` property; kept as-is so truthiness matches the published data
    pub mass: Option<Value>,
    pub recclass: Option<String>,
    pub reclat: Option<String>,
    pub reclong: Option<String>,
    pub position: Option<LatLng>,
}

impl Meteorite {
    pub fn from_feature(feature: &GeoJsonFeature) -> Self {
        Self {
            id: feature.property_text("id"),
            name: feature.property_text("name"),
            year: feature.property_text("year"),
            mass: feature.property("mass").cloned(),
            recclass: feature.property_text("recclass"),
            reclat: feature.property_text("reclat"),
            reclong: feature.property_text("reclong"),
            position: feature.point(),
        }
    }

    /// Numeric mass in grams, if the property parses as a number
    pub fn mass_value(&self) -> Option<f64> {
        match self.mass.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Whether the mass property is present and truthy: a non-empty string
    /// (including `"0"`) or a non-zero number.
    pub fn has_mass(&self) -> bool {
        match &self.mass {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().map_or(false, |v| v != 0.0 && !v.is_nan()),
            Some(Value::Bool(b)) => *b,
            _ => false,
        }
    }

    /// Calendar year from the leading digits of the ISO timestamp
    pub fn year(&self) -> Option<i32> {
        let year = self.year.as_deref()?;
        let (sign, digits) = match year.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, year),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        digits[..end].parse::<i32>().ok().map(|y| sign * y)
    }

    /// Detail lines shown by the hover overlay
    pub fn detail_lines(&self) -> Vec<String> {
        fn show(value: &Option<String>) -> String {
            value.clone().unwrap_or_else(|| "undefined".to_string())
        }
        let mass = match &self.mass {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "undefined".to_string(),
            Some(other) => other.to_string(),
        };
        vec![
            format!("id: {}", show(&self.id)),
            format!("name: {}", show(&self.name)),
            format!(
                "year: {}",
                self.year()
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "NaN".to_string())
            ),
            format!("mass: {}", mass),
            format!("class: {}", show(&self.recclass)),
            format!("lat: {}", show(&self.reclat)),
            format!("long: {}", show(&self.reclong)),
        ]
    }
}

/// Mass distribution split into four ranges below and four above the median.
///
/// Edges are `[min, q1, q2, q3, median, m1, m2, m3, max]`. Lookup walks the
/// edges with an inclusive comparison on both ends, so a mass sitting exactly on
/// an inner edge resolves to the lower bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeBuckets {
    edges: Vec<f64>,
}

impl SizeBuckets {
    pub fn new(min: f64, max: f64, median: f64) -> Self {
        let first_half = (median - min) / 4.0;
        let second_half = (max - median) / 4.0;

        let mut edges: Vec<f64> = (0..4).map(|i| min + first_half * i as f64).collect();
        edges.extend((0..=4).map(|i| median + second_half * i as f64));

        Self { edges }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Marker size for a mass, or `None` when no bucket contains it
    pub fn size_for(&self, mass: f64) -> Option<f64> {
        for i in 0..=10 {
            let (Some(lower), Some(upper)) = (self.edges.get(i), self.edges.get(i + 1)) else {
                continue;
            };
            if *lower <= mass && mass <= *upper {
                return MARKER_SIZES.get(i).copied();
            }
        }
        None
    }
}

/// The meteorite dataset with its precomputed size buckets
#[derive(Debug, Clone)]
pub struct MeteorDataset {
    records: Vec<Meteorite>,
    buckets: SizeBuckets,
}

impl MeteorDataset {
    pub fn new(records: Vec<Meteorite>) -> Self {
        let mut masses: Vec<f64> = records
            .iter()
            .filter_map(Meteorite::mass_value)
            .filter(|m| !m.is_nan())
            .collect();
        masses.sort_by(|a, b| a.total_cmp(b));

        let max = masses.last().copied().unwrap_or(0.0);
        let median = median_of_sorted(&masses);
        log::debug!(
            "meteor dataset: {} records, {} with mass, max {}, median {}",
            records.len(),
            masses.len(),
            max,
            median
        );

        Self {
            records,
            buckets: SizeBuckets::new(0.0, max, median),
        }
    }

    pub fn from_geojson(geojson: &GeoJson) -> Self {
        Self::new(
            geojson
                .features()
                .into_iter()
                .map(Meteorite::from_feature)
                .collect(),
        )
    }

    pub fn from_geojson_str(geojson_str: &str) -> Result<Self> {
        Ok(Self::from_geojson(&GeoJson::parse(geojson_str)?))
    }

    pub fn records(&self) -> &[Meteorite] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn buckets(&self) -> &SizeBuckets {
        &self.buckets
    }

    /// Drawn radius of a record's marker
    pub fn marker_radius(&self, meteorite: &Meteorite) -> f64 {
        if meteorite.position.is_none() || !meteorite.has_mass() {
            return DEFAULT_MARKER_RADIUS;
        }
        meteorite
            .mass_value()
            .and_then(|mass| self.buckets.size_for(mass))
            .map(|size| size + MARKER_RADIUS_OFFSET)
            .unwrap_or(DEFAULT_MARKER_RADIUS)
    }
}

fn median_of_sorted(values: &[f64]) -> f64 {
    match values.len() {
        0 => 0.0,
        n if n % 2 == 1 => values[n / 2],
        n => (values[n / 2 - 1] + values[n / 2]) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meteorite(mass: Option<Value>) -> Meteorite {
        Meteorite {
            id: Some("1".into()),
            name: Some("Aachen".into()),
            year: Some("1880-01-01T00:00:00.000".into()),
            mass,
            recclass: Some("L5".into()),
            reclat: Some("50.775000".into()),
            reclong: Some("6.083330".into()),
            position: Some(LatLng::new(50.775, 6.08333)),
        }
    }

    #[test]
    fn test_bucket_edges() {
        let buckets = SizeBuckets::new(0.0, 800.0, 400.0);
        assert_eq!(
            buckets.edges(),
            &[0.0, 100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0]
        );
    }

    #[test]
    fn test_size_lookup() {
        let buckets = SizeBuckets::new(0.0, 800.0, 400.0);
        assert_eq!(buckets.size_for(50.0), Some(2.0));
        assert_eq!(buckets.size_for(350.0), Some(5.0));
        assert_eq!(buckets.size_for(450.0), Some(7.0));
        assert_eq!(buckets.size_for(800.0), Some(13.0));
        assert_eq!(buckets.size_for(900.0), None);
        assert_eq!(buckets.size_for(-1.0), None);
    }

    #[test]
    fn test_boundary_mass_resolves_to_lower_bucket() {
        // Inclusive on both ends: an edge value matches the first bucket that ends there.
        let buckets = SizeBuckets::new(0.0, 800.0, 400.0);
        assert_eq!(buckets.size_for(100.0), Some(2.0));
        assert_eq!(buckets.size_for(400.0), Some(5.0));
    }

    #[test]
    fn test_marker_radius() {
        let dataset = MeteorDataset::new(vec![
            meteorite(Some(json!("100"))),
            meteorite(Some(json!("800"))),
            meteorite(Some(json!(600))),
        ]);
        // median 600, max 800
        assert_eq!(dataset.marker_radius(&dataset.records()[0]), 4.0);
        assert_eq!(dataset.marker_radius(&dataset.records()[1]), 15.0);
    }

    #[test]
    fn test_unsized_markers_use_default_radius() {
        let dataset = MeteorDataset::new(vec![meteorite(Some(json!("10")))]);
        assert_eq!(dataset.marker_radius(&meteorite(None)), DEFAULT_MARKER_RADIUS);
        assert_eq!(dataset.marker_radius(&meteorite(Some(json!(0)))), DEFAULT_MARKER_RADIUS);
        assert_eq!(dataset.marker_radius(&meteorite(Some(json!("")))), DEFAULT_MARKER_RADIUS);
        assert_eq!(
            dataset.marker_radius(&meteorite(Some(json!("heavy")))),
            DEFAULT_MARKER_RADIUS
        );

        let mut no_position = meteorite(Some(json!("10")));
        no_position.position = None;
        assert_eq!(dataset.marker_radius(&no_position), DEFAULT_MARKER_RADIUS);
    }

    #[test]
    fn test_string_zero_mass_is_sized() {
        let dataset = MeteorDataset::new(vec![meteorite(Some(json!("10")))]);
        assert_eq!(dataset.marker_radius(&meteorite(Some(json!("0")))), 4.0);
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median_of_sorted(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median_of_sorted(&[]), 0.0);
    }

    #[test]
    fn test_year_and_details() {
        let m = meteorite(Some(json!("21")));
        assert_eq!(m.year(), Some(1880));
        let lines = m.detail_lines();
        assert_eq!(lines[0], "id: 1");
        assert_eq!(lines[2], "year: 1880");
        assert_eq!(lines[3], "mass: 21");
        assert_eq!(lines[6], "long: 6.083330");
    }

    #[test]
    fn test_dataset_from_geojson_str() {
        let dataset = MeteorDataset::from_geojson_str(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"id":"1","mass":"21"},
                 "geometry":{"type":"Point","coordinates":[6.08,50.77]}},
                {"type":"Feature","properties":{"id":"2"},"geometry":null}
            ]}"#,
        )
        .unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[1].position, None);
    }
}
