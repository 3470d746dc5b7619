//! Configuration for the map view
//!
//! Options can be built in code or deserialized from JSON; every field has a
//! default so partial documents are accepted. Interaction delays live in
//! [`crate::core::constants`] and are not part of the configuration.

use crate::core::constants::{
    DEFAULT_VIEWPORT_HEIGHT, MAX_SCALE, MAX_VIEWPORT_WIDTH, MIN_SCALE,
};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Viewport height in pixels; the baseline scale is derived from it
    pub viewport_height: f64,
    /// Cap applied to the client width when sizing the viewport
    pub max_viewport_width: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub dragging: bool,
    pub hold_zoom: bool,
    pub scroll_wheel_zoom: bool,
    pub double_click_zoom: bool,
    pub hover_details: bool,
    pub show_graticule: bool,
    pub show_crosshair: bool,
    /// Location of the TopoJSON landmass/boundary resource
    pub world_url: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            max_viewport_width: MAX_VIEWPORT_WIDTH,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            dragging: true,
            hold_zoom: true,
            scroll_wheel_zoom: true,
            double_click_zoom: true,
            hover_details: true,
            show_graticule: true,
            show_crosshair: true,
            world_url: "/world.json".to_string(),
        }
    }
}

impl MapOptions {
    /// Parses options from a JSON document and validates them
    pub fn from_json(json: &str) -> Result<Self> {
        let options: MapOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            return Err(MapError::InvalidViewport(format!(
                "viewport height must be positive, got {}",
                self.viewport_height
            )));
        }
        if !(self.max_viewport_width.is_finite() && self.max_viewport_width > 0.0) {
            return Err(MapError::InvalidViewport(format!(
                "max viewport width must be positive, got {}",
                self.max_viewport_width
            )));
        }
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(MapError::InvalidViewport(format!(
                "scale bounds [{}, {}] are not ordered",
                self.min_scale, self.max_scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MapOptions::default();
        assert_eq!(options.viewport_height, 480.0);
        assert_eq!(options.max_viewport_width, 960.0);
        assert_eq!(options.min_scale, 40.0);
        assert_eq!(options.max_scale, 2000.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let options =
            MapOptions::from_json(r#"{ "viewport_height": 600, "hold_zoom": false }"#).unwrap();
        assert_eq!(options.viewport_height, 600.0);
        assert!(!options.hold_zoom);
        assert!(options.dragging);
        assert_eq!(options.world_url, "/world.json");
    }

    #[test]
    fn test_rejects_inverted_scale_bounds() {
        let result = MapOptions::from_json(r#"{ "min_scale": 3000 }"#);
        assert!(matches!(result, Err(MapError::InvalidViewport(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            MapOptions::from_json("{ nope"),
            Err(MapError::Serialization(_))
        ));
    }
}
