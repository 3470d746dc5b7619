use crate::{core::projection::ProjectionState, rendering::context::RenderContext, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Vector,
    Marker,
    Overlay,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Vector => write!(f, "vector"),
            LayerType::Marker => write!(f, "marker"),
            LayerType::Overlay => write!(f, "overlay"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType) -> Self {
        Self {
            id,
            name,
            layer_type,
            z_index: 0,
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

/// A drawable layer of the map.
///
/// Layers read the projection for the frame being drawn and push draw commands
/// into the shared [`RenderContext`]; they never mutate projection state.
pub trait LayerTrait: Send {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn layer_type(&self) -> LayerType;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Get layer opacity (0.0 to 1.0)
    fn opacity(&self) -> f32;

    fn set_opacity(&mut self, opacity: f32);

    /// Get layer z-index for ordering
    fn z_index(&self) -> i32;

    fn set_z_index(&mut self, z_index: i32);

    /// Render the layer for one frame
    fn render(&mut self, context: &mut RenderContext, projection: &ProjectionState) -> Result<()>;

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_properties() {
        let props = LayerProperties::new(
            "land".to_string(),
            "Land".to_string(),
            LayerType::Vector,
        )
        .with_z_index(3);

        assert_eq!(props.id, "land");
        assert_eq!(props.name, "Land");
        assert_eq!(props.layer_type, LayerType::Vector);
        assert_eq!(props.z_index, 3);
        assert_eq!(props.opacity, 1.0);
        assert!(props.visible);
    }

    #[test]
    fn test_layer_type_display() {
        assert_eq!(LayerType::Vector.to_string(), "vector");
        assert_eq!(LayerType::Marker.to_string(), "marker");
        assert_eq!(LayerType::Overlay.to_string(), "overlay");
    }
}
