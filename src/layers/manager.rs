use crate::{core::projection::ProjectionState, layers::base::LayerTrait, Result};

use crate::rendering::context::RenderContext;

use crate::prelude::HashMap;

/// Manages layers for the map, handling ordering and rendering
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for rendering (sorted by z-index)
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer, replacing any layer with the same ID.
    /// Layers with equal z-index draw in insertion order.
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) {
        let layer_id = layer.id().to_string();
        let z_index = layer.z_index();

        if self.layers.contains_key(&layer_id) {
            log::debug!("replacing layer '{}'", layer_id);
            self.render_order.retain(|id| id != &layer_id);
        }
        self.layers.insert(layer_id.clone(), layer);

        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Downcasts a layer to its concrete type
    pub fn get_layer_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.layers
            .get(layer_id)
            .and_then(|l| l.as_any().downcast_ref::<T>())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Layer IDs in render order
    pub fn render_order(&self) -> &[String] {
        &self.render_order
    }

    /// Renders every visible layer, bottom to top.
    ///
    /// A failing layer is logged and skipped so the rest of the frame still draws.
    pub fn render(&mut self, context: &mut RenderContext, projection: &ProjectionState) {
        for layer_id in &self.render_order {
            if let Some(layer) = self.layers.get_mut(layer_id) {
                if !layer.is_visible() {
                    continue;
                }
                if let Err(e) = layer.render(context, projection) {
                    log::warn!("layer '{}' failed to render: {}", layer_id, e);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
