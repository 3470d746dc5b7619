//! Layer boilerplate

/// Fills in the `LayerTrait` accessors backed by a
/// [`LayerProperties`](crate::layers::base::LayerProperties) field, leaving
/// only `render` to write by hand.
///
/// The crosshair overlay, for one:
/// ```ignore
/// impl LayerTrait for CrosshairLayer {
///     crate::impl_layer_trait!(properties);
///
///     fn render(&mut self, context: &mut RenderContext, projection: &ProjectionState) -> Result<()> {
///         let middle = projection.viewport().center_point();
///         // two short strokes through `middle`
///         Ok(())
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_layer_trait {
    ($properties:ident) => {
        fn id(&self) -> &str {
            &self.$properties.id
        }

        fn name(&self) -> &str {
            &self.$properties.name
        }

        fn layer_type(&self) -> $crate::layers::base::LayerType {
            self.$properties.layer_type
        }

        fn z_index(&self) -> i32 {
            self.$properties.z_index
        }

        fn set_z_index(&mut self, z_index: i32) {
            self.$properties.z_index = z_index;
        }

        fn opacity(&self) -> f32 {
            self.$properties.opacity
        }

        /// Clamped to `0.0..=1.0`
        fn set_opacity(&mut self, opacity: f32) {
            self.$properties.opacity = opacity.clamp(0.0, 1.0);
        }

        fn is_visible(&self) -> bool {
            self.$properties.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.$properties.visible = visible;
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
