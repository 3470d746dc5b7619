use crate::{
    core::{
        constants::CROSSHAIR_ARM,
        geo::Point,
        projection::ProjectionState,
    },
    data::meteorites::{MeteorDataset, Meteorite},
    layers::base::{LayerProperties, LayerTrait, LayerType},
    layers::vector::{Color, LineStyle, PointStyle},
    rendering::context::RenderContext,
    Result,
};

/// Meteorite landing markers, sized by mass
pub struct MeteorLayer {
    properties: LayerProperties,
    dataset: Option<MeteorDataset>,
    style: PointStyle,
}

impl MeteorLayer {
    pub fn new() -> Self {
        Self {
            properties: LayerProperties::new(
                "meteors".to_string(),
                "Meteorites".to_string(),
                LayerType::Marker,
            )
            .with_z_index(3),
            dataset: None,
            style: PointStyle {
                fill_color: Color::new(0xd9, 0x53, 0x4f, 0xb3),
                stroke_color: Color::rgb(0xff, 0xff, 0xff),
                stroke_width: 0.5,
                radius: 0.0,
                opacity: 0.7,
            },
        }
    }

    pub fn set_dataset(&mut self, dataset: MeteorDataset) {
        self.dataset = Some(dataset);
    }

    pub fn dataset(&self) -> Option<&MeteorDataset> {
        self.dataset.as_ref()
    }

    /// Topmost marker under `point`, if any.
    ///
    /// Later records draw above earlier ones, so the search runs back to front.
    pub fn hit_test(&self, point: &Point, projection: &ProjectionState) -> Option<&Meteorite> {
        let dataset = self.dataset.as_ref()?;
        dataset.records().iter().rev().find(|meteorite| {
            meteorite.position.map_or(false, |position| {
                let center = projection.project(&position);
                center.distance_to(point) <= dataset.marker_radius(meteorite)
            })
        })
    }
}

impl Default for MeteorLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTrait for MeteorLayer {
    crate::impl_layer_trait!(properties);

    fn render(&mut self, context: &mut RenderContext, projection: &ProjectionState) -> Result<()> {
        let Some(dataset) = &self.dataset else {
            return Ok(());
        };

        let mut style = self.style.clone();
        for meteorite in dataset.records() {
            if let Some(position) = meteorite.position {
                style.radius = dataset.marker_radius(meteorite);
                context.render_point(&projection.project(&position), &style);
            }
        }
        Ok(())
    }
}

/// Fixed crosshair at the viewport center; ignores the projection
pub struct CrosshairLayer {
    properties: LayerProperties,
    style: LineStyle,
}

impl CrosshairLayer {
    pub fn new() -> Self {
        Self {
            properties: LayerProperties::new(
                "crosshair".to_string(),
                "Crosshair".to_string(),
                LayerType::Overlay,
            )
            .with_z_index(4),
            style: LineStyle {
                color: Color::rgb(0x45, 0xac, 0xa0),
                width: 1.0,
                opacity: 1.0,
            },
        }
    }
}

impl Default for CrosshairLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTrait for CrosshairLayer {
    crate::impl_layer_trait!(properties);

    fn render(&mut self, context: &mut RenderContext, projection: &ProjectionState) -> Result<()> {
        let middle = projection.viewport().center_point();
        context.render_line(
            &[
                Point::new(middle.x - CROSSHAIR_ARM, middle.y),
                Point::new(middle.x + CROSSHAIR_ARM, middle.y),
            ],
            &self.style,
        );
        context.render_line(
            &[
                Point::new(middle.x, middle.y - CROSSHAIR_ARM),
                Point::new(middle.x, middle.y + CROSSHAIR_ARM),
            ],
            &self.style,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::core::projection::ViewportContext;
    use crate::rendering::context::DrawCommand;
    use serde_json::json;

    fn projection() -> ProjectionState {
        ProjectionState::new(ViewportContext::new(960.0, 480.0).unwrap())
    }

    fn record(id: &str, lat: f64, lng: f64, mass: &str) -> Meteorite {
        Meteorite {
            id: Some(id.to_string()),
            name: None,
            year: None,
            mass: Some(json!(mass)),
            recclass: None,
            reclat: None,
            reclong: None,
            position: Some(LatLng::new(lat, lng)),
        }
    }

    #[test]
    fn test_meteor_markers_sized_by_mass() {
        let mut layer = MeteorLayer::new();
        layer.set_dataset(MeteorDataset::new(vec![
            record("small", 0.0, 0.0, "1"),
            record("large", 10.0, 10.0, "1000"),
        ]));

        let mut context = RenderContext::new(960.0, 480.0);
        layer.render(&mut context, &projection()).unwrap();

        let radii: Vec<f64> = context
            .get_drawing_queue()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Point { style, .. } => Some(style.radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii, vec![4.0, 15.0]);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut layer = MeteorLayer::new();
        layer.set_dataset(MeteorDataset::new(vec![
            record("under", 0.0, 0.0, "10"),
            record("over", 0.0, 0.0, "10"),
            record("far", 45.0, 90.0, "10"),
        ]));
        let projection = projection();

        let hit = layer.hit_test(&Point::new(481.0, 240.0), &projection);
        assert_eq!(hit.and_then(|m| m.id.as_deref()), Some("over"));
        assert!(layer.hit_test(&Point::new(10.0, 10.0), &projection).is_none());
    }

    #[test]
    fn test_crosshair_centered() {
        let mut layer = CrosshairLayer::new();
        let mut context = RenderContext::new(960.0, 480.0);
        layer.render(&mut context, &projection()).unwrap();

        let queue = context.get_drawing_queue();
        assert_eq!(queue.len(), 2);
        match &queue[0] {
            DrawCommand::Line { points, style } => {
                assert_eq!(points[0], Point::new(470.0, 240.0));
                assert_eq!(points[1], Point::new(490.0, 240.0));
                assert_eq!(style.color, Color::from_hex("#45aca0").unwrap());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
