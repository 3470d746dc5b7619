use crate::core::constants::{
    HORIZONTAL_GRADE_DIVISOR, MAX_SCALE, MIN_SCALE, VERTICAL_GRADE_DIVISOR,
};
use crate::core::geo::{LatLng, Point};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Pixel dimensions of the drawing surface
///
/// Recomputed on every resize and handed to the projection explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportContext {
    pub width: f64,
    pub height: f64,
}

impl ViewportContext {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(MapError::InvalidViewport(format!(
                "viewport must have positive finite size, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Sizes the viewport from the host's client width, capped at `max_width`
    pub fn from_client(client_width: f64, height: f64, max_width: f64) -> Result<Self> {
        Self::new(client_width.min(max_width), height)
    }

    /// Scale at which the whole world spans the viewport height
    pub fn baseline_scale(&self) -> f64 {
        self.height / PI
    }

    /// Screen-space center; the canonical projection translate
    pub fn center_point(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Mutable equirectangular projection shared by every controller
///
/// `scale` and `center` determine the visible area; `translate` is either the
/// canonical viewport center or, during a drag, a preview offset from it.
/// Writes happen only inside pre-frame mutations queued on the render scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    scale: f64,
    translate: Point,
    center: LatLng,
    viewport: ViewportContext,
    min_scale: f64,
    max_scale: f64,
}

impl ProjectionState {
    /// Creates a projection at the baseline scale, centered on the origin
    pub fn new(viewport: ViewportContext) -> Self {
        Self::with_scale_bounds(viewport, MIN_SCALE, MAX_SCALE)
    }

    pub fn with_scale_bounds(viewport: ViewportContext, min_scale: f64, max_scale: f64) -> Self {
        Self {
            scale: viewport.baseline_scale().clamp(min_scale, max_scale),
            translate: viewport.center_point(),
            center: LatLng::origin(),
            viewport,
            min_scale,
            max_scale,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sets the scale, clamping to the configured bounds
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_nan() {
            log::warn!("ignoring NaN projection scale");
            return;
        }
        self.scale = scale.clamp(self.min_scale, self.max_scale);
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    pub fn set_translate(&mut self, translate: Point) {
        if !translate.is_finite() {
            log::warn!("ignoring non-finite translate {:?}", translate);
            return;
        }
        self.translate = translate;
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn set_center(&mut self, center: LatLng) {
        if !center.is_finite() {
            log::warn!("ignoring non-finite center {:?}", center);
            return;
        }
        self.center = center;
    }

    pub fn viewport(&self) -> ViewportContext {
        self.viewport
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    pub fn baseline_scale(&self) -> f64 {
        self.viewport.baseline_scale().clamp(self.min_scale, self.max_scale)
    }

    pub fn canonical_translate(&self) -> Point {
        self.viewport.center_point()
    }

    pub fn is_at_baseline(&self) -> bool {
        self.scale == self.baseline_scale()
    }

    pub fn restore_baseline(&mut self) {
        self.scale = self.baseline_scale();
    }

    /// Puts the origin back at the viewport center
    pub fn recenter(&mut self) {
        self.center = LatLng::origin();
        self.translate = self.canonical_translate();
    }

    /// Replaces the viewport after a resize
    ///
    /// The translate moves with the canonical origin, keeping any drag preview
    /// offset on top of it. A scale sitting at the old baseline follows the
    /// baseline; any other scale is kept.
    pub fn set_viewport(&mut self, viewport: ViewportContext) {
        let was_at_baseline = self.is_at_baseline();
        let preview = self.translate.subtract(&self.canonical_translate());
        self.viewport = viewport;
        self.translate = viewport.center_point().add(&preview);
        if was_at_baseline {
            self.scale = self.baseline_scale();
        }
    }

    /// Pixels per degree at the current scale, horizontally and vertically
    pub fn grade(&self) -> (f64, f64) {
        let span = self.scale * PI;
        (
            span / HORIZONTAL_GRADE_DIVISOR,
            span / VERTICAL_GRADE_DIVISOR,
        )
    }

    /// Projects a geographic coordinate to screen space
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        Point::new(
            self.translate.x + self.scale * (lat_lng.lng - self.center.lng).to_radians(),
            self.translate.y - self.scale * (lat_lng.lat - self.center.lat).to_radians(),
        )
    }

    /// Maps a screen point back to geographic coordinates
    pub fn invert(&self, point: &Point) -> LatLng {
        LatLng::new(
            self.center.lat - ((point.y - self.translate.y) / self.scale).to_degrees(),
            self.center.lng + ((point.x - self.translate.x) / self.scale).to_degrees(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ViewportContext {
        ViewportContext::new(960.0, 480.0).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let projection = ProjectionState::new(viewport());
        assert!((projection.scale() - 480.0 / PI).abs() < 1e-9);
        assert_eq!(projection.translate(), Point::new(480.0, 240.0));
        assert_eq!(projection.center(), LatLng::origin());
        assert!(projection.is_at_baseline());
    }

    #[test]
    fn test_viewport_validation() {
        assert!(ViewportContext::new(0.0, 480.0).is_err());
        assert!(ViewportContext::new(f64::NAN, 480.0).is_err());
        let capped = ViewportContext::from_client(1400.0, 480.0, 960.0).unwrap();
        assert_eq!(capped.width, 960.0);
    }

    #[test]
    fn test_scale_clamping() {
        let mut projection = ProjectionState::new(viewport());
        projection.set_scale(10.0);
        assert_eq!(projection.scale(), MIN_SCALE);
        projection.set_scale(5000.0);
        assert_eq!(projection.scale(), MAX_SCALE);
        projection.set_scale(f64::NAN);
        assert_eq!(projection.scale(), MAX_SCALE);
    }

    #[test]
    fn test_non_finite_writes_ignored() {
        let mut projection = ProjectionState::new(viewport());
        projection.set_translate(Point::new(f64::INFINITY, 0.0));
        projection.set_center(LatLng::new(f64::NAN, 0.0));
        assert_eq!(projection.translate(), Point::new(480.0, 240.0));
        assert_eq!(projection.center(), LatLng::origin());
    }

    #[test]
    fn test_project_and_invert() {
        let mut projection = ProjectionState::new(viewport());
        // At the baseline the world is 960 px wide: 180° of longitude is 480 px.
        let east = projection.project(&LatLng::new(0.0, 180.0));
        assert!((east.x - 960.0).abs() < 1e-9);
        let north = projection.project(&LatLng::new(90.0, 0.0));
        assert!(north.y.abs() < 1e-9);

        projection.set_center(LatLng::new(10.0, -20.0));
        let target = LatLng::new(35.0, 40.0);
        let back = projection.invert(&projection.project(&target));
        assert!((back.lat - target.lat).abs() < 1e-9);
        assert!((back.lng - target.lng).abs() < 1e-9);
    }

    #[test]
    fn test_grade_at_baseline() {
        let projection = ProjectionState::new(viewport());
        let (gx, gy) = projection.grade();
        assert!((gx - 480.0 / 180.0).abs() < 1e-9);
        assert!((gy - 480.0 / 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_follows_baseline() {
        let mut projection = ProjectionState::new(viewport());
        projection.set_viewport(ViewportContext::new(800.0, 600.0).unwrap());

        assert_eq!(projection.translate(), Point::new(400.0, 300.0));
        assert!((projection.scale() - 600.0 / PI).abs() < 1e-9);
    }

    #[test]
    fn test_resize_keeps_preview_offset() {
        let mut projection = ProjectionState::new(viewport());
        projection.set_translate(Point::new(500.0, 260.0));
        projection.set_viewport(ViewportContext::new(800.0, 600.0).unwrap());
        assert_eq!(projection.translate(), Point::new(420.0, 320.0));

        projection.recenter();
        assert_eq!(projection.translate(), Point::new(400.0, 300.0));
    }

    #[test]
    fn test_resize_keeps_zoomed_scale() {
        let mut projection = ProjectionState::new(viewport());
        projection.set_scale(900.0);
        projection.set_viewport(ViewportContext::new(800.0, 600.0).unwrap());
        assert_eq!(projection.scale(), 900.0);
    }
}
