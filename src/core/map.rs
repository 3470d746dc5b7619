use crate::{
    background::geometry::{PendingGeometry, WorldGeometry},
    core::{
        config::MapOptions,
        geo::{LatLng, Point},
        projection::{ProjectionState, ViewportContext},
    },
    data::meteorites::MeteorDataset,
    input::{
        drag::DragController,
        events::InputEvent,
        handler::{Action, InputRouter},
        zoom::{ZoomController, ZoomFrames, ZoomState, ZoomTimers},
    },
    layers::{
        base::LayerTrait,
        manager::LayerManager,
        marker::{CrosshairLayer, MeteorLayer},
        vector::{GraticuleLayer, PathLayer},
    },
    rendering::context::{FrameSink, RenderContext},
    ui::popup::{DetailPopup, Popup},
    Result,
};
use std::time::Duration;

pub const LAND_LAYER: &str = "land";
pub const BOUNDARY_LAYER: &str = "boundary";
pub const GRATICULE_LAYER: &str = "graticule";
pub const METEOR_LAYER: &str = "meteors";
pub const CROSSHAIR_LAYER: &str = "crosshair";

/// The interactive world map.
///
/// Owns the projection and every interaction component. The host feeds it input
/// events, advances its clock, and calls [`MapView::on_frame`] on each display
/// frame while [`MapView::wants_frame`] holds. All projection changes happen
/// inside frames, so a draw pass always sees a settled projection.
pub struct MapView {
    options: MapOptions,
    projection: ProjectionState,
    frames: ZoomFrames,
    timers: ZoomTimers,
    zoom: ZoomController,
    drag: DragController,
    router: InputRouter,
    layers: LayerManager,
    context: RenderContext,
    popup: Box<dyn Popup>,
    pending_geometry: Option<PendingGeometry>,
}

impl MapView {
    /// Creates a map for a host whose client area is `client_width` pixels wide
    pub fn new(options: MapOptions, client_width: f64) -> Result<Self> {
        options.validate()?;
        let viewport = ViewportContext::from_client(
            client_width,
            options.viewport_height,
            options.max_viewport_width,
        )?;
        let projection =
            ProjectionState::with_scale_bounds(viewport, options.min_scale, options.max_scale);

        let mut layers = LayerManager::new();
        layers.add_layer(Box::new(PathLayer::land()));
        layers.add_layer(Box::new(PathLayer::boundaries()));
        if options.show_graticule {
            layers.add_layer(Box::new(GraticuleLayer::new()));
        }
        layers.add_layer(Box::new(MeteorLayer::new()));
        if options.show_crosshair {
            layers.add_layer(Box::new(CrosshairLayer::new()));
        }

        let mut frames = ZoomFrames::new();
        frames.request();

        log::debug!(
            "map created: {}x{} viewport, baseline scale {:.2}",
            viewport.width,
            viewport.height,
            viewport.baseline_scale()
        );

        Ok(Self {
            router: InputRouter::new(&options),
            options,
            projection,
            frames,
            timers: ZoomTimers::new(),
            zoom: ZoomController::new(),
            drag: DragController::new(),
            layers,
            context: RenderContext::new(viewport.width, viewport.height),
            popup: Box::new(DetailPopup::new()),
            pending_geometry: None,
        })
    }

    /// Replaces the hover detail overlay
    pub fn with_popup(mut self, popup: Box<dyn Popup>) -> Self {
        self.popup = popup;
        self
    }

    /// Routes one device event observed at `now`
    ///
    /// The clock catches up to `now` before routing, so hold timers armed by
    /// the event count from the moment it happened.
    pub fn handle_input(&mut self, event: InputEvent, now: Duration) {
        self.run_due(now);
        let actions = self.router.handle_event(event, self.drag.is_armed());
        for action in actions {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::ZoomStart => self.zoom.start(&mut self.timers),
            Action::ZoomEnd => self.zoom.end(),
            Action::DragStart(point) => self.drag.start(point),
            Action::DragMove(point) => {
                self.drag.move_to(point, &mut self.frames);
            }
            Action::Drop(release) => {
                self.drag.drop(release, &mut self.frames);
            }
            Action::DismissOverlay => self.popup.dismiss(),
            Action::Hover(point) => self.hover(point),
            Action::Wheel(delta_y) => self.zoom.wheel(delta_y, &mut self.frames),
            Action::DoubleActivate => {
                self.zoom.double_activate(&self.projection, &mut self.frames)
            }
            Action::Resize(viewport) => {
                log::debug!("resize to {}x{}", viewport.width, viewport.height);
                self.frames.queue_with(move |p| p.set_viewport(viewport));
            }
        }
    }

    fn hover(&mut self, point: Point) {
        let hit = self
            .layers
            .get_layer_as::<MeteorLayer>(METEOR_LAYER)
            .and_then(|layer| layer.hit_test(&point, &self.projection));

        match hit {
            Some(meteorite) => {
                self.popup
                    .show(meteorite, point, self.projection.viewport().width)
            }
            None => self.popup.dismiss(),
        }
    }

    /// Moves the clock to `now`, running every deferred task that came due,
    /// then installs background geometry that finished loading.
    pub fn advance(&mut self, now: Duration) {
        self.run_due(now);
        self.poll_geometry();
    }

    fn run_due(&mut self, now: Duration) {
        while let Some(task) = self.timers.pop_due(now) {
            self.zoom.run_task(task, &mut self.timers, &mut self.frames);
        }
    }

    /// Current engine time
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Deadline of the next deferred task, for hosts that sleep between frames
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Whether a redraw is pending
    pub fn wants_frame(&self) -> bool {
        self.frames.is_pending()
    }

    /// Display-frame callback.
    ///
    /// Applies queued projection changes, draws every layer into the frame and
    /// presents it to `sink`, then runs the frame's continuation. Returns
    /// whether a frame was drawn.
    pub fn on_frame(&mut self, sink: &mut dyn FrameSink) -> bool {
        let Self {
            frames,
            projection,
            layers,
            context,
            ..
        } = self;

        let report = frames.fire(projection, |projection| {
            let viewport = projection.viewport();
            context.begin_frame(viewport.width, viewport.height);
            layers.render(context, projection);
            sink.present(context);
        });

        match report {
            Some(report) => {
                self.zoom.frame_drawn();
                if let Some(follow_up) = report.follow_up {
                    self.zoom.on_follow_up(follow_up, &mut self.timers);
                }
                true
            }
            None => false,
        }
    }

    /// Installs the meteorite dataset and redraws
    pub fn set_meteorites(&mut self, dataset: MeteorDataset) {
        log::debug!("installing {} meteorite records", dataset.len());
        self.layers.with_layer_mut(METEOR_LAYER, |layer| {
            if let Some(meteors) = layer.as_any_mut().downcast_mut::<MeteorLayer>() {
                meteors.set_dataset(dataset);
            }
        });
        self.frames.request();
    }

    /// Installs land and boundary geometry and redraws
    pub fn attach_geometry(&mut self, world: WorldGeometry) {
        let WorldGeometry { land, boundaries } = world;
        for (id, geometry) in [(LAND_LAYER, land), (BOUNDARY_LAYER, boundaries)] {
            self.layers.with_layer_mut(id, |layer| {
                if let Some(path) = layer.as_any_mut().downcast_mut::<PathLayer>() {
                    path.set_geometry(geometry);
                }
            });
        }
        self.frames.request();
    }

    /// Tracks a background geometry load; the result is installed by [`MapView::advance`]
    pub fn load_geometry(&mut self, pending: PendingGeometry) {
        self.pending_geometry = Some(pending);
    }

    /// Starts fetching the world geometry from `source` on the given runtime
    #[cfg(feature = "tokio-runtime")]
    pub fn spawn_geometry_load(
        &mut self,
        handle: &tokio::runtime::Handle,
        source: std::sync::Arc<dyn crate::background::geometry::GeometrySource>,
    ) {
        let pending = crate::background::geometry::spawn_geometry_load(handle, source);
        self.load_geometry(pending);
    }

    /// Whether a background geometry load is still outstanding
    pub fn is_loading_geometry(&self) -> bool {
        self.pending_geometry.is_some()
    }

    fn poll_geometry(&mut self) {
        let Some(result) = self.pending_geometry.as_ref().and_then(PendingGeometry::try_take)
        else {
            return;
        };
        self.pending_geometry = None;

        match result {
            Ok(world) => {
                log::debug!("world geometry loaded");
                self.attach_geometry(world);
            }
            Err(e) => log::debug!("drawing without world geometry: {}", e),
        }
    }

    /// Cancels the pending frame and deferred work and stops accepting input
    pub fn teardown(&mut self) {
        self.frames.stop();
        self.zoom.abort();
        self.drag = DragController::new();
        self.router.set_enabled(false);
        self.pending_geometry = None;
        self.popup.dismiss();
    }

    pub fn current_scale(&self) -> f64 {
        self.projection.scale()
    }

    pub fn current_center(&self) -> LatLng {
        self.projection.center()
    }

    pub fn current_translate(&self) -> Point {
        self.projection.translate()
    }

    /// Screen position of a coordinate under the current projection
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        self.projection.project(lat_lng)
    }

    pub fn invert(&self, point: &Point) -> LatLng {
        self.projection.invert(point)
    }

    pub fn projection(&self) -> &ProjectionState {
        &self.projection
    }

    pub fn viewport(&self) -> ViewportContext {
        self.projection.viewport()
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom.state()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames.frames_drawn()
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    /// Turns press-and-drag panning on or off
    pub fn set_dragging(&mut self, enabled: bool) {
        self.router.set_dragging(enabled);
    }

    /// Turns hold-to-zoom on or off
    pub fn set_hold_zoom(&mut self, enabled: bool) {
        self.router.set_hold_zoom(enabled);
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerManager {
        &mut self.layers
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) {
        self.layers.add_layer(layer);
        self.frames.request();
    }

    pub fn popup(&self) -> &dyn Popup {
        self.popup.as_ref()
    }

    pub fn popup_mut(&mut self) -> &mut dyn Popup {
        self.popup.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::geometry::PendingGeometry;
    use crate::data::geojson::GeoJsonGeometry;
    use crate::rendering::context::RecordingSink;
    use crate::MapError;

    fn map() -> MapView {
        MapView::new(MapOptions::default(), 1200.0).unwrap()
    }

    fn send(map: &mut MapView, event: InputEvent) {
        let now = map.now();
        map.handle_input(event, now);
    }

    fn drain(map: &mut MapView, sink: &mut RecordingSink) {
        while map.on_frame(sink) {}
    }

    #[test]
    fn test_initial_frame_and_layers() {
        let mut map = map();
        assert_eq!(map.viewport().width, 960.0);
        assert!(map.wants_frame());
        assert_eq!(
            map.layers().render_order(),
            &[LAND_LAYER, BOUNDARY_LAYER, GRATICULE_LAYER, METEOR_LAYER, CROSSHAIR_LAYER]
        );

        let mut sink = RecordingSink::new();
        assert!(map.on_frame(&mut sink));
        assert!(!map.on_frame(&mut sink));
        assert_eq!(sink.frames_presented, 1);
        // graticule lines + two crosshair strokes; land and boundaries still empty
        assert_eq!(sink.count_lines(), 55);
    }

    #[test]
    fn test_layer_toggles() {
        let options = MapOptions {
            show_graticule: false,
            show_crosshair: false,
            ..Default::default()
        };
        let map = MapView::new(options, 800.0).unwrap();
        assert_eq!(map.layers().len(), 3);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = MapOptions {
            viewport_height: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            MapView::new(options, 800.0),
            Err(MapError::InvalidViewport(_))
        ));
    }

    #[test]
    fn test_double_click_zooms_then_resets() {
        let mut map = map();
        let mut sink = RecordingSink::new();
        drain(&mut map, &mut sink);
        let baseline = map.current_scale();

        send(&mut map, InputEvent::DoubleClick {
            position: Point::new(10.0, 10.0),
        });
        drain(&mut map, &mut sink);
        assert_eq!(map.current_scale(), baseline + 1000.0);
        assert_eq!(map.zoom_state(), ZoomState::Idle);

        send(&mut map, InputEvent::DoubleClick {
            position: Point::new(10.0, 10.0),
        });
        drain(&mut map, &mut sink);
        assert_eq!(map.current_scale(), baseline);
        assert_eq!(map.zoom_state(), ZoomState::ResettingOut);

        map.advance(Duration::from_millis(500));
        drain(&mut map, &mut sink);
        assert_eq!(map.zoom_state(), ZoomState::Idle);
        assert_eq!(map.current_center(), LatLng::origin());
    }

    #[test]
    fn test_hover_shows_and_dismisses_details() {
        let mut map = map();
        map.set_meteorites(
            MeteorDataset::from_geojson_str(
                r#"{"type":"FeatureCollection","features":[
                    {"type":"Feature","properties":{"id":"1","name":"Aachen","mass":"21"},
                     "geometry":{"type":"Point","coordinates":[0,0]}}
                ]}"#,
            )
            .unwrap(),
        );

        send(&mut map, InputEvent::MouseMove {
            position: Point::new(481.0, 240.0),
        });
        assert!(map.popup().is_open());

        send(&mut map, InputEvent::MouseMove {
            position: Point::new(100.0, 100.0),
        });
        assert!(!map.popup().is_open());
    }

    #[test]
    fn test_drag_dismisses_details() {
        let mut map = map();
        map.set_meteorites(
            MeteorDataset::from_geojson_str(
                r#"{"type":"FeatureCollection","features":[
                    {"type":"Feature","properties":{"mass":"21"},
                     "geometry":{"type":"Point","coordinates":[0,0]}}
                ]}"#,
            )
            .unwrap(),
        );
        send(&mut map, InputEvent::MouseMove {
            position: Point::new(480.0, 240.0),
        });
        assert!(map.popup().is_open());

        send(&mut map, InputEvent::MouseDown {
            position: Point::new(480.0, 240.0),
        });
        send(&mut map, InputEvent::MouseMove {
            position: Point::new(490.0, 240.0),
        });
        assert!(!map.popup().is_open());
        assert!(map.is_dragging());
    }

    #[test]
    fn test_resize_moves_canonical_translate() {
        let mut map = map();
        let mut sink = RecordingSink::new();
        send(&mut map, InputEvent::Resize {
            width: 600.0,
            height: 900.0,
        });
        drain(&mut map, &mut sink);

        assert_eq!(map.viewport(), ViewportContext::new(600.0, 480.0).unwrap());
        assert_eq!(map.current_translate(), Point::new(300.0, 240.0));
        assert_eq!(map.project(&LatLng::origin()), Point::new(300.0, 240.0));
        assert_eq!(sink.frames_presented, 1);
    }

    #[test]
    fn test_geometry_installed_on_advance() {
        let mut map = map();
        let mut sink = RecordingSink::new();
        drain(&mut map, &mut sink);

        let (tx, pending) = PendingGeometry::channel();
        map.load_geometry(pending);
        map.advance(Duration::from_millis(10));
        assert!(map.is_loading_geometry());
        assert!(!map.wants_frame());

        tx.send(Ok(WorldGeometry {
            land: GeoJsonGeometry::Polygon {
                coordinates: vec![vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 0.0]]],
            },
            boundaries: GeoJsonGeometry::MultiLineString {
                coordinates: vec![vec![[0.0, 0.0], [5.0, 5.0]]],
            },
        }))
        .unwrap();
        map.advance(Duration::from_millis(20));
        assert!(!map.is_loading_geometry());
        assert!(map.wants_frame());

        drain(&mut map, &mut sink);
        assert_eq!(sink.count_polygons(), 1);
        assert_eq!(sink.count_lines(), 56);
    }

    #[test]
    fn test_failed_geometry_leaves_layers_empty() {
        let mut map = map();
        let mut sink = RecordingSink::new();
        drain(&mut map, &mut sink);

        let (tx, pending) = PendingGeometry::channel();
        map.load_geometry(pending);
        tx.send(Err(MapError::Geometry("unreachable".into()))).unwrap();
        map.advance(Duration::from_millis(1));

        assert!(!map.is_loading_geometry());
        assert!(!map.wants_frame());
        let land = map.layers().get_layer_as::<PathLayer>(LAND_LAYER).unwrap();
        assert!(!land.has_geometry());
    }

    #[test]
    fn test_teardown_is_quiet() {
        let mut map = map();
        send(&mut map, InputEvent::MouseDown {
            position: Point::new(10.0, 10.0),
        });
        map.teardown();
        map.teardown();

        map.advance(Duration::from_secs(5));
        assert!(!map.wants_frame());
        assert_eq!(map.zoom_state(), ZoomState::Idle);

        send(&mut map, InputEvent::DoubleClick {
            position: Point::new(10.0, 10.0),
        });
        assert!(!map.wants_frame());
    }
}
