use anyhow::Context;
use meteormap::{
    background::geometry::{GeometrySource, HttpGeometrySource, StaticGeometrySource},
    core::map::MapView,
    prelude::*,
    rendering::context::{DrawCommand, FrameSink, RenderContext},
    runtime::FrameClock,
};

/// Viewer session
///
/// Usage: `meteormap-app [meteorites.geojson] [world.topojson | http://.../world.json]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let meteorites_path = args.next();
    let world = args.next();

    let options = MapOptions::default();
    let mut map = MapView::new(options.clone(), 1200.0)?;

    if let Some(path) = meteorites_path {
        let body = std::fs::read_to_string(&path)
            .with_context(|| format!("reading meteorite data from {}", path))?;
        let dataset = MeteorDataset::from_geojson_str(&body)
            .with_context(|| format!("parsing meteorite data from {}", path))?;
        log::info!("loaded {} meteorites", dataset.len());
        map.set_meteorites(dataset);
    }

    let source: Arc<dyn GeometrySource> = match world {
        Some(location) if location.starts_with("http://") || location.starts_with("https://") => {
            Arc::new(HttpGeometrySource::new(location))
        }
        Some(path) => Arc::new(StaticGeometrySource::new(
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading world topology from {}", path))?,
        )),
        None => Arc::new(HttpGeometrySource::new(options.world_url.clone())),
    };
    map.spawn_geometry_load(&tokio::runtime::Handle::current(), source);

    let mut sink = StatsSink::default();
    let clock = FrameClock::start();

    for (at, event) in script() {
        while clock.elapsed() < at {
            tick(&mut map, &clock, &mut sink);
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
        log::debug!("{:?}", event);
        map.handle_input(event, clock.elapsed());
    }
    let settle = clock.elapsed() + Duration::from_millis(800);
    while clock.elapsed() < settle {
        tick(&mut map, &clock, &mut sink);
        tokio::time::sleep(Duration::from_millis(16)).await;
    }

    let center = map.current_center();
    println!(
        "frames: {} | scale: {:.2} | center: ({:.3}, {:.3}) | zoom: {:?}",
        sink.frames,
        map.current_scale(),
        center.lat,
        center.lng,
        map.zoom_state()
    );
    println!(
        "last frame: {} points, {} lines, {} polygons",
        sink.points, sink.lines, sink.polygons
    );

    map.teardown();
    Ok(())
}

fn tick(map: &mut MapView, clock: &FrameClock, sink: &mut StatsSink) {
    map.advance(clock.elapsed());
    map.on_frame(sink);
}

/// Drag east, hold to zoom, then double click to reset
fn script() -> Vec<(Duration, InputEvent)> {
    let at = Duration::from_millis;
    let p = Point::new;
    vec![
        (at(200), InputEvent::MouseDown { position: p(480.0, 240.0) }),
        (at(260), InputEvent::MouseMove { position: p(440.0, 250.0) }),
        (at(320), InputEvent::MouseMove { position: p(400.0, 260.0) }),
        (at(380), InputEvent::MouseUp { position: p(400.0, 260.0) }),
        (at(600), InputEvent::MouseDown { position: p(480.0, 240.0) }),
        (at(2200), InputEvent::MouseUp { position: p(480.0, 240.0) }),
        (at(2600), InputEvent::MouseMove { position: p(300.0, 200.0) }),
        (at(3000), InputEvent::DoubleClick { position: p(480.0, 240.0) }),
    ]
}

/// Counts what each frame draws
#[derive(Default)]
struct StatsSink {
    frames: u64,
    points: usize,
    lines: usize,
    polygons: usize,
}

impl FrameSink for StatsSink {
    fn present(&mut self, frame: &RenderContext) {
        self.frames += 1;
        self.points = 0;
        self.lines = 0;
        self.polygons = 0;
        for command in frame.get_drawing_queue() {
            match command {
                DrawCommand::Point { .. } => self.points += 1,
                DrawCommand::Line { .. } => self.lines += 1,
                DrawCommand::Polygon { .. } => self.polygons += 1,
            }
        }
        log::trace!(
            "frame {}: {} points, {} lines, {} polygons",
            self.frames,
            self.points,
            self.lines,
            self.polygons
        );
    }
}
