//! Asynchronous loading of the landmass/boundary resource.
//!
//! The fetch runs on a tokio runtime; the decoded geometry comes back to the
//! single-threaded engine through a channel that the engine polls when it
//! advances. Nothing is retried: a failure is logged and the map simply draws
//! without land and boundaries.

use crate::data::geojson::GeoJsonGeometry;
use crate::data::topojson::Topology;
use crate::{MapError, Result};
use async_trait::async_trait;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
#[cfg(feature = "tokio-runtime")]
use std::sync::Arc;

/// Name of the landmass object inside the topology
pub const LAND_OBJECT: &str = "land";
/// Name of the countries object inside the topology
pub const COUNTRIES_OBJECT: &str = "countries";

/// Land polygons plus the boundary lines between distinct countries
#[derive(Debug, Clone, PartialEq)]
pub struct WorldGeometry {
    pub land: GeoJsonGeometry,
    pub boundaries: GeoJsonGeometry,
}

impl WorldGeometry {
    pub fn from_topology(topology: &Topology) -> Result<Self> {
        let countries = topology.object(COUNTRIES_OBJECT).ok_or_else(|| {
            MapError::Geometry(format!("Topology has no object '{}'", COUNTRIES_OBJECT))
        })?;
        Ok(Self {
            land: topology.feature_named(LAND_OBJECT)?,
            boundaries: topology.mesh(countries, Some(|a: usize, b: usize| a != b))?,
        })
    }

    pub fn from_topojson(topojson_str: &str) -> Result<Self> {
        Self::from_topology(&Topology::parse(topojson_str)?)
    }
}

/// Where the world topology comes from
#[async_trait]
pub trait GeometrySource: Send + Sync {
    /// Fetches the raw TopoJSON document
    async fn fetch(&self) -> Result<String>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

/// Fetches the topology over HTTP
pub struct HttpGeometrySource {
    url: String,
    client: reqwest::Client,
}

impl HttpGeometrySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GeometrySource for HttpGeometrySource {
    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(MapError::Network)?
            .error_for_status()
            .map_err(MapError::Network)?;

        response.text().await.map_err(MapError::Network)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// In-memory topology, or a canned failure
pub struct StaticGeometrySource {
    body: std::result::Result<String, String>,
}

impl StaticGeometrySource {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Ok(body.into()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            body: Err(message.into()),
        }
    }
}

#[async_trait]
impl GeometrySource for StaticGeometrySource {
    async fn fetch(&self) -> Result<String> {
        match &self.body {
            Ok(body) => Ok(body.clone()),
            Err(message) => Err(MapError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                message.clone(),
            ))),
        }
    }

    fn describe(&self) -> String {
        "in-memory topology".to_string()
    }
}

/// Receiving end of an in-flight geometry load
#[derive(Debug)]
pub struct PendingGeometry {
    rx: Receiver<Result<WorldGeometry>>,
}

impl PendingGeometry {
    /// A delivery slot; the sender side hands over exactly one result
    pub fn channel() -> (Sender<Result<WorldGeometry>>, Self) {
        let (tx, rx) = bounded(1);
        (tx, Self { rx })
    }

    /// Non-blocking poll. `None` while the load is still running.
    ///
    /// A loader that went away without reporting yields an error.
    pub fn try_take(&self) -> Option<Result<WorldGeometry>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(MapError::Geometry(
                "geometry loader stopped without a result".to_string(),
            ))),
        }
    }

    /// Blocks until the result arrives
    pub fn wait(self) -> Result<WorldGeometry> {
        self.rx.recv().map_err(|_| {
            MapError::Geometry("geometry loader stopped without a result".to_string())
        })?
    }
}

/// Fetches and decodes the topology from `source`
pub async fn load_geometry(source: &dyn GeometrySource) -> Result<WorldGeometry> {
    log::debug!("loading world geometry from {}", source.describe());
    let body = source.fetch().await?;
    WorldGeometry::from_topojson(&body)
}

/// Starts a load on `handle`; poll the returned [`PendingGeometry`] for the result
#[cfg(feature = "tokio-runtime")]
pub fn spawn_geometry_load(
    handle: &tokio::runtime::Handle,
    source: Arc<dyn GeometrySource>,
) -> PendingGeometry {
    let (tx, pending) = PendingGeometry::channel();
    handle.spawn(async move {
        let result = load_geometry(source.as_ref()).await;
        if let Err(e) = &result {
            log::error!("failed to load world geometry from {}: {}", source.describe(), e);
        }
        // The map may have been dropped meanwhile.
        let _ = tx.send(result);
    });
    pending
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[1, 0], [1, 1]],
            [[1, 1], [0, 1], [0, 0], [1, 0]],
            [[1, 0], [2, 0], [2, 1], [1, 1]]
        ],
        "objects": {
            "countries": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "arcs": [[0, 1]]},
                {"type": "Polygon", "arcs": [[2, -1]]}
            ]},
            "land": {"type": "MultiPolygon", "arcs": [[[1, 2]]]}
        }
    }"#;

    #[test]
    fn test_world_geometry_from_topojson() {
        let world = WorldGeometry::from_topojson(WORLD).unwrap();
        assert_eq!(world.land.polygons().len(), 1);
        assert_eq!(world.boundaries.lines().len(), 1);
    }

    #[test]
    fn test_missing_countries_object() {
        let result = WorldGeometry::from_topojson(
            r#"{"type": "Topology", "arcs": [], "objects": {}}"#,
        );
        assert!(matches!(result, Err(MapError::Geometry(_))));
    }

    #[test]
    fn test_pending_geometry_polling() {
        let (tx, pending) = PendingGeometry::channel();
        assert!(pending.try_take().is_none());

        tx.send(WorldGeometry::from_topojson(WORLD)).unwrap();
        assert!(matches!(pending.try_take(), Some(Ok(_))));

        drop(tx);
        assert!(matches!(pending.try_take(), Some(Err(MapError::Geometry(_)))));
    }

    #[tokio::test]
    async fn test_load_from_static_source() {
        let world = load_geometry(&StaticGeometrySource::new(WORLD)).await.unwrap();
        assert_eq!(world.boundaries.lines().len(), 1);

        let failed = load_geometry(&StaticGeometrySource::failing("gone")).await;
        assert!(matches!(failed, Err(MapError::Io(_))));
    }
}
