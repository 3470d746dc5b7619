//! Prelude module for common meteormap types and traits
//!
//! Re-exports the most commonly used types for `use meteormap::prelude::*;`

pub use crate::core::{
    config::MapOptions,
    geo::{LatLng, Point},
    map::MapView,
    projection::{ProjectionState, ViewportContext},
};

pub use crate::input::{
    drag::DragController,
    events::{InputEvent, TouchEventType, TouchPoint},
    handler::{Action, InputRouter},
    zoom::{ZoomController, ZoomFollowUp, ZoomState, ZoomTrigger},
};

pub use crate::layers::{base::LayerTrait, manager::LayerManager};

pub use crate::background::geometry::{GeometrySource, WorldGeometry};

pub use crate::rendering::{
    context::{DrawCommand, FrameSink, RenderContext},
    scheduler::RenderScheduler,
};

pub use crate::runtime::{DeferredHandle, DeferredQueue, FrameClock};

pub use crate::data::{
    geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry},
    meteorites::{MeteorDataset, Meteorite, SizeBuckets},
    topojson::Topology,
};

pub use crate::ui::popup::{DetailPopup, Popup};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
