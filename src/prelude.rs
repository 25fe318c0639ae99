//! Prelude module for common mapgate types and traits
//!
//! Re-exports the types most callers need, for `use mapgate::prelude::*;`

pub use crate::core::{
    camera::CameraOptions,
    config::{BoundaryConfig, FilterConfig, GeolocationOptions, MapConfig, ViewConfig},
    geo::{generate_circle, haversine_km, GeoPoint},
    map::CityMap,
};

pub use crate::data::{
    filters::{ChangeOrigin, FilterExpression, FilterStore},
    geojson::{GeoJson, GeoJsonFeature, PointOfInterest},
    settings::PerformanceSettings,
    storage::{KeyValueStorage, MemoryStorage, StorageEvent},
};

pub use crate::input::events::{GeolocationError, LocationFix, MapEvent, PositionError};

pub use crate::plugins::{
    base::PluginTrait,
    boundary::BoundaryGate,
    geolocate::{FixOutcome, GeolocateHandler, GeolocationController, TrackingState},
};

pub use crate::traits::{LocationControl, MapHost, UiSurface};

pub use crate::{Error as MapError, Result};

pub use std::time::Duration;

pub use instant::Instant;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
