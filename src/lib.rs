//! # mapgate
//!
//! Boundary-gated geolocation and category filters for an interactive city map.
//!
//! The map renderer, its location control and the page around it are
//! collaborators behind the traits in [`traits`]. This crate owns the state
//! with real invariants: the circular geofence, the tracking session that is
//! gated on it, and the set of active category filters that stays consistent
//! across every open tab.

pub mod animation;
pub mod core;
pub mod data;
pub mod headless;
pub mod input;
pub mod layers;
#[cfg(feature = "wasm")]
pub mod platform;
pub mod plugins;
pub mod prelude;
pub mod runtime;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    camera::CameraOptions,
    config::{BoundaryConfig, MapConfig},
    geo::{generate_circle, haversine_km, GeoPoint},
    map::CityMap,
};

pub use data::{
    filters::{ChangeOrigin, FilterExpression, FilterStore},
    settings::PerformanceSettings,
    storage::{KeyValueStorage, MemoryStorage, StorageEvent},
};

pub use input::events::{GeolocationError, LocationFix, MapEvent, PositionError};

pub use plugins::{
    boundary::BoundaryGate,
    geolocate::{GeolocateHandler, GeolocationController, TrackingState},
};

pub use traits::{LocationControl, MapHost, UiSurface};

pub use animation::tweening::{EasingFunction, Tween};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer not found: {0}")]
    MissingLayer(String),

    #[error("Source not found: {0}")]
    MissingSource(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),
}

/// Error type alias for convenience
pub type Error = MapError;
