//! Static configuration for the city map subsystem
//!
//! Defaults reproduce the deployed map. A JSON file can override any subset of
//! fields; everything missing falls back to the defaults below.

use crate::animation::tweening::EasingFunction;
use crate::core::{camera::CameraOptions, constants, geo::GeoPoint};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub view: ViewConfig,
    pub boundary: BoundaryConfig,
    pub geolocation: GeolocationOptions,
    pub filters: FilterConfig,
    pub performance_storage_key: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            boundary: BoundaryConfig::default(),
            geolocation: GeolocationOptions::default(),
            filters: FilterConfig::default(),
            performance_storage_key: constants::PERFORMANCE_STORAGE_KEY.to_string(),
        }
    }
}

impl MapConfig {
    /// Parses a JSON document and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.boundary.validate()?;
        if !self.view.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "view center {:?}",
                self.view.center
            )));
        }
        if self.filters.storage_key.is_empty() {
            return Err(MapError::InvalidConfig(
                "filter storage key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// The default camera the map starts in and returns to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub center: GeoPoint,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    /// Zoom of the intro view on regular layouts.
    pub intro_zoom: f64,
    /// Zoom of the intro view on compact (phone) layouts.
    pub intro_zoom_compact: f64,
    pub intro_pitch: f64,
    pub intro_duration_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(5.979642, 50.887634),
            zoom: 15.5,
            pitch: 45.0,
            bearing: -17.6,
            intro_zoom: 18.0,
            intro_zoom_compact: 17.0,
            intro_pitch: 55.0,
            intro_duration_ms: 3000,
        }
    }
}

impl ViewConfig {
    /// Camera command returning to the intro view.
    pub fn intro_camera(&self, compact: bool) -> CameraOptions {
        let zoom = if compact {
            self.intro_zoom_compact
        } else {
            self.intro_zoom
        };
        CameraOptions::new()
            .center(self.center)
            .zoom(zoom)
            .pitch(self.intro_pitch)
            .bearing(self.bearing)
            .duration_ms(self.intro_duration_ms)
            .easing(EasingFunction::EaseOutQuad)
            .essential()
    }
}

/// The circular geofence. `radius_km` must be positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub center: GeoPoint,
    pub radius_km: f64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(5.977105864037915, 50.88774161029858),
            radius_km: 0.6,
        }
    }
}

impl BoundaryConfig {
    pub fn new(center: GeoPoint, radius_km: f64) -> Result<Self> {
        let config = Self { center, radius_km };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "boundary radius must be positive, got {}",
                self.radius_km
            )));
        }
        if !self.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "boundary center {:?}",
                self.center
            )));
        }
        Ok(())
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_km * 1000.0
    }
}

/// Options handed to the platform geolocation API.
///
/// The subsystem never reads these itself. The host passes them to its
/// location control or to `watchPosition`; with the `wasm` feature they
/// convert into `web_sys::PositionOptions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    pub maximum_age_ms: u64,
    pub timeout_ms: u64,
    pub track_user_location: bool,
    pub show_user_heading: bool,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            maximum_age_ms: 1000,
            timeout_ms: 6000,
            track_user_location: true,
            show_user_heading: true,
        }
    }
}

impl GeolocationOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub storage_key: String,
    /// Map layers the category filter is applied to.
    pub layers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            storage_key: constants::FILTER_STORAGE_KEY.to_string(),
            layers: vec![
                "location-markers".to_string(),
                "location-icons".to_string(),
                "location-labels".to_string(),
            ],
        }
    }
}
