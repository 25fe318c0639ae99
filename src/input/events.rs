use crate::core::geo::GeoPoint;
use crate::data::storage::StorageEvent;
use serde::{Deserialize, Serialize};

/// Coordinates of a geolocation fix, as delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
}

/// A single resolved geolocation reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coords: Coordinates,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: u64,
}

impl LocationFix {
    pub fn new(position: GeoPoint) -> Self {
        Self {
            coords: Coordinates {
                latitude: position.latitude,
                longitude: position.longitude,
                accuracy: None,
                heading: None,
            },
            timestamp: 0,
        }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.coords.heading = Some(heading);
        self
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.coords.longitude, self.coords.latitude)
    }

    /// Heading in degrees, when the device reports a usable one
    pub fn heading(&self) -> Option<f64> {
        self.coords.heading.filter(|h| h.is_finite())
    }
}

/// A failed geolocation request, as delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionError {
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

impl PositionError {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            message: String::new(),
        }
    }

    pub fn kind(&self) -> GeolocationError {
        GeolocationError::from_code(self.code)
    }
}

/// Geolocation failure categories. `Display` is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error, Serialize, Deserialize)]
pub enum GeolocationError {
    #[error("Location access denied. Enable it in your settings.")]
    PermissionDenied,
    #[error("Location unavailable. Check your device settings.")]
    PositionUnavailable,
    #[error("The location request timed out. Please try again.")]
    Timeout,
    #[error("Something went wrong while retrieving your location.")]
    Unknown,
}

impl GeolocationError {
    /// Maps the platform's numeric error code
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            2 => GeolocationError::PositionUnavailable,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::Unknown,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            GeolocationError::PermissionDenied => 1,
            GeolocationError::PositionUnavailable => 2,
            GeolocationError::Timeout => 3,
            GeolocationError::Unknown => 0,
        }
    }
}

/// Events the host page forwards to the subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MapEvent {
    /// The map style finished loading (or reloaded)
    StyleLoaded,
    /// The map finished rendering and has no pending work
    Idle,
    /// The user clicked the "locate me" control
    LocateButtonClicked,
    LocationResolved(LocationFix),
    LocationError(PositionError),
    /// The location control entered a tracking session
    TrackingStarted,
    /// The user switched tracking off
    TrackingEnded,
    /// A location popup opened
    PopupOpened,
    PopupClosed,
    /// The user acknowledged the boundary prompt
    PromptAcknowledged,
    FilterButtonClicked { category: String },
    StorageChanged(StorageEvent),
    Toggle3d { enabled: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_categories() {
        assert_eq!(GeolocationError::from_code(1), GeolocationError::PermissionDenied);
        assert_eq!(GeolocationError::from_code(2), GeolocationError::PositionUnavailable);
        assert_eq!(GeolocationError::from_code(3), GeolocationError::Timeout);
        assert_eq!(GeolocationError::from_code(42), GeolocationError::Unknown);
        assert_eq!(PositionError::new(3).kind().code(), 3);
    }

    #[test]
    fn every_category_has_a_distinct_message() {
        let messages: std::collections::HashSet<String> = [1, 2, 3, 0]
            .into_iter()
            .map(|code| GeolocationError::from_code(code).to_string())
            .collect();
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn fix_position_is_longitude_first() {
        let fix: LocationFix = serde_json::from_str(
            r#"{
                "coords": { "latitude": 50.88, "longitude": 5.97, "heading": 90.0 },
                "timestamp": 1
            }"#,
        )
        .unwrap();

        assert_eq!(fix.position(), GeoPoint::new(5.97, 50.88));
        assert_eq!(fix.heading(), Some(90.0));
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: MapEvent = serde_json::from_str(
            r#"{ "event": "filter_button_clicked", "category": "SHOP" }"#,
        )
        .unwrap();
        assert_eq!(
            event,
            MapEvent::FilterButtonClicked {
                category: "SHOP".to_string()
            }
        );

        let event: MapEvent = serde_json::from_str(
            r#"{ "event": "storage_changed", "key": "heerlenActiveFilters", "new_value": "[]" }"#,
        )
        .unwrap();
        assert!(matches!(event, MapEvent::StorageChanged(e) if e.is_for("heerlenActiveFilters")));

        let event: MapEvent =
            serde_json::from_str(r#"{ "event": "location_error", "code": 1 }"#).unwrap();
        assert_eq!(event, MapEvent::LocationError(PositionError::new(1)));
    }
}
