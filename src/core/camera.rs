use crate::animation::tweening::EasingFunction;
use crate::core::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters of a `flyTo` / `easeTo` command sent to the map engine.
///
/// Fields left as `None` keep the engine's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CameraOptions {
    pub center: Option<GeoPoint>,
    pub zoom: Option<f64>,
    pub pitch: Option<f64>,
    pub bearing: Option<f64>,
    #[serde(with = "duration_ms", default)]
    pub duration: Option<Duration>,
    pub easing: Option<EasingFunction>,
    /// Animate even when the user prefers reduced motion.
    #[serde(default)]
    pub essential: bool,
}

impl CameraOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(mut self, center: GeoPoint) -> Self {
        self.center = Some(center);
        self
    }

    pub fn zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn bearing(mut self, bearing: f64) -> Self {
        self.bearing = Some(bearing);
        self
    }

    pub fn duration_ms(mut self, millis: u64) -> Self {
        self.duration = Some(Duration::from_millis(millis));
        self
    }

    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn essential(mut self) -> Self {
        self.essential = true;
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let options = CameraOptions::new()
            .center(GeoPoint::new(5.97, 50.88))
            .zoom(14.0)
            .pitch(0.0)
            .bearing(0.0)
            .duration_ms(1500);

        assert_eq!(options.zoom, Some(14.0));
        assert_eq!(options.duration, Some(Duration::from_millis(1500)));
        assert!(!options.essential);
    }

    #[test]
    fn duration_serializes_as_millis() {
        let options = CameraOptions::new().duration_ms(2000);
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["duration"], 2000);

        let back: CameraOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, options);
    }
}
