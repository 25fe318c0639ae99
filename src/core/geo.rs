use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per degree of latitude used by the local circle approximation.
const KM_PER_DEGREE_LAT: f64 = 110.574;

/// Kilometres per degree of longitude at the equator.
const KM_PER_DEGREE_LNG_AT_EQUATOR: f64 = 111.32;

/// A geographic coordinate.
///
/// Serialized as `[longitude, latitude]`, the order used by GeoJSON and by the
/// map engine, so the order cannot silently flip at a serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Creates a new point. Note the argument order: longitude first.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to another point, in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self, other)
    }

    /// Great-circle distance to another point, in metres.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        haversine_km(self, other) * 1000.0
    }

    /// Point reached by travelling `distance_km` along the great circle with the
    /// given initial bearing (degrees clockwise from north).
    pub fn destination(&self, bearing_deg: f64, distance_km: f64) -> GeoPoint {
        let angular = distance_km / EARTH_RADIUS_KM;
        let bearing = bearing_deg.to_radians();
        let lat1 = self.latitude.to_radians();
        let lng1 = self.longitude.to_radians();

        let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lng2 = lng1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lng2.to_degrees(), lat2.to_degrees())
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(coords: [f64; 2]) -> Self {
        GeoPoint::new(coords[0], coords[1])
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.longitude, point.latitude]
    }
}

impl From<GeoPoint> for geo_types::Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        geo_types::coord! { x: point.longitude, y: point.latitude }
    }
}

impl From<GeoPoint> for geo_types::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo_types::Point::new(point.longitude, point.latitude)
    }
}

impl From<geo_types::Point<f64>> for GeoPoint {
    fn from(point: geo_types::Point<f64>) -> Self {
        GeoPoint::new(point.x(), point.y())
    }
}

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Builds a closed ring of `point_count + 1` points approximating a circle.
///
/// Uses a local equirectangular approximation, which only holds for radii from
/// tens of metres to a few kilometres. Do not use it for large geofences.
pub fn generate_circle(center: GeoPoint, radius_m: f64, point_count: usize) -> Vec<GeoPoint> {
    if point_count == 0 {
        return Vec::new();
    }

    let radius_km = radius_m / 1000.0;
    let lat_offset = radius_km / KM_PER_DEGREE_LAT;
    let lng_offset =
        radius_km / (KM_PER_DEGREE_LNG_AT_EQUATOR * center.latitude.to_radians().cos());

    let mut ring = Vec::with_capacity(point_count + 1);
    for i in 0..point_count {
        let angle = (i as f64 / point_count as f64) * std::f64::consts::TAU;
        ring.push(GeoPoint::new(
            center.longitude + lng_offset * angle.cos(),
            center.latitude + lat_offset * angle.sin(),
        ));
    }
    ring.push(ring[0]);
    ring
}

/// Converts a closed ring into a `geo-types` polygon without holes.
pub fn ring_to_polygon(ring: &[GeoPoint]) -> geo_types::Polygon<f64> {
    let exterior: Vec<geo_types::Coord<f64>> = ring.iter().map(|p| (*p).into()).collect();
    geo_types::Polygon::new(geo_types::LineString::from(exterior), Vec::new())
}
