use crate::{
    core::geo::GeoPoint, data::geojson::PointOfInterest, traits::MapHost,
};
use serde::{Deserialize, Serialize};

/// A marker showing how far a nearby point of interest is from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMarker {
    pub id: String,
    pub poi_id: String,
    pub position: GeoPoint,
    pub distance_m: f64,
    /// Rounded distance, e.g. `"12m"`
    pub label: String,
}

impl DistanceMarker {
    pub fn new(poi: &PointOfInterest, distance_m: f64) -> Self {
        Self {
            id: format!("distance-{}", poi.id),
            poi_id: poi.id.clone(),
            position: poi.position,
            distance_m,
            label: format!("{}m", distance_m.round() as i64),
        }
    }
}

/// Markers for every point of interest within `radius_m` of the last user fix.
///
/// Never patched in place: each update clears the set and rebuilds it.
#[derive(Debug)]
pub struct DistanceMarkerSet {
    radius_m: f64,
    markers: Vec<DistanceMarker>,
}

impl DistanceMarkerSet {
    pub fn new(radius_m: f64) -> Self {
        Self {
            radius_m,
            markers: Vec::new(),
        }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn recompute(&mut self, user: GeoPoint, pois: &[PointOfInterest], map: &mut dyn MapHost) {
        self.clear(map);

        for poi in pois {
            let distance_m = user.distance_m(&poi.position);
            if distance_m <= self.radius_m {
                let marker = DistanceMarker::new(poi, distance_m);
                map.add_marker(&marker);
                self.markers.push(marker);
            }
        }
        log::debug!(
            "{} distance markers within {} m of {:?}",
            self.markers.len(),
            self.radius_m,
            user
        );
    }

    pub fn clear(&mut self, map: &mut dyn MapHost) {
        for marker in self.markers.drain(..) {
            map.remove_marker(&marker.id);
        }
    }

    pub fn markers(&self) -> &[DistanceMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessMap;

    fn pois_around(user: GeoPoint) -> Vec<PointOfInterest> {
        vec![
            PointOfInterest::new("near", user.destination(90.0, 0.010)),
            PointOfInterest::new("edge", user.destination(180.0, 0.0249)),
            PointOfInterest::new("far", user.destination(0.0, 0.040)),
        ]
    }

    #[test]
    fn keeps_only_points_within_radius() {
        let user = GeoPoint::new(5.977106, 50.887742);
        let mut map = HeadlessMap::default();
        let mut set = DistanceMarkerSet::new(25.0);

        set.recompute(user, &pois_around(user), &mut map);

        let ids: Vec<&str> = set.markers().iter().map(|m| m.poi_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "edge"]);
        assert_eq!(set.markers()[0].label, "10m");
        assert_eq!(map.marker_ids().len(), 2);
    }

    #[test]
    fn recompute_replaces_previous_markers() {
        let user = GeoPoint::new(5.977106, 50.887742);
        let pois = pois_around(user);
        let mut map = HeadlessMap::default();
        let mut set = DistanceMarkerSet::new(25.0);

        set.recompute(user, &pois, &mut map);
        let moved = user.destination(0.0, 0.035);
        set.recompute(moved, &pois, &mut map);

        let ids: Vec<&str> = set.markers().iter().map(|m| m.poi_id.as_str()).collect();
        assert_eq!(ids, vec!["far"]);
        assert_eq!(map.marker_ids(), vec!["distance-far".to_string()]);

        set.clear(&mut map);
        assert!(set.is_empty());
        assert!(map.marker_ids().is_empty());
    }
}
