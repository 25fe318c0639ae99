//! Property-based checks for the geofence geometry.
//!
//! Verifies:
//! 1. The boundary test is inclusive and agrees with the haversine distance
//! 2. Generated rings are closed, have `n + 1` points and stay within 1% of
//!    the requested radius for city-sized circles
//! 3. Distances agree with the `geo` crate's haversine implementation
//! 4. Every point well inside the geofence lies inside the drawn ring

use geo::{Contains, HaversineDistance};
use mapgate::{
    core::{
        config::{BoundaryConfig, ViewConfig},
        geo::ring_to_polygon,
    },
    generate_circle, haversine_km, BoundaryGate, GeoPoint,
};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_city_center() -> impl Strategy<Value = GeoPoint> {
    (-179.0f64..179.0, -70.0f64..70.0).prop_map(|(lng, lat)| GeoPoint::new(lng, lat))
}

fn arb_radius_m() -> impl Strategy<Value = f64> {
    10.0f64..1000.0
}

fn gate(center: GeoPoint, radius_m: f64) -> BoundaryGate {
    BoundaryGate::new(
        BoundaryConfig::new(center, radius_m / 1000.0).unwrap(),
        ViewConfig::default(),
    )
}

proptest! {
    #[test]
    fn boundary_matches_haversine(
        center in arb_city_center(),
        radius_m in arb_radius_m(),
        bearing in 0.0f64..360.0,
        fraction in 0.0f64..3.0,
    ) {
        let gate = gate(center, radius_m);
        let point = center.destination(bearing, radius_m * fraction / 1000.0);
        let inside = haversine_km(&center, &point) <= radius_m / 1000.0;
        prop_assert_eq!(gate.is_within_boundary(point), inside);
    }

    #[test]
    fn boundary_includes_its_center_and_excludes_far_points(
        center in arb_city_center(),
        radius_m in arb_radius_m(),
        bearing in 0.0f64..360.0,
    ) {
        let gate = gate(center, radius_m);
        prop_assert!(gate.is_within_boundary(center));
        let near = center.destination(bearing, radius_m * 0.99 / 1000.0);
        let far = center.destination(bearing, radius_m * 1.01 / 1000.0);
        prop_assert!(gate.is_within_boundary(near));
        prop_assert!(!gate.is_within_boundary(far));
    }

    #[test]
    fn circles_are_closed_and_round(
        center in arb_city_center(),
        radius_m in arb_radius_m(),
        n in 3usize..128,
    ) {
        let ring = generate_circle(center, radius_m, n);
        prop_assert_eq!(ring.len(), n + 1);
        prop_assert_eq!(ring.first(), ring.last());

        for point in &ring {
            let d = center.distance_m(point);
            prop_assert!(
                (d - radius_m).abs() <= radius_m * 0.01,
                "{} m from the center, asked for {} m", d, radius_m
            );
        }
    }

    #[test]
    fn distance_agrees_with_geo(
        a in arb_city_center(),
        bearing in 0.0f64..360.0,
        km in 0.0f64..50.0,
    ) {
        let b = a.destination(bearing, km);
        let ours = a.distance_m(&b);
        let theirs = geo::Point::from(a).haversine_distance(&geo::Point::from(b));
        // geo uses the IUGG mean radius (6371.0088 km)
        prop_assert!((ours - theirs).abs() <= theirs * 1e-5 + 1e-6);
    }

    #[test]
    fn drawn_ring_covers_the_inner_area(
        center in arb_city_center(),
        radius_m in arb_radius_m(),
        bearing in 0.0f64..360.0,
        fraction in 0.0f64..0.95,
    ) {
        let gate = gate(center, radius_m);
        let polygon = ring_to_polygon(gate.ring());
        let point = center.destination(bearing, radius_m * fraction / 1000.0);
        prop_assert!(polygon.contains(&geo::Point::from(point)));
    }
}

#[test]
fn two_kilometres_north_of_heerlen_is_outside() {
    let gate = BoundaryGate::new(BoundaryConfig::default(), ViewConfig::default());
    let north = gate.center().destination(0.0, 2.0);

    assert!(gate.is_within_boundary(GeoPoint::new(5.977106, 50.887742)));
    assert!(!gate.is_within_boundary(north));
    assert!((gate.center().distance_km(&north) - 2.0).abs() < 1e-9);
}

#[test]
fn zero_segments_yield_no_ring() {
    assert!(generate_circle(GeoPoint::new(5.97, 50.88), 600.0, 0).is_empty());
}
