//! Geometry evaluator: pure containment tests for the three zone shapes.
//!
//! All functions assume well-formed geometry (validated at write time) and
//! never fail at evaluation time.
//!
//! Boundary semantics differ deliberately per shape:
//! - circle and rectangle boundaries are inclusive;
//! - a point exactly on a polygon edge is OUTSIDE, so boundary jitter
//!   resolves to EXIT instead of flapping ENTER events.

use geo::{point, HaversineDistance};

use crate::models::zone::{CircleGeometry, GeoPoint, PolygonGeometry, RectangleGeometry};
use crate::models::ZoneGeometry;

/// Tolerance for the on-edge polygon test, in squared degrees.
const EDGE_EPSILON: f64 = 1e-12;

/// Returns true if the coordinate lies inside the zone geometry.
pub fn contains(geometry: &ZoneGeometry, lat: f64, lng: f64) -> bool {
    match geometry {
        ZoneGeometry::Circle(c) => circle_contains(c, lat, lng),
        ZoneGeometry::Rectangle(r) => rectangle_contains(r, lat, lng),
        ZoneGeometry::Polygon(p) => polygon_contains(p, lat, lng),
    }
}

/// Great-circle (haversine) distance in meters between two coordinates.
///
/// Accurate enough at signage scale; full geodesic precision is a non-goal.
pub fn haversine_distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let a = point!(x: lng1, y: lat1);
    let b = point!(x: lng2, y: lat2);
    a.haversine_distance(&b)
}

fn circle_contains(circle: &CircleGeometry, lat: f64, lng: f64) -> bool {
    let distance = haversine_distance_meters(lat, lng, circle.center_lat, circle.center_lng);
    distance <= circle.radius_meters
}

fn rectangle_contains(rect: &RectangleGeometry, lat: f64, lng: f64) -> bool {
    rect.south <= lat && lat <= rect.north && rect.west <= lng && lng <= rect.east
}

/// Even-odd ray casting over the implicitly closed vertex loop: a horizontal
/// ray from the point crosses the boundary an odd number of times iff the
/// point is inside. Points exactly on an edge short-circuit to outside.
fn polygon_contains(polygon: &PolygonGeometry, lat: f64, lng: f64) -> bool {
    let vertices = &polygon.vertices;
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];

        if on_segment(&vj, &vi, lat, lng) {
            return false;
        }

        // Edge straddles the ray's latitude; test crossing to the east
        if (vi.lat > lat) != (vj.lat > lat) {
            let intersect_lng = (vj.lng - vi.lng) * (lat - vi.lat) / (vj.lat - vi.lat) + vi.lng;
            if lng < intersect_lng {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}

/// Whether (lat, lng) lies on the closed segment a-b, within tolerance.
fn on_segment(a: &GeoPoint, b: &GeoPoint, lat: f64, lng: f64) -> bool {
    let cross = (b.lng - a.lng) * (lat - a.lat) - (b.lat - a.lat) * (lng - a.lng);
    if cross.abs() > EDGE_EPSILON {
        return false;
    }

    let (min_lat, max_lat) = if a.lat <= b.lat {
        (a.lat, b.lat)
    } else {
        (b.lat, a.lat)
    };
    let (min_lng, max_lng) = if a.lng <= b.lng {
        (a.lng, b.lng)
    } else {
        (b.lng, a.lng)
    };

    min_lat <= lat && lat <= max_lat && min_lng <= lng && lng <= max_lng
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::zone::{CircleGeometry, GeoPoint, PolygonGeometry, RectangleGeometry};

    fn nyc_circle(radius_meters: f64) -> ZoneGeometry {
        ZoneGeometry::Circle(CircleGeometry {
            center_lat: 40.7128,
            center_lng: -74.0060,
            radius_meters,
        })
    }

    fn midtown_rectangle() -> ZoneGeometry {
        ZoneGeometry::Rectangle(RectangleGeometry {
            north: 40.75,
            south: 40.70,
            east: -73.95,
            west: -74.05,
        })
    }

    fn triangle() -> ZoneGeometry {
        ZoneGeometry::Polygon(PolygonGeometry {
            vertices: vec![
                GeoPoint { lat: 40.71, lng: -74.01 },
                GeoPoint { lat: 40.72, lng: -74.00 },
                GeoPoint { lat: 40.71, lng: -73.99 },
            ],
        })
    }

    #[test]
    fn test_circle_contains_center() {
        assert!(contains(&nyc_circle(1000.0), 40.7128, -74.0060));
    }

    #[test]
    fn test_circle_excludes_point_1500m_away() {
        // ~1500m due north of the center
        assert!(!contains(&nyc_circle(1000.0), 40.7263, -74.0060));
    }

    #[test]
    fn test_circle_contains_point_within_radius() {
        // ~500m due north of the center
        assert!(contains(&nyc_circle(1000.0), 40.7173, -74.0060));
    }

    #[test]
    fn test_circle_boundary_inclusive() {
        // Radius set to the exact haversine distance of the probe point, so
        // the boundary comparison sees equal values.
        let probe = (40.7200, -74.0000);
        let distance = haversine_distance_meters(probe.0, probe.1, 40.7128, -74.0060);
        assert!(contains(&nyc_circle(distance), probe.0, probe.1));
    }

    #[test]
    fn test_rectangle_contains_interior_point() {
        assert!(contains(&midtown_rectangle(), 40.72, -74.00));
    }

    #[test]
    fn test_rectangle_excludes_point_north_of_bounds() {
        assert!(!contains(&midtown_rectangle(), 40.80, -74.00));
    }

    #[test]
    fn test_rectangle_boundary_inclusive() {
        let rect = midtown_rectangle();
        assert!(contains(&rect, 40.75, -74.00)); // north edge
        assert!(contains(&rect, 40.70, -74.00)); // south edge
        assert!(contains(&rect, 40.72, -73.95)); // east edge
        assert!(contains(&rect, 40.72, -74.05)); // west edge
        assert!(contains(&rect, 40.75, -73.95)); // corner
    }

    #[test]
    fn test_polygon_contains_interior_point() {
        assert!(contains(&triangle(), 40.711, -74.00));
    }

    #[test]
    fn test_polygon_excludes_far_point() {
        assert!(!contains(&triangle(), 41.0, -74.0));
    }

    #[test]
    fn test_polygon_point_on_edge_is_outside() {
        // Midpoint of the base edge between the first and last vertices
        assert!(!contains(&triangle(), 40.71, -74.00));
    }

    #[test]
    fn test_polygon_vertex_is_outside() {
        assert!(!contains(&triangle(), 40.71, -74.01));
    }

    #[test]
    fn test_polygon_just_outside_edge() {
        assert!(!contains(&triangle(), 40.7099, -74.00));
    }

    #[test]
    fn test_concave_polygon() {
        // U-shape opening north; the notch interior is outside the polygon
        let u_shape = ZoneGeometry::Polygon(PolygonGeometry {
            vertices: vec![
                GeoPoint { lat: 0.0, lng: 0.0 },
                GeoPoint { lat: 3.0, lng: 0.0 },
                GeoPoint { lat: 3.0, lng: 1.0 },
                GeoPoint { lat: 1.0, lng: 1.0 },
                GeoPoint { lat: 1.0, lng: 2.0 },
                GeoPoint { lat: 3.0, lng: 2.0 },
                GeoPoint { lat: 3.0, lng: 3.0 },
                GeoPoint { lat: 0.0, lng: 3.0 },
            ],
        });
        assert!(contains(&u_shape, 0.5, 1.5)); // bottom bar
        assert!(!contains(&u_shape, 2.0, 1.5)); // inside the notch
        assert!(contains(&u_shape, 2.0, 0.5)); // left arm
        assert!(contains(&u_shape, 2.0, 2.5)); // right arm
    }

    #[test]
    fn test_haversine_known_distance() {
        // NYC to Philadelphia city hall, roughly 130 km
        let d = haversine_distance_meters(40.7128, -74.0060, 39.9526, -75.1652);
        assert!((120_000.0..140_000.0).contains(&d), "distance was {d}");
    }

    #[test]
    fn test_haversine_zero_distance() {
        assert_eq!(
            haversine_distance_meters(40.0, -74.0, 40.0, -74.0),
            0.0
        );
    }
}
