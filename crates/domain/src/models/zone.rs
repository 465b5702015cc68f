//! Geofence zone domain model.
//!
//! A zone is a named geographic region owned by one company. Its shape is a
//! tagged union of circle, rectangle and polygon geometries so that an
//! incompatible payload is rejected at deserialization or validation time
//! and never reaches containment evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Circle geometry: all points within `radius_meters` of the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleGeometry {
    pub center_lat: f64,
    pub center_lng: f64,
    pub radius_meters: f64,
}

/// Axis-aligned rectangle geometry in degrees.
///
/// Rectangles crossing the antimeridian are unsupported and rejected at
/// validation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleGeometry {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Simple polygon geometry: an ordered vertex list, implicitly closed
/// (the last vertex connects back to the first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonGeometry {
    pub vertices: Vec<GeoPoint>,
}

/// Zone shape, discriminated by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ZoneGeometry {
    Circle(CircleGeometry),
    Rectangle(RectangleGeometry),
    Polygon(PolygonGeometry),
}

/// Geometry invariant violations, surfaced at create/update time.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Radius must be greater than zero")]
    NonPositiveRadius,
    #[error("North bound must be greater than south bound")]
    InvertedLatitudeBounds,
    #[error("Rectangles crossing the antimeridian are not supported")]
    AntimeridianCrossing,
    #[error("Polygon requires at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("Coordinate out of range: lat={lat}, lng={lng}")]
    CoordinateOutOfRange { lat: f64, lng: f64 },
}

fn check_coordinate(lat: f64, lng: f64) -> Result<(), GeometryError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(GeometryError::CoordinateOutOfRange { lat, lng });
    }
    Ok(())
}

impl ZoneGeometry {
    /// Checks the shape invariants. Containment evaluation assumes these
    /// hold, so every write path must call this first.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            ZoneGeometry::Circle(c) => {
                check_coordinate(c.center_lat, c.center_lng)?;
                if c.radius_meters <= 0.0 {
                    return Err(GeometryError::NonPositiveRadius);
                }
                Ok(())
            }
            ZoneGeometry::Rectangle(r) => {
                check_coordinate(r.north, r.east)?;
                check_coordinate(r.south, r.west)?;
                if r.north <= r.south {
                    return Err(GeometryError::InvertedLatitudeBounds);
                }
                if r.east < r.west {
                    return Err(GeometryError::AntimeridianCrossing);
                }
                Ok(())
            }
            ZoneGeometry::Polygon(p) => {
                if p.vertices.len() < 3 {
                    return Err(GeometryError::TooFewVertices(p.vertices.len()));
                }
                for v in &p.vertices {
                    check_coordinate(v.lat, v.lng)?;
                }
                Ok(())
            }
        }
    }

    /// Database discriminant for the `zone_type` column.
    pub fn type_str(&self) -> &'static str {
        match self {
            ZoneGeometry::Circle(_) => "circle",
            ZoneGeometry::Rectangle(_) => "rectangle",
            ZoneGeometry::Polygon(_) => "polygon",
        }
    }
}

/// Validator hook so request DTOs can carry the geometry check.
fn validate_zone_geometry(geometry: &ZoneGeometry) -> Result<(), ValidationError> {
    geometry.validate().map_err(|e| {
        let mut err = ValidationError::new("geometry");
        err.message = Some(e.to_string().into());
        err
    })
}

/// Represents a geofence zone in the system.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceZone {
    pub id: i64,
    pub zone_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub geometry: ZoneGeometry,
    pub active: bool,
    pub color: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default active status for new zones.
fn default_active() -> bool {
    true
}

/// Request payload for creating a zone.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateZoneRequest {
    pub company_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(custom(function = "validate_zone_geometry"))]
    pub geometry: ZoneGeometry,

    #[serde(default = "default_active")]
    pub active: bool,

    #[validate(length(max = 7, message = "Color must be a hex color code like #FF5733"))]
    pub color: Option<String>,

    pub metadata: Option<serde_json::Value>,
}

/// Request payload for updating a zone (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateZoneRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_zone_geometry"))]
    pub geometry: Option<ZoneGeometry>,

    pub active: Option<bool>,

    #[validate(length(max = 7, message = "Color must be a hex color code like #FF5733"))]
    pub color: Option<String>,

    pub metadata: Option<serde_json::Value>,
}

/// Request payload for toggling a zone's active flag.
#[derive(Debug, Clone, Deserialize)]
pub struct SetZoneActiveRequest {
    pub active: bool,
}

/// Response payload for zone operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneResponse {
    pub zone_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub geometry: ZoneGeometry,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GeofenceZone> for ZoneResponse {
    fn from(z: GeofenceZone) -> Self {
        Self {
            zone_id: z.zone_id,
            company_id: z.company_id,
            name: z.name,
            geometry: z.geometry,
            active: z.active,
            color: z.color,
            metadata: z.metadata,
            created_at: z.created_at,
            updated_at: z.updated_at,
        }
    }
}

/// Query parameters for listing zones.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListZonesQuery {
    pub company_id: Uuid,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Response for listing zones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListZonesResponse {
    pub zones: Vec<ZoneResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_geometry_tagged_serialization() {
        let geometry = ZoneGeometry::Circle(CircleGeometry {
            center_lat: 40.7128,
            center_lng: -74.0060,
            radius_meters: 1000.0,
        });

        let json = serde_json::to_string(&geometry).unwrap();
        assert!(json.contains("\"type\":\"circle\""));
        assert!(json.contains("\"centerLat\":40.7128"));
        assert!(json.contains("\"radiusMeters\":1000"));
    }

    #[test]
    fn test_geometry_deserialization_by_tag() {
        let circle: ZoneGeometry = serde_json::from_str(
            r#"{"type":"circle","centerLat":40.0,"centerLng":-74.0,"radiusMeters":500.0}"#,
        )
        .unwrap();
        assert!(matches!(circle, ZoneGeometry::Circle(_)));

        let rect: ZoneGeometry = serde_json::from_str(
            r#"{"type":"rectangle","north":40.75,"south":40.70,"east":-73.95,"west":-74.05}"#,
        )
        .unwrap();
        assert!(matches!(rect, ZoneGeometry::Rectangle(_)));

        let polygon: ZoneGeometry = serde_json::from_str(
            r#"{"type":"polygon","vertices":[{"lat":40.71,"lng":-74.01},{"lat":40.72,"lng":-74.0},{"lat":40.71,"lng":-73.99}]}"#,
        )
        .unwrap();
        assert!(matches!(polygon, ZoneGeometry::Polygon(_)));
    }

    #[test]
    fn test_geometry_rejects_mismatched_payload() {
        // Circle fields under a rectangle tag must not deserialize
        let result: Result<ZoneGeometry, _> = serde_json::from_str(
            r#"{"type":"rectangle","centerLat":40.0,"centerLng":-74.0,"radiusMeters":500.0}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_circle_radius() {
        let zero = ZoneGeometry::Circle(CircleGeometry {
            center_lat: 0.0,
            center_lng: 0.0,
            radius_meters: 0.0,
        });
        assert_eq!(zero.validate(), Err(GeometryError::NonPositiveRadius));

        let negative = ZoneGeometry::Circle(CircleGeometry {
            center_lat: 0.0,
            center_lng: 0.0,
            radius_meters: -5.0,
        });
        assert_eq!(negative.validate(), Err(GeometryError::NonPositiveRadius));
    }

    #[test]
    fn test_validate_rectangle_bounds() {
        let inverted = ZoneGeometry::Rectangle(RectangleGeometry {
            north: 40.0,
            south: 41.0,
            east: -73.0,
            west: -74.0,
        });
        assert_eq!(
            inverted.validate(),
            Err(GeometryError::InvertedLatitudeBounds)
        );

        let antimeridian = ZoneGeometry::Rectangle(RectangleGeometry {
            north: 41.0,
            south: 40.0,
            east: 179.0,
            west: -179.0,
        });
        assert!(antimeridian.validate().is_ok());

        let crossing = ZoneGeometry::Rectangle(RectangleGeometry {
            north: 41.0,
            south: 40.0,
            east: -179.0,
            west: 179.0,
        });
        assert_eq!(crossing.validate(), Err(GeometryError::AntimeridianCrossing));
    }

    #[test]
    fn test_validate_polygon_vertex_count() {
        let two = ZoneGeometry::Polygon(PolygonGeometry {
            vertices: vec![
                GeoPoint { lat: 0.0, lng: 0.0 },
                GeoPoint { lat: 1.0, lng: 1.0 },
            ],
        });
        assert_eq!(two.validate(), Err(GeometryError::TooFewVertices(2)));
    }

    #[test]
    fn test_validate_coordinate_range() {
        let bad = ZoneGeometry::Circle(CircleGeometry {
            center_lat: 95.0,
            center_lng: 0.0,
            radius_meters: 100.0,
        });
        assert!(matches!(
            bad.validate(),
            Err(GeometryError::CoordinateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_type_str() {
        let circle = ZoneGeometry::Circle(CircleGeometry {
            center_lat: 0.0,
            center_lng: 0.0,
            radius_meters: 1.0,
        });
        assert_eq!(circle.type_str(), "circle");
    }

    #[test]
    fn test_create_zone_request_defaults() {
        let json = r#"{
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "name": "Times Square",
            "geometry": {"type":"circle","centerLat":40.758,"centerLng":-73.985,"radiusMeters":250.0}
        }"#;

        let request: CreateZoneRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "Times Square");
        assert!(request.active);
        assert!(request.color.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_zone_request_invalid_geometry_fails_validation() {
        let json = r#"{
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "name": "Broken",
            "geometry": {"type":"circle","centerLat":40.758,"centerLng":-73.985,"radiusMeters":-1.0}
        }"#;

        let request: CreateZoneRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_zone_request_partial() {
        let json = r#"{"name": "Renamed"}"#;
        let request: UpdateZoneRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, Some("Renamed".to_string()));
        assert!(request.geometry.is_none());
        assert!(request.active.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_zone_response_skips_empty_display_fields() {
        let response = ZoneResponse {
            zone_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Test".to_string(),
            geometry: ZoneGeometry::Rectangle(RectangleGeometry {
                north: 40.75,
                south: 40.70,
                east: -73.95,
                west: -74.05,
            }),
            active: true,
            color: None,
            metadata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"name\":\"Test\""));
        assert!(!json.contains("\"color\""));
        assert!(!json.contains("\"metadata\""));
    }
}
