//! Geofence zone entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{GeofenceZone, ZoneGeometry};

/// Database row mapping for the geofence_zones table.
///
/// The geometry is stored as the tagged JSON union; `zone_type` is a
/// denormalized discriminant kept for indexed filtering.
#[derive(Debug, Clone, FromRow)]
pub struct ZoneEntity {
    pub id: i64,
    pub zone_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub zone_type: String,
    pub geometry: serde_json::Value,
    pub active: bool,
    pub color: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ZoneEntity> for GeofenceZone {
    type Error = serde_json::Error;

    /// Fails only if a stored geometry payload no longer matches the tagged
    /// union, which write-time validation rules out for new rows.
    fn try_from(entity: ZoneEntity) -> Result<Self, Self::Error> {
        let geometry: ZoneGeometry = serde_json::from_value(entity.geometry)?;
        Ok(Self {
            id: entity.id,
            zone_id: entity.zone_id,
            company_id: entity.company_id,
            name: entity.name,
            geometry,
            active: entity.active,
            color: entity.color,
            metadata: entity.metadata,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_zone_entity() -> ZoneEntity {
        ZoneEntity {
            id: 1,
            zone_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Downtown".to_string(),
            zone_type: "circle".to_string(),
            geometry: json!({
                "type": "circle",
                "centerLat": 40.7128,
                "centerLng": -74.0060,
                "radiusMeters": 1000.0
            }),
            active: true,
            color: Some("#FF5733".to_string()),
            metadata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_zone_entity_to_domain() {
        let entity = create_test_zone_entity();
        let zone: GeofenceZone = entity.clone().try_into().unwrap();

        assert_eq!(zone.id, entity.id);
        assert_eq!(zone.zone_id, entity.zone_id);
        assert_eq!(zone.company_id, entity.company_id);
        assert_eq!(zone.name, entity.name);
        assert!(matches!(zone.geometry, ZoneGeometry::Circle(_)));
        assert_eq!(zone.geometry.type_str(), entity.zone_type);
        assert!(zone.active);
    }

    #[test]
    fn test_zone_entity_polygon_geometry() {
        let mut entity = create_test_zone_entity();
        entity.zone_type = "polygon".to_string();
        entity.geometry = json!({
            "type": "polygon",
            "vertices": [
                {"lat": 40.71, "lng": -74.01},
                {"lat": 40.72, "lng": -74.00},
                {"lat": 40.71, "lng": -73.99}
            ]
        });

        let zone: GeofenceZone = entity.try_into().unwrap();
        match zone.geometry {
            ZoneGeometry::Polygon(p) => assert_eq!(p.vertices.len(), 3),
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_zone_entity_rejects_corrupt_geometry() {
        let mut entity = create_test_zone_entity();
        entity.geometry = json!({"type": "circle", "radius": "oops"});

        let result: Result<GeofenceZone, _> = entity.try_into();
        assert!(result.is_err());
    }
}
