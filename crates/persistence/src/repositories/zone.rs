//! Geofence zone repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ZoneEntity;
use crate::metrics::QueryTimer;

/// Repository for geofence-zone database operations.
#[derive(Clone)]
pub struct ZoneRepository {
    pool: PgPool,
}

impl ZoneRepository {
    /// Creates a new ZoneRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new zone.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        company_id: Uuid,
        name: &str,
        zone_type: &str,
        geometry: serde_json::Value,
        active: bool,
        color: Option<&str>,
        metadata: Option<serde_json::Value>,
    ) -> Result<ZoneEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_zone");
        let result = sqlx::query_as::<_, ZoneEntity>(
            r#"
            INSERT INTO geofence_zones (company_id, name, zone_type, geometry, active, color, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(zone_type)
        .bind(geometry)
        .bind(active)
        .bind(color)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a zone by UUID.
    pub async fn find_by_zone_id(&self, zone_id: Uuid) -> Result<Option<ZoneEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_zone_by_id");
        let result = sqlx::query_as::<_, ZoneEntity>(
            r#"
            SELECT * FROM geofence_zones WHERE zone_id = $1
            "#,
        )
        .bind(zone_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find all zones for a company.
    pub async fn find_by_company_id(
        &self,
        company_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<ZoneEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_zones_by_company");
        let result = if include_inactive {
            sqlx::query_as::<_, ZoneEntity>(
                r#"
                SELECT * FROM geofence_zones
                WHERE company_id = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(company_id)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, ZoneEntity>(
                r#"
                SELECT * FROM geofence_zones
                WHERE company_id = $1 AND active = true
                ORDER BY created_at DESC
                "#,
            )
            .bind(company_id)
            .fetch_all(&self.pool)
            .await
        };
        timer.record();
        result
    }

    /// Check whether a zone name is already taken within a company.
    /// The comparison is case-sensitive; an existing zone may be excluded
    /// so updates do not collide with themselves.
    pub async fn exists_by_name(
        &self,
        company_id: Uuid,
        name: &str,
        exclude_zone_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("zone_exists_by_name");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM geofence_zones
            WHERE company_id = $1 AND name = $2
              AND ($3::uuid IS NULL OR zone_id <> $3)
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(exclude_zone_id)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0 > 0)
    }

    /// Update a zone (partial update).
    /// Only provided fields are updated; None values are preserved.
    /// The geometry and its type discriminant always change together.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        zone_id: Uuid,
        name: Option<&str>,
        zone_type: Option<&str>,
        geometry: Option<serde_json::Value>,
        active: Option<bool>,
        color: Option<&str>,
        metadata: Option<serde_json::Value>,
    ) -> Result<Option<ZoneEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_zone");
        let result = sqlx::query_as::<_, ZoneEntity>(
            r#"
            UPDATE geofence_zones SET
                name = COALESCE($2, name),
                zone_type = COALESCE($3, zone_type),
                geometry = COALESCE($4, geometry),
                active = COALESCE($5, active),
                color = COALESCE($6, color),
                metadata = COALESCE($7, metadata),
                updated_at = NOW()
            WHERE zone_id = $1
            RETURNING *
            "#,
        )
        .bind(zone_id)
        .bind(name)
        .bind(zone_type)
        .bind(geometry)
        .bind(active)
        .bind(color)
        .bind(metadata)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Toggle the active flag. Takes effect for the very next containment
    /// query; there is no caching layer in between.
    pub async fn set_active(
        &self,
        zone_id: Uuid,
        active: bool,
    ) -> Result<Option<ZoneEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_zone_active");
        let result = sqlx::query_as::<_, ZoneEntity>(
            r#"
            UPDATE geofence_zones SET active = $2, updated_at = NOW()
            WHERE zone_id = $1
            RETURNING *
            "#,
        )
        .bind(zone_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a zone. Returns the number of rows deleted (0 or 1).
    /// Already-recorded events keep their zone id; only the zone row goes.
    pub async fn delete(&self, zone_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_zone");
        let result = sqlx::query(
            r#"
            DELETE FROM geofence_zones WHERE zone_id = $1
            "#,
        )
        .bind(zone_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
