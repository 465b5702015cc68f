//! Device repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::DeviceEntity;
use crate::metrics::QueryTimer;

/// Repository for device-related database operations.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new device for a company.
    pub async fn create(&self, company_id: Uuid, name: &str) -> Result<DeviceEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_device");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            INSERT INTO devices (company_id, name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a device by UUID.
    pub async fn find_by_device_id(
        &self,
        device_id: Uuid,
    ) -> Result<Option<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_device_by_id");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT * FROM devices WHERE device_id = $1
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find all devices for a company.
    pub async fn find_by_company_id(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_devices_by_company");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT * FROM devices
            WHERE company_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update a device's last_seen_at timestamp.
    pub async fn update_last_seen_at(
        &self,
        device_id: Uuid,
        seen_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_device_last_seen");
        let result = sqlx::query(
            r#"
            UPDATE devices SET last_seen_at = $2, updated_at = NOW()
            WHERE device_id = $1
            "#,
        )
        .bind(device_id)
        .bind(seen_at)
        .execute(&self.pool)
        .await
        .map(|_| ());
        timer.record();
        result
    }
}
