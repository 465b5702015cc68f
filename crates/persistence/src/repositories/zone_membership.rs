//! Device zone membership repository.
//!
//! Applies the outcome of a membership diff in a single transaction so the
//! event log and the membership table never disagree: events are inserted,
//! entered zones gain rows, exited and stale zones lose theirs, and dwelled
//! rows advance their last_event_at watermark together.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GeofenceEventEntity, ZoneMembershipEntity};
use crate::metrics::QueryTimer;

/// An event to append to the log as part of a membership update.
#[derive(Debug, Clone)]
pub struct NewEventInput {
    pub zone_id: Uuid,
    pub event_type: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Repository for device zone membership state.
#[derive(Clone)]
pub struct ZoneMembershipRepository {
    pool: PgPool,
}

impl ZoneMembershipRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the zones a device currently occupies.
    pub async fn find_by_device_id(
        &self,
        device_id: Uuid,
    ) -> Result<Vec<ZoneMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_memberships_by_device");
        let result = sqlx::query_as::<_, ZoneMembershipEntity>(
            r#"
            SELECT device_id, zone_id, entered_at, last_event_at
            FROM device_zone_memberships
            WHERE device_id = $1
            ORDER BY zone_id
            "#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Persist one location update's worth of changes atomically.
    ///
    /// Inserts the given events, creates membership rows for `entered`,
    /// deletes rows for `exited` (stale zones included), and bumps
    /// last_event_at for `dwelled`. Returns the inserted event rows in
    /// insertion order.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_update(
        &self,
        company_id: Uuid,
        device_id: Uuid,
        occurred_at: DateTime<Utc>,
        events: &[NewEventInput],
        entered: &[Uuid],
        exited: &[Uuid],
        dwelled: &[Uuid],
    ) -> Result<Vec<GeofenceEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("apply_membership_update");

        let mut tx = self.pool.begin().await?;

        let mut inserted = Vec::with_capacity(events.len());
        for event in events {
            let entity = sqlx::query_as::<_, GeofenceEventEntity>(
                r#"
                INSERT INTO geofence_events
                    (company_id, device_id, zone_id, event_type, occurred_at, latitude, longitude)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(company_id)
            .bind(device_id)
            .bind(event.zone_id)
            .bind(&event.event_type)
            .bind(occurred_at)
            .bind(event.latitude)
            .bind(event.longitude)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(entity);
        }

        if !entered.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO device_zone_memberships (device_id, zone_id, entered_at, last_event_at)
                SELECT $1, zone_id, $2, $2 FROM UNNEST($3::uuid[]) AS zone_id
                ON CONFLICT (device_id, zone_id) DO NOTHING
                "#,
            )
            .bind(device_id)
            .bind(occurred_at)
            .bind(entered)
            .execute(&mut *tx)
            .await?;
        }

        if !exited.is_empty() {
            sqlx::query(
                r#"
                DELETE FROM device_zone_memberships
                WHERE device_id = $1 AND zone_id = ANY($2)
                "#,
            )
            .bind(device_id)
            .bind(exited)
            .execute(&mut *tx)
            .await?;
        }

        if !dwelled.is_empty() {
            sqlx::query(
                r#"
                UPDATE device_zone_memberships
                SET last_event_at = $3
                WHERE device_id = $1 AND zone_id = ANY($2)
                "#,
            )
            .bind(device_id)
            .bind(dwelled)
            .bind(occurred_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(inserted)
    }
}
