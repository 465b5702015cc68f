//! Geofence event repository.
//!
//! The events table is an append-only log; rows are only ever written by
//! the membership tracker and read back through the filtered listing and
//! aggregate queries here.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{EventTypeCountRow, GeofenceEventWithName};
use crate::metrics::QueryTimer;

/// Filters for the event log listing. All filters are optional except the
/// company scope; the cursor is the (occurred_at, id) pair of the last row
/// on the previous page.
#[derive(Debug, Clone, Default)]
pub struct EventLogQuery {
    pub zone_id: Option<Uuid>,
    pub device_id: Option<Uuid>,
    pub event_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub cursor: Option<(DateTime<Utc>, i64)>,
}

/// Helper for building the dynamic WHERE clause of the event log listing.
/// Tracks conditions and parameter positions to keep the count and list
/// queries in sync.
struct EventFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl EventFilterBuilder {
    fn build(query: &EventLogQuery) -> Self {
        let mut conditions = vec!["e.company_id = $1".to_string()];
        let mut param_count = 1;

        if query.zone_id.is_some() {
            param_count += 1;
            conditions.push(format!("e.zone_id = ${}", param_count));
        }

        if query.device_id.is_some() {
            param_count += 1;
            conditions.push(format!("e.device_id = ${}", param_count));
        }

        if query.event_type.is_some() {
            param_count += 1;
            conditions.push(format!("e.event_type = ${}", param_count));
        }

        if query.from.is_some() {
            param_count += 1;
            conditions.push(format!("e.occurred_at >= ${}", param_count));
        }

        if query.to.is_some() {
            param_count += 1;
            conditions.push(format!("e.occurred_at <= ${}", param_count));
        }

        if query.cursor.is_some() {
            // Keyset pagination: strictly older than the cursor row.
            conditions.push(format!(
                "(e.occurred_at, e.id) < (${}, ${})",
                param_count + 1,
                param_count + 2
            ));
            param_count += 2;
        }

        Self { conditions, param_count }
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Macro to bind the optional event log filters to a SQLx builder in the
/// same order EventFilterBuilder numbered them.
macro_rules! bind_event_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(zone_id) = $query.zone_id {
            b = b.bind(zone_id);
        }
        if let Some(device_id) = $query.device_id {
            b = b.bind(device_id);
        }
        if let Some(ref event_type) = $query.event_type {
            b = b.bind(event_type);
        }
        if let Some(from) = $query.from {
            b = b.bind(from);
        }
        if let Some(to) = $query.to {
            b = b.bind(to);
        }
        if let Some((occurred_at, id)) = $query.cursor {
            b = b.bind(occurred_at).bind(id);
        }
        b
    }};
}

/// Repository for geofence event operations.
#[derive(Clone)]
pub struct GeofenceEventRepository {
    pool: PgPool,
}

impl GeofenceEventRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List events for a company, newest first, filtered and cursor-paged.
    /// Fetches one row past `limit` so the caller can tell whether another
    /// page exists.
    pub async fn list(
        &self,
        company_id: Uuid,
        query: &EventLogQuery,
        limit: i64,
    ) -> Result<Vec<GeofenceEventWithName>, sqlx::Error> {
        let timer = QueryTimer::new("list_events");

        let filter = EventFilterBuilder::build(query);
        let list_query = format!(
            r#"
            SELECT
                e.id, e.event_id, e.company_id, e.device_id, e.zone_id,
                z.name as zone_name,
                e.event_type, e.occurred_at, e.latitude, e.longitude, e.created_at
            FROM geofence_events e
            LEFT JOIN geofence_zones z ON e.zone_id = z.zone_id
            WHERE {}
            ORDER BY e.occurred_at DESC, e.id DESC
            LIMIT ${}
            "#,
            filter.where_clause(),
            filter.param_count() + 1
        );

        let builder = sqlx::query_as::<_, GeofenceEventWithName>(&list_query).bind(company_id);
        let builder = bind_event_filters!(builder, query);
        let result = builder.bind(limit + 1).fetch_all(&self.pool).await;
        timer.record();
        result
    }

    /// Count events per type for a company over an optional time window.
    pub async fn count_by_type(
        &self,
        company_id: Uuid,
        zone_id: Option<Uuid>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventTypeCountRow>, sqlx::Error> {
        let timer = QueryTimer::new("count_events_by_type");
        let result = sqlx::query_as::<_, EventTypeCountRow>(
            r#"
            SELECT event_type, COUNT(*) as count
            FROM geofence_events
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR zone_id = $2)
              AND ($3::timestamptz IS NULL OR occurred_at >= $3)
              AND ($4::timestamptz IS NULL OR occurred_at <= $4)
            GROUP BY event_type
            ORDER BY event_type
            "#,
        )
        .bind(company_id)
        .bind(zone_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
