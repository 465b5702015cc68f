use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{devices, geofence_events, health, locations, rules, zones};

/// Per-device serialization locks for location processing. Concurrent
/// updates for the same device are applied one at a time so the membership
/// diff never races against itself; different devices proceed in parallel.
pub type DeviceLocks = Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub device_locks: DeviceLocks,
}

impl AppState {
    /// Get or create the serialization lock for a device.
    pub async fn device_lock(&self, device_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.device_locks.lock().await;
        locks
            .entry(device_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Evict a device's lock entry once no task holds it, so the map does
    /// not grow with device churn. Clones are only handed out under the
    /// map mutex, so a strong count of 1 means the map holds the sole
    /// reference.
    pub async fn release_device_lock(&self, device_id: Uuid) {
        let mut locks = self.device_locks.lock().await;
        if locks
            .get(&device_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&device_id);
        }
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        device_locks: Arc::new(Mutex::new(HashMap::new())),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Versioned API routes
    let api_routes = Router::new()
        // Zone routes (v1)
        .route("/api/v1/geofence-zones", post(zones::create_zone))
        .route("/api/v1/geofence-zones", get(zones::list_zones))
        .route("/api/v1/geofence-zones/:zone_id", get(zones::get_zone))
        .route("/api/v1/geofence-zones/:zone_id", put(zones::update_zone))
        .route("/api/v1/geofence-zones/:zone_id", delete(zones::delete_zone))
        .route(
            "/api/v1/geofence-zones/:zone_id/active",
            patch(zones::set_zone_active),
        )
        // Rule routes (v1)
        .route("/api/v1/geofence-rules", post(rules::create_rule))
        .route("/api/v1/geofence-rules/:rule_id", get(rules::get_rule))
        .route("/api/v1/geofence-rules/:rule_id", put(rules::update_rule))
        .route("/api/v1/geofence-rules/:rule_id", delete(rules::delete_rule))
        .route(
            "/api/v1/geofence-rules/:rule_id/active",
            patch(rules::set_rule_active),
        )
        .route(
            "/api/v1/geofence-rules/by-zone/:zone_id",
            get(rules::list_rules_by_zone),
        )
        .route(
            "/api/v1/geofence-rules/by-company/:company_id",
            get(rules::list_rules_by_company),
        )
        // Device routes (v1)
        .route("/api/v1/devices", post(devices::register_device))
        .route("/api/v1/devices", get(devices::list_devices))
        .route("/api/v1/devices/:device_id", get(devices::get_device))
        // Location ingestion (v1)
        .route(
            "/api/v1/devices/:device_id/location",
            post(locations::update_location),
        )
        // Event log (v1)
        .route("/api/v1/geofence-events", get(geofence_events::list_events))
        .route(
            "/api/v1/geofence-events/counts",
            get(geofence_events::event_counts),
        );

    // Public operational routes
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(trace_id))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors)
        .with_state(state)
}
