//! Targeting engine: turns a device location fix into geofence events and
//! targeting decisions.
//!
//! Processing for one device is serialized through a per-device lock; the
//! membership diff reads current state and writes the outcome, so two
//! interleaved fixes for the same device would otherwise double-emit
//! ENTER/EXIT events. Different devices proceed in parallel.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

use domain::models::location::{LocationUpdateRequest, LocationUpdateResponse};
use domain::models::rule::TargetingDecision;
use domain::models::zone::GeofenceZone;
use domain::models::{GeofenceEvent, GeofenceEventType, GeofenceRule};
use domain::services::{geometry, membership, rule_resolution};
use persistence::repositories::{
    DeviceRepository, NewEventInput, RuleRepository, ZoneMembershipRepository, ZoneRepository,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{
    record_geofence_events_emitted, record_location_update_processed,
};

/// Process one location fix for a device.
///
/// Resolves the device, evaluates containment against the company's active
/// zones, diffs against stored membership, persists events and membership
/// atomically, and resolves targeting decisions for the zones now occupied.
pub async fn process_location_update(
    state: &AppState,
    device_id: Uuid,
    request: &LocationUpdateRequest,
) -> Result<LocationUpdateResponse, ApiError> {
    // Serialize concurrent fixes for the same device
    let lock = state.device_lock(device_id).await;
    let guard = lock.lock().await;

    let result = apply_location_update(state, device_id, request).await;

    // Release our handle before eviction so an idle device's entry can go
    drop(guard);
    drop(lock);
    state.release_device_lock(device_id).await;

    result
}

async fn apply_location_update(
    state: &AppState,
    device_id: Uuid,
    request: &LocationUpdateRequest,
) -> Result<LocationUpdateResponse, ApiError> {
    let device_repo = DeviceRepository::new(state.pool.clone());
    let device = device_repo
        .find_by_device_id(device_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;

    if !device.active {
        return Err(ApiError::NotFound("Device not found".to_string()));
    }

    let occurred_at = match request.timestamp {
        Some(millis) => DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| ApiError::Validation(format!("Timestamp out of range: {}", millis)))?,
        None => Utc::now(),
    };

    // All zones that still exist, active or not. Containment only ever
    // evaluates the active subset; the full id set distinguishes a merely
    // deactivated zone from a deleted one in the membership diff.
    let zone_repo = ZoneRepository::new(state.pool.clone());
    let zone_entities = zone_repo.find_by_company_id(device.company_id, true).await?;

    let known_zones: HashSet<Uuid> = zone_entities.iter().map(|z| z.zone_id).collect();

    let mut occupied: HashSet<Uuid> = HashSet::new();
    for entity in zone_entities.into_iter().filter(|z| z.active) {
        let zone: GeofenceZone = entity.try_into()?;
        if geometry::contains(&zone.geometry, request.latitude, request.longitude) {
            occupied.insert(zone.zone_id);
        }
    }

    // Diff against the stored membership
    let membership_repo = ZoneMembershipRepository::new(state.pool.clone());
    let previous: Vec<membership::MembershipSnapshot> = membership_repo
        .find_by_device_id(device_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let diff = membership::diff(
        &previous,
        &occupied,
        &known_zones,
        occurred_at,
        state.config.dwell_threshold(),
    );

    for zone_id in &diff.stale {
        warn!(
            device_id = %device_id,
            zone_id = %zone_id,
            "Membership referenced a deleted zone; emitting implicit EXIT"
        );
    }

    // Assemble the events this fix emits
    let mut events: Vec<NewEventInput> = Vec::new();
    for &zone_id in &diff.entered {
        events.push(new_event(zone_id, GeofenceEventType::Enter, request));
    }
    for &zone_id in &diff.exited {
        events.push(new_event(zone_id, GeofenceEventType::Exit, request));
    }
    for &zone_id in &diff.dwelled {
        events.push(new_event(zone_id, GeofenceEventType::Dwell, request));
    }

    let inserted = if diff.is_empty() {
        Vec::new()
    } else {
        membership_repo
            .apply_update(
                device.company_id,
                device_id,
                occurred_at,
                &events,
                &diff.entered,
                &diff.exited,
                &diff.dwelled,
            )
            .await?
    };

    record_location_update_processed();
    record_geofence_events_emitted("enter", diff.entered.len());
    record_geofence_events_emitted("exit", diff.exited.len());
    record_geofence_events_emitted("dwell", diff.dwelled.len());

    // Resolve decisions for the zones now occupied
    let mut occupied_ids: Vec<Uuid> = occupied.into_iter().collect();
    occupied_ids.sort();

    let rule_repo = RuleRepository::new(state.pool.clone());
    let rule_entities = rule_repo.find_active_by_zone_ids(&occupied_ids).await?;

    let mut rules: Vec<GeofenceRule> = Vec::with_capacity(rule_entities.len());
    for entity in rule_entities {
        let rule = entity
            .try_into()
            .map_err(|e: persistence::entities::rule::UnknownRuleType| {
                ApiError::Internal(e.to_string())
            })?;
        rules.push(rule);
    }

    let resolved = rule_resolution::resolve(&rules);
    let mut decisions: Vec<TargetingDecision> = resolved
        .into_iter()
        .map(|(promotion_id, decision)| TargetingDecision {
            promotion_id,
            decision,
        })
        .collect();
    decisions.sort_by_key(|d| d.promotion_id);

    // Touch the device's last-seen watermark off the request path
    let pool = state.pool.clone();
    tokio::spawn(async move {
        let repo = DeviceRepository::new(pool);
        if let Err(e) = repo.update_last_seen_at(device_id, Utc::now()).await {
            warn!(device_id = %device_id, error = %e, "Failed to update last_seen_at");
        }
    });

    let mut event_responses = Vec::with_capacity(inserted.len());
    for entity in inserted {
        let event: GeofenceEvent = entity
            .try_into()
            .map_err(|e: persistence::entities::UnknownEventType| {
                ApiError::Internal(e.to_string())
            })?;
        event_responses.push(event.into());
    }

    Ok(LocationUpdateResponse {
        events: event_responses,
        decisions,
    })
}

fn new_event(
    zone_id: Uuid,
    event_type: GeofenceEventType,
    request: &LocationUpdateRequest,
) -> NewEventInput {
    NewEventInput {
        zone_id,
        event_type: event_type.as_str().to_string(),
        latitude: request.latitude,
        longitude: request.longitude,
    }
}
