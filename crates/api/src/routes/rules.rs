//! Targeting rule endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use persistence::repositories::{RuleRepository, ZoneRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::rule::{
    CreateRuleRequest, GeofenceRule, ListRulesResponse, RuleResponse, SetRuleActiveRequest,
    UpdateRuleRequest,
};

fn rule_from_entity(entity: persistence::entities::RuleEntity) -> Result<GeofenceRule, ApiError> {
    entity
        .try_into()
        .map_err(|e: persistence::entities::rule::UnknownRuleType| ApiError::Internal(e.to_string()))
}

/// Create a new targeting rule.
///
/// POST /api/v1/geofence-rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(request): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<RuleResponse>), ApiError> {
    request.validate()?;

    // The zone must exist and belong to the same company
    let zone_repo = ZoneRepository::new(state.pool.clone());
    let zone = zone_repo
        .find_by_zone_id(request.zone_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Zone not found".to_string()))?;

    if zone.company_id != request.company_id {
        return Err(ApiError::NotFound("Zone not found".to_string()));
    }

    let rule_repo = RuleRepository::new(state.pool.clone());
    let entity = rule_repo
        .create(
            request.company_id,
            request.promotion_id,
            request.zone_id,
            request.rule_type.as_str(),
            request.priority,
            request.active,
        )
        .await?;

    let rule = rule_from_entity(entity)?;
    let response: RuleResponse = rule.into();

    info!(
        rule_id = %response.rule_id,
        promotion_id = %response.promotion_id,
        zone_id = %response.zone_id,
        rule_type = %response.rule_type,
        priority = response.priority,
        "Rule created"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a single rule by ID.
///
/// GET /api/v1/geofence-rules/:rule_id
pub async fn get_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> Result<Json<RuleResponse>, ApiError> {
    let rule_repo = RuleRepository::new(state.pool.clone());
    let entity = rule_repo
        .find_by_rule_id(rule_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Rule not found".to_string()))?;

    let rule = rule_from_entity(entity)?;
    Ok(Json(rule.into()))
}

/// List rules attached to a zone.
///
/// GET /api/v1/geofence-rules/by-zone/:zone_id
pub async fn list_rules_by_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> Result<Json<ListRulesResponse>, ApiError> {
    let rule_repo = RuleRepository::new(state.pool.clone());
    let entities = rule_repo.find_by_zone_id(zone_id).await?;

    let mut rules: Vec<RuleResponse> = Vec::with_capacity(entities.len());
    for entity in entities {
        rules.push(rule_from_entity(entity)?.into());
    }

    let total = rules.len();
    Ok(Json(ListRulesResponse { rules, total }))
}

/// List all rules for a company, inactive ones included.
///
/// GET /api/v1/geofence-rules/by-company/:company_id
pub async fn list_rules_by_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<ListRulesResponse>, ApiError> {
    let rule_repo = RuleRepository::new(state.pool.clone());
    let entities = rule_repo.find_by_company_id(company_id, true).await?;

    let mut rules: Vec<RuleResponse> = Vec::with_capacity(entities.len());
    for entity in entities {
        rules.push(rule_from_entity(entity)?.into());
    }

    let total = rules.len();
    Ok(Json(ListRulesResponse { rules, total }))
}

/// Update a rule (partial update).
///
/// PUT /api/v1/geofence-rules/:rule_id
pub async fn update_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
    Json(request): Json<UpdateRuleRequest>,
) -> Result<Json<RuleResponse>, ApiError> {
    request.validate()?;

    let rule_repo = RuleRepository::new(state.pool.clone());
    let entity = rule_repo
        .update(
            rule_id,
            request.rule_type.map(|t| t.as_str()),
            request.priority,
            request.active,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Rule not found".to_string()))?;

    let rule = rule_from_entity(entity)?;
    let response: RuleResponse = rule.into();

    info!(rule_id = %response.rule_id, "Rule updated");

    Ok(Json(response))
}

/// Toggle a rule's active flag.
///
/// PATCH /api/v1/geofence-rules/:rule_id/active
pub async fn set_rule_active(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
    Json(request): Json<SetRuleActiveRequest>,
) -> Result<Json<RuleResponse>, ApiError> {
    let rule_repo = RuleRepository::new(state.pool.clone());
    let entity = rule_repo
        .set_active(rule_id, request.active)
        .await?
        .ok_or_else(|| ApiError::NotFound("Rule not found".to_string()))?;

    let rule = rule_from_entity(entity)?;
    let response: RuleResponse = rule.into();

    info!(rule_id = %response.rule_id, active = response.active, "Rule active flag changed");

    Ok(Json(response))
}

/// Delete a rule.
///
/// DELETE /api/v1/geofence-rules/:rule_id
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let rule_repo = RuleRepository::new(state.pool.clone());
    let deleted = rule_repo.delete(rule_id).await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Rule not found".to_string()));
    }

    info!(rule_id = %rule_id, "Rule deleted");

    Ok(StatusCode::NO_CONTENT)
}
