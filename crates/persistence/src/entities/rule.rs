//! Geofence rule entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use domain::models::{GeofenceRule, RuleType};

/// Database row mapping for the geofence_rules table.
#[derive(Debug, Clone, FromRow)]
pub struct RuleEntity {
    pub id: i64,
    pub rule_id: Uuid,
    pub company_id: Uuid,
    pub promotion_id: Uuid,
    pub zone_id: Uuid,
    pub rule_type: String,
    pub priority: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored rule type string no longer matches the closed enum.
#[derive(Debug, Error)]
#[error("Unknown rule type in database: {0}")]
pub struct UnknownRuleType(pub String);

impl TryFrom<RuleEntity> for GeofenceRule {
    type Error = UnknownRuleType;

    fn try_from(entity: RuleEntity) -> Result<Self, Self::Error> {
        let rule_type = RuleType::parse(&entity.rule_type)
            .ok_or_else(|| UnknownRuleType(entity.rule_type.clone()))?;
        Ok(Self {
            id: entity.id,
            rule_id: entity.rule_id,
            company_id: entity.company_id,
            promotion_id: entity.promotion_id,
            zone_id: entity.zone_id,
            rule_type,
            priority: entity.priority,
            active: entity.active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
