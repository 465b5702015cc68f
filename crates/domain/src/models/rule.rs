//! Geofence rule domain model.
//!
//! A rule links one promotion to one zone with a priority and a rule type.
//! Rules never own the zone or the promotion; deactivation is a soft flag so
//! past events keep a valid audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Supported rule types. Closed enum: adding a variant forces every
/// resolution match to be revisited at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    ShowInside,
    HideOutside,
}

impl RuleType {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::ShowInside => "show_inside",
            RuleType::HideOutside => "hide_outside",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "show_inside" => Some(RuleType::ShowInside),
            "hide_outside" => Some(RuleType::HideOutside),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Targeting decision for a promotion at the device's current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Show,
    Hide,
}

/// A resolved (promotion, decision) pair returned to the display service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingDecision {
    pub promotion_id: Uuid,
    pub decision: Decision,
}

/// Represents a geofence rule in the system.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceRule {
    pub id: i64,
    pub rule_id: Uuid,
    pub company_id: Uuid,
    pub promotion_id: Uuid,
    pub zone_id: Uuid,
    pub rule_type: RuleType,
    pub priority: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default active status for new rules.
fn default_active() -> bool {
    true
}

/// Request payload for creating a rule.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleRequest {
    pub company_id: Uuid,
    pub promotion_id: Uuid,
    pub zone_id: Uuid,
    pub rule_type: RuleType,

    #[validate(range(min = 0, max = 10000, message = "Priority must be between 0 and 10000"))]
    pub priority: i32,

    #[serde(default = "default_active")]
    pub active: bool,
}

/// Request payload for updating a rule (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleRequest {
    pub rule_type: Option<RuleType>,

    #[validate(range(min = 0, max = 10000, message = "Priority must be between 0 and 10000"))]
    pub priority: Option<i32>,

    pub active: Option<bool>,
}

/// Request payload for toggling a rule's active flag.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRuleActiveRequest {
    pub active: bool,
}

/// Response payload for rule operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResponse {
    pub rule_id: Uuid,
    pub company_id: Uuid,
    pub promotion_id: Uuid,
    pub zone_id: Uuid,
    pub rule_type: RuleType,
    pub priority: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GeofenceRule> for RuleResponse {
    fn from(r: GeofenceRule) -> Self {
        Self {
            rule_id: r.rule_id,
            company_id: r.company_id,
            promotion_id: r.promotion_id,
            zone_id: r.zone_id,
            rule_type: r.rule_type,
            priority: r.priority,
            active: r.active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Response for listing rules.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRulesResponse {
    pub rules: Vec<RuleResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_type_serialization() {
        assert_eq!(
            serde_json::to_string(&RuleType::ShowInside).unwrap(),
            "\"show_inside\""
        );
        assert_eq!(
            serde_json::to_string(&RuleType::HideOutside).unwrap(),
            "\"hide_outside\""
        );
    }

    #[test]
    fn test_rule_type_parse() {
        assert_eq!(RuleType::parse("show_inside"), Some(RuleType::ShowInside));
        assert_eq!(RuleType::parse("hide_outside"), Some(RuleType::HideOutside));
        assert_eq!(RuleType::parse("unknown"), None);
    }

    #[test]
    fn test_decision_serialization() {
        assert_eq!(serde_json::to_string(&Decision::Show).unwrap(), "\"show\"");
        assert_eq!(serde_json::to_string(&Decision::Hide).unwrap(), "\"hide\"");
    }

    #[test]
    fn test_create_rule_request_defaults() {
        let json = r#"{
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "promotionId": "550e8400-e29b-41d4-a716-446655440001",
            "zoneId": "550e8400-e29b-41d4-a716-446655440002",
            "ruleType": "show_inside",
            "priority": 10
        }"#;

        let request: CreateRuleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.rule_type, RuleType::ShowInside);
        assert_eq!(request.priority, 10);
        assert!(request.active);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_rule_request_priority_out_of_range() {
        let json = r#"{
            "companyId": "550e8400-e29b-41d4-a716-446655440000",
            "promotionId": "550e8400-e29b-41d4-a716-446655440001",
            "zoneId": "550e8400-e29b-41d4-a716-446655440002",
            "ruleType": "show_inside",
            "priority": "high"
        }"#;
        // Non-numeric priority must not deserialize at all
        assert!(serde_json::from_str::<CreateRuleRequest>(json).is_err());

        let request = CreateRuleRequest {
            company_id: Uuid::new_v4(),
            promotion_id: Uuid::new_v4(),
            zone_id: Uuid::new_v4(),
            rule_type: RuleType::ShowInside,
            priority: 20000,
            active: true,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_rule_request_partial() {
        let json = r#"{"priority": 5}"#;
        let request: UpdateRuleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.priority, Some(5));
        assert!(request.rule_type.is_none());
        assert!(request.active.is_none());
    }

    #[test]
    fn test_targeting_decision_serialization() {
        let decision = TargetingDecision {
            promotion_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            decision: Decision::Show,
        };
        let json = serde_json::to_string(&decision).unwrap();
        assert!(json.contains("\"promotionId\""));
        assert!(json.contains("\"decision\":\"show\""));
    }
}
