//! Targeting rule repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::RuleEntity;
use crate::metrics::QueryTimer;

/// Repository for targeting-rule database operations.
#[derive(Clone)]
pub struct RuleRepository {
    pool: PgPool,
}

impl RuleRepository {
    /// Creates a new RuleRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new targeting rule.
    pub async fn create(
        &self,
        company_id: Uuid,
        promotion_id: Uuid,
        zone_id: Uuid,
        rule_type: &str,
        priority: i32,
        active: bool,
    ) -> Result<RuleEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_rule");
        let result = sqlx::query_as::<_, RuleEntity>(
            r#"
            INSERT INTO geofence_rules (company_id, promotion_id, zone_id, rule_type, priority, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(promotion_id)
        .bind(zone_id)
        .bind(rule_type)
        .bind(priority)
        .bind(active)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a rule by UUID.
    pub async fn find_by_rule_id(&self, rule_id: Uuid) -> Result<Option<RuleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_rule_by_id");
        let result = sqlx::query_as::<_, RuleEntity>(
            r#"
            SELECT * FROM geofence_rules WHERE rule_id = $1
            "#,
        )
        .bind(rule_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find all rules attached to a zone.
    pub async fn find_by_zone_id(&self, zone_id: Uuid) -> Result<Vec<RuleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_rules_by_zone");
        let result = sqlx::query_as::<_, RuleEntity>(
            r#"
            SELECT * FROM geofence_rules
            WHERE zone_id = $1
            ORDER BY priority DESC, id ASC
            "#,
        )
        .bind(zone_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find all rules for a company.
    pub async fn find_by_company_id(
        &self,
        company_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<RuleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_rules_by_company");
        let result = if include_inactive {
            sqlx::query_as::<_, RuleEntity>(
                r#"
                SELECT * FROM geofence_rules
                WHERE company_id = $1
                ORDER BY priority DESC, id ASC
                "#,
            )
            .bind(company_id)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, RuleEntity>(
                r#"
                SELECT * FROM geofence_rules
                WHERE company_id = $1 AND active = true
                ORDER BY priority DESC, id ASC
                "#,
            )
            .bind(company_id)
            .fetch_all(&self.pool)
            .await
        };
        timer.record();
        result
    }

    /// Find the active rules attached to any of the given zones.
    /// This is the rule set fed into decision resolution for a device
    /// occupying those zones.
    pub async fn find_active_by_zone_ids(
        &self,
        zone_ids: &[Uuid],
    ) -> Result<Vec<RuleEntity>, sqlx::Error> {
        if zone_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("find_active_rules_by_zones");
        let result = sqlx::query_as::<_, RuleEntity>(
            r#"
            SELECT * FROM geofence_rules
            WHERE zone_id = ANY($1) AND active = true
            ORDER BY priority DESC, id ASC
            "#,
        )
        .bind(zone_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update a rule (partial update). The rule's zone binding is fixed at
    /// creation; retargeting means deleting and recreating the rule.
    pub async fn update(
        &self,
        rule_id: Uuid,
        rule_type: Option<&str>,
        priority: Option<i32>,
        active: Option<bool>,
    ) -> Result<Option<RuleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_rule");
        let result = sqlx::query_as::<_, RuleEntity>(
            r#"
            UPDATE geofence_rules SET
                rule_type = COALESCE($2, rule_type),
                priority = COALESCE($3, priority),
                active = COALESCE($4, active),
                updated_at = NOW()
            WHERE rule_id = $1
            RETURNING *
            "#,
        )
        .bind(rule_id)
        .bind(rule_type)
        .bind(priority)
        .bind(active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Toggle the active flag on a rule.
    pub async fn set_active(
        &self,
        rule_id: Uuid,
        active: bool,
    ) -> Result<Option<RuleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_rule_active");
        let result = sqlx::query_as::<_, RuleEntity>(
            r#"
            UPDATE geofence_rules SET active = $2, updated_at = NOW()
            WHERE rule_id = $1
            RETURNING *
            "#,
        )
        .bind(rule_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a rule. Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, rule_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_rule");
        let result = sqlx::query(
            r#"
            DELETE FROM geofence_rules WHERE rule_id = $1
            "#,
        )
        .bind(rule_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
