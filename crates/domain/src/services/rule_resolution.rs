//! Rule resolver: turns the rules attached to a device's occupied zones into
//! per-promotion targeting decisions.
//!
//! Within each promotion the highest-priority rule wins; exact priority ties
//! break on the lowest rule row id so repeated calls always produce the same
//! map. A winning `hide_outside` rule constrains devices *outside* its zone,
//! and every zone considered here is occupied, so it simply does not fire —
//! the promotion is omitted and the caller applies its own baseline.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use uuid::Uuid;

use crate::models::rule::{Decision, GeofenceRule, RuleType};

/// Resolves targeting decisions for the given rules, which must already be
/// scoped to the device's currently occupied zones.
///
/// Promotions with no active in-scope rules are absent from the result.
/// An empty rule slice yields an empty map.
pub fn resolve(rules: &[GeofenceRule]) -> HashMap<Uuid, Decision> {
    let mut winners: HashMap<Uuid, &GeofenceRule> = HashMap::new();

    for rule in rules.iter().filter(|r| r.active) {
        match winners.entry(rule.promotion_id) {
            Entry::Vacant(e) => {
                e.insert(rule);
            }
            Entry::Occupied(mut e) => {
                if beats(rule, e.get()) {
                    e.insert(rule);
                }
            }
        }
    }

    winners
        .into_iter()
        .filter_map(|(promotion_id, rule)| {
            decision_for(rule.rule_type).map(|d| (promotion_id, d))
        })
        .collect()
}

/// Winner ordering: higher priority first, then lower row id.
fn beats(candidate: &GeofenceRule, incumbent: &GeofenceRule) -> bool {
    candidate.priority > incumbent.priority
        || (candidate.priority == incumbent.priority && candidate.id < incumbent.id)
}

/// Maps a winning rule type to the decision it produces for an inside
/// device, or None when the rule does not fire.
fn decision_for(rule_type: RuleType) -> Option<Decision> {
    match rule_type {
        RuleType::ShowInside => Some(Decision::Show),
        RuleType::HideOutside => None,
    }
}
