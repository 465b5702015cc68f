//! Membership diffing: classifies zones as entered, exited or dwelled by
//! comparing a device's last-known membership against the zones containing
//! its newest fix.
//!
//! Pure state-machine logic; persistence of the resulting transitions is the
//! caller's job and must move state and events together.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// A device's recorded occupancy of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipSnapshot {
    pub zone_id: Uuid,
    pub entered_at: DateTime<Utc>,
    /// Timestamp of the last ENTER or DWELL event recorded for this zone.
    pub last_event_at: DateTime<Utc>,
}

/// Classified membership transitions for one location update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    /// Zones newly containing the device: emit ENTER.
    pub entered: Vec<Uuid>,
    /// Zones no longer containing the device: emit EXIT.
    pub exited: Vec<Uuid>,
    /// Continuously occupied zones whose dwell cadence elapsed: emit DWELL.
    pub dwelled: Vec<Uuid>,
    /// Subset of `exited` that no longer exists in the zone directory at
    /// all (deleted while the device was inside). Implicit EXIT; the caller
    /// logs the inconsistency.
    pub stale: Vec<Uuid>,
}

impl MembershipDiff {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty() && self.dwelled.is_empty()
    }
}

/// Diffs the previous membership against the current containment set.
///
/// `known_zones` is the full set of zone ids that still exist for the
/// device's company; previously occupied zones missing from it are reported
/// as `stale` in addition to `exited`. `dwell_threshold` of None disables
/// DWELL emission entirely.
pub fn diff(
    previous: &[MembershipSnapshot],
    current: &HashSet<Uuid>,
    known_zones: &HashSet<Uuid>,
    now: DateTime<Utc>,
    dwell_threshold: Option<Duration>,
) -> MembershipDiff {
    let previous_ids: HashSet<Uuid> = previous.iter().map(|m| m.zone_id).collect();

    let mut result = MembershipDiff::default();

    for &zone_id in current {
        if !previous_ids.contains(&zone_id) {
            result.entered.push(zone_id);
        }
    }

    for snapshot in previous {
        if current.contains(&snapshot.zone_id) {
            if let Some(threshold) = dwell_threshold {
                if now - snapshot.last_event_at >= threshold {
                    result.dwelled.push(snapshot.zone_id);
                }
            }
        } else {
            result.exited.push(snapshot.zone_id);
            if !known_zones.contains(&snapshot.zone_id) {
                result.stale.push(snapshot.zone_id);
            }
        }
    }

    // Stable output order for deterministic event persistence
    result.entered.sort();
    result.exited.sort();
    result.dwelled.sort();
    result.stale.sort();

    result
}
