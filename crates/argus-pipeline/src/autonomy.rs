//! Autonomy policy engine - gates automatic execution by tier and risk

use crate::registry::RobotRegistry;
use argus_core::{now_secs, short_id, Action, AutonomyChange, AutonomyTier};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::info;

/// Command types excluded from unattended auto-execution under supervised
/// tier.
pub const HIGH_RISK_COMMANDS: [&str; 6] =
    ["goto", "return_home", "take_off", "land", "dive", "surface"];

pub const SUPERVISED_COUNTDOWN_SECS: u32 = 10;

pub fn is_high_risk(command_type: &str) -> bool {
    HIGH_RISK_COMMANDS.contains(&command_type)
}

/// Fleet-wide tier summary for the API surface.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiersSummary {
    pub fleet_default: AutonomyTier,
    pub robots: BTreeMap<String, AutonomyTier>,
}

pub struct AutonomyPolicy {
    registry: Arc<RobotRegistry>,
    fleet_default: RwLock<AutonomyTier>,
    change_log: Mutex<Vec<AutonomyChange>>,
}

impl AutonomyPolicy {
    pub fn new(registry: Arc<RobotRegistry>, fleet_default: AutonomyTier) -> Self {
        Self {
            registry,
            fleet_default: RwLock::new(fleet_default),
            change_log: Mutex::new(Vec::new()),
        }
    }

    fn log(&self) -> MutexGuard<'_, Vec<AutonomyChange>> {
        self.change_log.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Decide whether a proposed action may execute without an operator, and
    /// after what countdown.
    ///
    /// Unknown robot or no action: never. Manual/assisted: never. Supervised:
    /// low-risk commands after a countdown, high-risk forced to manual
    /// review. Autonomous: immediately.
    pub fn should_auto_execute(&self, robot_id: &str, action: Option<&Action>) -> (bool, u32) {
        let Some(robot) = self.registry.get(robot_id) else {
            return (false, 0);
        };
        let Some(action) = action else {
            return (false, 0);
        };

        match robot.autonomy_tier {
            AutonomyTier::Manual | AutonomyTier::Assisted => (false, 0),
            AutonomyTier::Supervised => {
                if is_high_risk(&action.command_type) {
                    (false, 0)
                } else {
                    (true, SUPERVISED_COUNTDOWN_SECS)
                }
            }
            AutonomyTier::Autonomous => (true, 0),
        }
    }

    /// Change one robot's tier, recording the change. Returns `None` for an
    /// unknown robot or a no-op change.
    pub fn set_robot_tier(&self, robot_id: &str, tier: AutonomyTier) -> Option<AutonomyChange> {
        let old_tier = self.registry.get(robot_id)?.autonomy_tier;
        if old_tier == tier {
            return None;
        }
        self.registry.set_tier(robot_id, tier)?;
        let entry = AutonomyChange {
            id: short_id(),
            robot_id: robot_id.to_string(),
            old_tier,
            new_tier: tier,
            changed_by: "operator".to_string(),
            timestamp: now_secs(),
        };
        info!("Autonomy tier for {}: {} -> {}", robot_id, old_tier, tier);
        self.log().push(entry.clone());
        Some(entry)
    }

    /// Change the fleet-wide default tier applied to newly registered robots.
    pub fn set_fleet_default(&self, tier: AutonomyTier) -> Option<AutonomyChange> {
        let mut fleet = self
            .fleet_default
            .write()
            .unwrap_or_else(|e| e.into_inner());
        if *fleet == tier {
            return None;
        }
        let old_tier = *fleet;
        *fleet = tier;
        drop(fleet);

        let entry = AutonomyChange {
            id: short_id(),
            robot_id: "__fleet__".to_string(),
            old_tier,
            new_tier: tier,
            changed_by: "operator".to_string(),
            timestamp: now_secs(),
        };
        info!("Fleet default tier: {} -> {}", old_tier, tier);
        self.log().push(entry.clone());
        Some(entry)
    }

    pub fn fleet_default(&self) -> AutonomyTier {
        *self.fleet_default.read().unwrap_or_else(|e| e.into_inner())
    }

    /// The most recent tier changes, optionally filtered by robot.
    pub fn get_change_log(&self, robot_id: Option<&str>, limit: usize) -> Vec<AutonomyChange> {
        let log = self.log();
        let filtered: Vec<AutonomyChange> = log
            .iter()
            .filter(|e| robot_id.map_or(true, |rid| e.robot_id == rid))
            .cloned()
            .collect();
        let skip = filtered.len().saturating_sub(limit);
        filtered.into_iter().skip(skip).collect()
    }

    pub fn tiers_summary(&self) -> TiersSummary {
        TiersSummary {
            fleet_default: self.fleet_default(),
            robots: self
                .registry
                .snapshot()
                .into_iter()
                .map(|r| (r.id, r.autonomy_tier))
                .collect(),
        }
    }
}
