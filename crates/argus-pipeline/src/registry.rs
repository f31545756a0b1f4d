//! Robot registry - current fleet state from telemetry

use argus_core::{now_secs, AutonomyTier, RobotState, RobotStatus};
use dashmap::DashMap;
use serde::Deserialize;
use tracing::info;

/// Partial position/motion update from a telemetry frame.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PositionUpdate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
}

/// Partial health update from a telemetry frame.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HealthUpdate {
    pub battery_percent: Option<f64>,
    pub signal_strength: Option<f64>,
}

/// The registry exclusively owns each robot's current state, including its
/// autonomy tier; the policy engine only reads it.
pub struct RobotRegistry {
    robots: DashMap<String, RobotState>,
    default_tier: AutonomyTier,
}

impl RobotRegistry {
    pub fn new(default_tier: AutonomyTier) -> Self {
        Self {
            robots: DashMap::new(),
            default_tier,
        }
    }

    pub fn register(&self, robot_id: &str, name: Option<&str>, robot_type: Option<&str>) -> RobotState {
        let mut robot = RobotState::new(robot_id);
        if let Some(n) = name {
            robot.name = n.to_string();
        }
        if let Some(t) = robot_type {
            robot.robot_type = t.to_string();
        }
        robot.status = RobotStatus::Idle;
        robot.autonomy_tier = self.default_tier;
        robot.last_seen = now_secs();
        info!("Registered robot {} ({})", robot.id, robot.robot_type);
        self.robots.insert(robot_id.to_string(), robot.clone());
        robot
    }

    pub fn get(&self, robot_id: &str) -> Option<RobotState> {
        self.robots.get(robot_id).map(|r| r.clone())
    }

    pub fn contains(&self, robot_id: &str) -> bool {
        self.robots.contains_key(robot_id)
    }

    pub fn update_position(&self, robot_id: &str, update: &PositionUpdate) -> Option<RobotState> {
        let mut robot = self.robots.get_mut(robot_id)?;
        if let Some(v) = update.latitude {
            robot.latitude = v;
        }
        if let Some(v) = update.longitude {
            robot.longitude = v;
        }
        if let Some(v) = update.altitude {
            robot.altitude = v;
        }
        if let Some(v) = update.heading {
            robot.heading = v;
        }
        if let Some(v) = update.speed {
            robot.speed = v;
        }
        robot.last_seen = now_secs();
        if robot.status == RobotStatus::Idle {
            robot.status = RobotStatus::Active;
        }
        Some(robot.clone())
    }

    pub fn update_health(&self, robot_id: &str, update: &HealthUpdate) -> Option<RobotState> {
        let mut robot = self.robots.get_mut(robot_id)?;
        if let Some(v) = update.battery_percent {
            robot.battery_percent = v;
        }
        if let Some(v) = update.signal_strength {
            robot.signal_strength = v;
        }
        robot.last_seen = now_secs();
        Some(robot.clone())
    }

    /// Set connectivity status, auto-registering unknown robots.
    pub fn update_status(&self, robot_id: &str, status: RobotStatus) -> RobotState {
        match self.robots.get_mut(robot_id) {
            Some(mut robot) => {
                robot.status = status;
                robot.last_seen = now_secs();
                robot.clone()
            }
            None => {
                let mut robot = self.register(robot_id, None, None);
                robot.status = status;
                self.robots.insert(robot_id.to_string(), robot.clone());
                robot
            }
        }
    }

    /// Replace a robot's tier. Returns the previous tier, or `None` for an
    /// unknown robot.
    pub fn set_tier(&self, robot_id: &str, tier: AutonomyTier) -> Option<AutonomyTier> {
        let mut robot = self.robots.get_mut(robot_id)?;
        let old = robot.autonomy_tier;
        robot.autonomy_tier = tier;
        Some(old)
    }

    /// Stamp the last command source/time on a robot.
    pub fn record_command(&self, robot_id: &str, source: &str, at: f64) {
        if let Some(mut robot) = self.robots.get_mut(robot_id) {
            robot.last_command_source = source.to_string();
            robot.last_command_at = at;
        }
    }

    /// Full fleet snapshot, sorted by robot id for stable iteration.
    pub fn snapshot(&self) -> Vec<RobotState> {
        let mut robots: Vec<RobotState> = self.robots.iter().map(|r| r.clone()).collect();
        robots.sort_by(|a, b| a.id.cmp(&b.id));
        robots
    }

    pub fn len(&self) -> usize {
        self.robots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    /// Seed a full snapshot directly. Intended for tests and replay tooling.
    pub fn insert(&self, robot: RobotState) {
        self.robots.insert(robot.id.clone(), robot);
    }
}
