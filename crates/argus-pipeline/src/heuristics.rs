//! Rule-based checks on telemetry. Fast, no advisor calls.

use argus_core::{now_secs, Action, Alert, RobotState, RobotStatus, Severity};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

pub const COOLDOWN_SECS: f64 = 300.0;
pub const BATTERY_CRITICAL_PCT: f64 = 15.0;
pub const BATTERY_WARNING_PCT: f64 = 30.0;
pub const SIGNAL_LOW_PCT: f64 = 30.0;
pub const SPEED_ANOMALY_MPS: f64 = 20.0;
pub const PROXIMITY_THRESHOLD_M: f64 = 15.0;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two lat/lon points, in meters.
pub fn haversine_m(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let dlat = (lat_b - lat_a).to_radians();
    let dlon = (lon_b - lon_a).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat_a.to_radians().cos() * lat_b.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_M * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Heuristic rule engine with per-(robot, alert type) cooldowns.
///
/// The cooldown check is also the commit: a true condition plus a true check
/// stamps the cooldown in the same step, and evaluating a false condition
/// never touches the cooldown map.
pub struct HeuristicAnalyzer {
    cooldowns: DashMap<(String, String), f64>,
    cooldown_secs: f64,
}

impl Default for HeuristicAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicAnalyzer {
    pub fn new() -> Self {
        Self::with_cooldown(COOLDOWN_SECS)
    }

    pub fn with_cooldown(cooldown_secs: f64) -> Self {
        Self {
            cooldowns: DashMap::new(),
            cooldown_secs,
        }
    }

    /// Returns true (and stamps the cooldown) if this alert type has not
    /// fired for this robot within the window. A false return never updates
    /// the map.
    fn should_fire_at(&self, robot_id: &str, alert_type: &str, now: f64) -> bool {
        match self
            .cooldowns
            .entry((robot_id.to_string(), alert_type.to_string()))
        {
            Entry::Occupied(mut e) => {
                if now - *e.get() < self.cooldown_secs {
                    false
                } else {
                    *e.get_mut() = now;
                    true
                }
            }
            Entry::Vacant(v) => {
                v.insert(now);
                true
            }
        }
    }

    pub fn analyze(&self, robot: &RobotState) -> Vec<Alert> {
        self.analyze_at(robot, now_secs())
    }

    pub fn analyze_at(&self, robot: &RobotState, now: f64) -> Vec<Alert> {
        let mut alerts = Vec::new();

        // Battery: critical and warning are mutually exclusive by construction
        if robot.battery_percent < BATTERY_CRITICAL_PCT {
            if self.should_fire_at(&robot.id, "battery_critical", now) {
                alerts.push(Alert {
                    robot_id: robot.id.clone(),
                    alert_type: "battery_critical".to_string(),
                    severity: Severity::Critical,
                    title: "Critical Battery Level".to_string(),
                    description: format!(
                        "{} battery at {:.0}%. Immediate return recommended.",
                        robot.name, robot.battery_percent
                    ),
                    reasoning: format!(
                        "Battery below {:.0}% threshold ({:.0}%). Risk of power loss.",
                        BATTERY_CRITICAL_PCT, robot.battery_percent
                    ),
                    requires_judgment: false,
                    proposed_action: Some(Action::new("return_home", &robot.id)),
                });
            }
        } else if robot.battery_percent < BATTERY_WARNING_PCT
            && self.should_fire_at(&robot.id, "battery_warning", now)
        {
            alerts.push(Alert {
                robot_id: robot.id.clone(),
                alert_type: "battery_warning".to_string(),
                severity: Severity::Warning,
                title: "Low Battery Warning".to_string(),
                description: format!("{} battery at {:.0}%.", robot.name, robot.battery_percent),
                reasoning: format!(
                    "Battery below {:.0}% threshold ({:.0}%). Consider returning.",
                    BATTERY_WARNING_PCT, robot.battery_percent
                ),
                requires_judgment: true,
                proposed_action: None,
            });
        }

        // Signal degradation
        if robot.signal_strength < SIGNAL_LOW_PCT && self.should_fire_at(&robot.id, "signal_low", now)
        {
            alerts.push(Alert {
                robot_id: robot.id.clone(),
                alert_type: "signal_low".to_string(),
                severity: Severity::Warning,
                title: "Weak Signal".to_string(),
                description: format!(
                    "{} signal strength at {:.0}%.",
                    robot.name, robot.signal_strength
                ),
                reasoning: format!(
                    "Signal below {:.0}% ({:.0}%). Communication may be unreliable.",
                    SIGNAL_LOW_PCT, robot.signal_strength
                ),
                requires_judgment: true,
                proposed_action: None,
            });
        }

        // Speed anomaly
        if robot.speed > SPEED_ANOMALY_MPS && self.should_fire_at(&robot.id, "speed_anomaly", now) {
            alerts.push(Alert {
                robot_id: robot.id.clone(),
                alert_type: "speed_anomaly".to_string(),
                severity: Severity::Warning,
                title: "High Speed Alert".to_string(),
                description: format!("{} moving at {:.1} m/s.", robot.name, robot.speed),
                reasoning: format!(
                    "Speed exceeds {:.0} m/s threshold. Verify intended behavior.",
                    SPEED_ANOMALY_MPS
                ),
                requires_judgment: true,
                proposed_action: None,
            });
        }

        alerts
    }

    /// Check every unordered pair of non-offline robots for dangerous
    /// proximity. The cooldown is keyed by the first-iterated robot id plus
    /// the other robot's id; robots are sorted by id first so the firing side
    /// is stable across runs.
    pub fn check_proximity(&self, robots: &[RobotState]) -> Vec<Alert> {
        self.check_proximity_at(robots, PROXIMITY_THRESHOLD_M, now_secs())
    }

    pub fn check_proximity_at(
        &self,
        robots: &[RobotState],
        threshold_m: f64,
        now: f64,
    ) -> Vec<Alert> {
        let mut sorted: Vec<&RobotState> = robots.iter().collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let mut alerts = Vec::new();
        for (i, ra) in sorted.iter().enumerate() {
            for rb in &sorted[i + 1..] {
                if ra.status == RobotStatus::Offline || rb.status == RobotStatus::Offline {
                    continue;
                }
                let dist = haversine_m(ra.latitude, ra.longitude, rb.latitude, rb.longitude);
                if dist < threshold_m
                    && self.should_fire_at(&ra.id, &format!("proximity_{}", rb.id), now)
                {
                    alerts.push(Alert {
                        robot_id: ra.id.clone(),
                        alert_type: "proximity".to_string(),
                        severity: Severity::Warning,
                        title: "Proximity Alert".to_string(),
                        description: format!("{} and {} are {:.0}m apart.", ra.name, rb.name, dist),
                        reasoning: format!(
                            "Distance ({:.0}m) below {:.0}m safety threshold.",
                            dist, threshold_m
                        ),
                        requires_judgment: true,
                        proposed_action: None,
                    });
                }
            }
        }

        alerts
    }
}
