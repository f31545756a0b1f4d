//! Core types for the Argus decision pipeline

use serde::{Deserialize, Serialize};

/// Alert severity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Suggestion lifecycle state. Transitions only leave `Pending`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

/// Where a suggestion came from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Heuristic,
    Judgment,
}

/// Per-robot autonomy tier. The registry owns the current tier; the policy
/// engine only reads it.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AutonomyTier {
    Manual,
    #[default]
    Assisted,
    Supervised,
    Autonomous,
}

impl AutonomyTier {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "assisted" => Some(Self::Assisted),
            "supervised" => Some(Self::Supervised),
            "autonomous" => Some(Self::Autonomous),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Assisted => "assisted",
            Self::Supervised => "supervised",
            Self::Autonomous => "autonomous",
        }
    }
}

impl std::fmt::Display for AutonomyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete command proposal attached to an alert or suggestion.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub command_type: String,
    pub robot_id: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

impl Action {
    pub fn new(command_type: impl Into<String>, robot_id: impl Into<String>) -> Self {
        Self {
            command_type: command_type.into(),
            robot_id: robot_id.into(),
            parameters: serde_json::Map::new(),
        }
    }
}

/// Ephemeral output of a heuristic rule. Never persisted; either converted
/// directly into a suggestion or queued for advisor escalation.
#[derive(Clone, Debug)]
pub struct Alert {
    pub robot_id: String,
    pub alert_type: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub reasoning: String,
    pub requires_judgment: bool,
    pub proposed_action: Option<Action>,
}

/// A persisted, lifecycle-managed recommendation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub robot_id: String,
    pub title: String,
    pub description: String,
    pub reasoning: String,
    pub severity: Severity,
    pub proposed_action: Option<Action>,
    pub confidence: f64,
    pub status: SuggestionStatus,
    pub source: SuggestionSource,
    pub created_at: f64,
    /// 0.0 means never-expiring
    pub expires_at: f64,
}

impl Suggestion {
    pub fn is_expired(&self, now: f64) -> bool {
        self.expires_at > 0.0 && now > self.expires_at
    }
}

/// Robot connectivity/activity state
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RobotStatus {
    #[default]
    Offline,
    Idle,
    Active,
}

/// Current snapshot of one robot, as maintained by the registry from
/// telemetry updates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotState {
    pub id: String,
    pub name: String,
    pub robot_type: String,
    pub status: RobotStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub heading: f64,
    pub speed: f64,
    pub battery_percent: f64,
    pub signal_strength: f64,
    pub last_seen: f64,
    pub autonomy_tier: AutonomyTier,
    pub last_command_source: String,
    pub last_command_at: f64,
}

impl RobotState {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            robot_type: "drone".to_string(),
            status: RobotStatus::Offline,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            heading: 0.0,
            speed: 0.0,
            battery_percent: 100.0,
            signal_strength: 100.0,
            last_seen: 0.0,
            autonomy_tier: AutonomyTier::default(),
            last_command_source: String::new(),
            last_command_at: 0.0,
        }
    }
}

/// Command dispatch status
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Pending,
    Sent,
    Acknowledged,
    Completed,
    Failed,
}

impl CommandStatus {
    /// Terminal commands never go back to the wire.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A command issued to a robot.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: String,
    pub robot_id: String,
    pub command_type: String,
    pub parameters: serde_json::Map<String, serde_json::Value>,
    pub source: String,
    pub status: CommandStatus,
    pub created_at: f64,
    pub updated_at: f64,
}

/// One autonomy tier change, for the audit log. `robot_id` is `__fleet__`
/// for fleet-wide default changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutonomyChange {
    pub id: String,
    pub robot_id: String,
    pub old_tier: AutonomyTier,
    pub new_tier: AutonomyTier,
    pub changed_by: String,
    pub timestamp: f64,
}

/// Event envelope fanned out to connected observers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: serde_json::Value,
    pub timestamp: String,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Event type for suggestion broadcasts
pub const EVENT_SUGGESTION: &str = "ai.suggestion";
/// Event type for auto-execution countdown notices
pub const EVENT_COUNTDOWN: &str = "autonomy.countdown";
