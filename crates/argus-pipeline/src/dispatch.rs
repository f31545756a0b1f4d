//! Dispatch coordinator - carries out the autonomy policy's decision
//!
//! A freshly created suggestion is either executed immediately, scheduled for
//! a countdown execution, or broadcast as a pure notification awaiting manual
//! approve/reject.

use crate::autonomy::AutonomyPolicy;
use crate::ledger::SuggestionLedger;
use crate::outbound::{CommandGateway, EventSink, TransportPublisher};
use crate::registry::RobotRegistry;
use argus_core::{
    now_secs, AutonomyTier, CommandStatus, Envelope, Suggestion, SuggestionStatus,
    EVENT_COUNTDOWN, EVENT_SUGGESTION,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Source label stamped on auto-executed commands and robots.
const AUTO_SOURCE: &str = "judgment";

pub struct Dispatcher {
    ledger: Arc<SuggestionLedger>,
    registry: Arc<RobotRegistry>,
    policy: Arc<AutonomyPolicy>,
    commands: Arc<dyn CommandGateway>,
    transport: Arc<dyn TransportPublisher>,
    events: Arc<dyn EventSink>,
}

impl Dispatcher {
    pub fn new(
        ledger: Arc<SuggestionLedger>,
        registry: Arc<RobotRegistry>,
        policy: Arc<AutonomyPolicy>,
        commands: Arc<dyn CommandGateway>,
        transport: Arc<dyn TransportPublisher>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            ledger,
            registry,
            policy,
            commands,
            transport,
            events,
        }
    }

    /// Route a freshly created suggestion according to the robot's tier.
    pub async fn dispatch(self: &Arc<Self>, suggestion: Suggestion) {
        let tier = self
            .registry
            .get(&suggestion.robot_id)
            .map(|r| r.autonomy_tier)
            .unwrap_or_default();

        // Manual-tier operators only ever see the advisory text.
        let mut outward = suggestion;
        if tier == AutonomyTier::Manual {
            outward.proposed_action = None;
        }

        let (execute, countdown) = self
            .policy
            .should_auto_execute(&outward.robot_id, outward.proposed_action.as_ref());

        if execute && countdown > 0 {
            let auto_execute_at = now_secs() + countdown as f64;

            let mut payload = match serde_json::to_value(&outward) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Failed to serialize suggestion {}: {}", outward.id, e);
                    return;
                }
            };
            payload["autoExecuteAt"] = json!(auto_execute_at);
            self.events
                .broadcast(Envelope::new(EVENT_SUGGESTION, payload));
            self.events.broadcast(Envelope::new(
                EVENT_COUNTDOWN,
                json!({
                    "suggestionId": outward.id,
                    "robotId": outward.robot_id,
                    "commandType": outward
                        .proposed_action
                        .as_ref()
                        .map(|a| a.command_type.as_str())
                        .unwrap_or(""),
                    "autoExecuteAt": auto_execute_at,
                }),
            ));

            let this = Arc::clone(self);
            let id = outward.id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(countdown as u64)).await;
                this.auto_execute_if_pending(&id).await;
            });
        } else if execute {
            self.execute(&outward).await;
            // Re-read so the broadcast reflects the approved status.
            let approved = self.ledger.get(&outward.id).unwrap_or(outward);
            self.notify(&approved);
        } else {
            self.notify(&outward);
        }
    }

    fn notify(&self, suggestion: &Suggestion) {
        match serde_json::to_value(suggestion) {
            Ok(payload) => self
                .events
                .broadcast(Envelope::new(EVENT_SUGGESTION, payload)),
            Err(e) => warn!("Failed to serialize suggestion {}: {}", suggestion.id, e),
        }
        info!(
            "Suggestion [{:?}] {:?}: {} (robot={})",
            suggestion.severity, suggestion.source, suggestion.title, suggestion.robot_id
        );
    }

    /// Countdown wake-up: execute only if the suggestion is still pending.
    /// An approve/reject in the interim silently defuses the scheduled
    /// action; this re-validation is the sole cancellation mechanism.
    pub async fn auto_execute_if_pending(&self, suggestion_id: &str) {
        if let Some(s) = self.ledger.get(suggestion_id) {
            if s.status == SuggestionStatus::Pending {
                self.execute(&s).await;
            }
        }
    }

    /// Approve the suggestion, stamp the robot, create the command, publish
    /// it to the robot, and mark it sent. A missing command type or unknown
    /// robot aborts silently.
    async fn execute(&self, suggestion: &Suggestion) {
        let Some(action) = &suggestion.proposed_action else {
            return;
        };

        let robot_id = if action.robot_id.is_empty() {
            suggestion.robot_id.as_str()
        } else {
            action.robot_id.as_str()
        };
        if action.command_type.is_empty() || !self.registry.contains(robot_id) {
            return;
        }

        self.ledger.approve(&suggestion.id);
        self.registry.record_command(robot_id, AUTO_SOURCE, now_secs());

        let cmd = self.commands.create_command(
            robot_id,
            &action.command_type,
            action.parameters.clone(),
            AUTO_SOURCE,
        );
        let topic = format!("argus/{}/command/execute", robot_id);
        let payload = json!({
            "command_id": cmd.id,
            "command_type": action.command_type,
            "parameters": action.parameters,
        });
        if let Err(e) = self.transport.publish(&topic, &payload).await {
            warn!("Failed to publish command {} to {}: {}", cmd.id, topic, e);
        }
        self.commands.update_status(&cmd.id, CommandStatus::Sent);

        info!(
            "Auto-executed suggestion {}: {} -> {}",
            suggestion.id, action.command_type, robot_id
        );
    }
}
