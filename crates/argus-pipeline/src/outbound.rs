//! Outbound collaborator contracts
//!
//! The escalation worker and dispatcher depend on these abstractions, never
//! on concrete sibling services, so the command/mission side can evolve
//! without import cycles back into the pipeline.

use argus_core::{Command, CommandStatus, Envelope};

/// Command creation and status tracking.
pub trait CommandGateway: Send + Sync {
    fn create_command(
        &self,
        robot_id: &str,
        command_type: &str,
        parameters: serde_json::Map<String, serde_json::Value>,
        source: &str,
    ) -> Command;

    fn update_status(&self, command_id: &str, status: CommandStatus) -> Option<Command>;
}

/// Message-bus publish used to push command-execute messages to a robot.
#[async_trait::async_trait]
pub trait TransportPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> argus_core::Result<()>;
}

/// Fan-out of event envelopes to connected observers.
pub trait EventSink: Send + Sync {
    fn broadcast(&self, event: Envelope);
}
