//! In-memory command log

use crate::outbound::CommandGateway;
use argus_core::{now_secs, short_id, Command, CommandStatus};
use dashmap::DashMap;

/// Command store with a per-robot index.
#[derive(Default)]
pub struct CommandLog {
    commands: DashMap<String, Command>,
    by_robot: DashMap<String, Vec<String>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, command_id: &str) -> Option<Command> {
        self.commands.get(command_id).map(|c| c.clone())
    }

    /// The most recent commands for a robot, oldest first.
    pub fn robot_commands(&self, robot_id: &str, limit: usize) -> Vec<Command> {
        let Some(ids) = self.by_robot.get(robot_id) else {
            return Vec::new();
        };
        let skip = ids.len().saturating_sub(limit);
        ids.iter()
            .skip(skip)
            .filter_map(|id| self.commands.get(id).map(|c| c.clone()))
            .collect()
    }

    /// The most recent command for a robot that is still in flight.
    pub fn active_command(&self, robot_id: &str) -> Option<Command> {
        let ids = self.by_robot.get(robot_id)?;
        ids.iter()
            .rev()
            .filter_map(|id| self.commands.get(id).map(|c| c.clone()))
            .find(|c| !c.status.is_terminal())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandGateway for CommandLog {
    fn create_command(
        &self,
        robot_id: &str,
        command_type: &str,
        parameters: serde_json::Map<String, serde_json::Value>,
        source: &str,
    ) -> Command {
        let now = now_secs();
        let cmd = Command {
            id: short_id(),
            robot_id: robot_id.to_string(),
            command_type: command_type.to_string(),
            parameters,
            source: source.to_string(),
            status: CommandStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.commands.insert(cmd.id.clone(), cmd.clone());
        self.by_robot
            .entry(robot_id.to_string())
            .or_default()
            .push(cmd.id.clone());
        cmd
    }

    fn update_status(&self, command_id: &str, status: CommandStatus) -> Option<Command> {
        let mut cmd = self.commands.get_mut(command_id)?;
        cmd.status = status;
        cmd.updated_at = now_secs();
        Some(cmd.clone())
    }
}
