//! Station configuration

use crate::types::AutonomyTier;
use serde::{Deserialize, Serialize};

/// Which advisor backend to talk to
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorBackend {
    #[default]
    Anthropic,
    Ollama,
}

/// Ground-station configuration. All fields have serde defaults so a partial
/// config file (or none at all) still produces a runnable station.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default)]
    pub ai_enabled: bool,
    #[serde(default)]
    pub advisor_backend: AdvisorBackend,
    #[serde(default = "default_model")]
    pub advisor_model: String,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_ollama_url")]
    pub ollama_base_url: String,
    #[serde(default)]
    pub default_autonomy_tier: AutonomyTier,
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            ai_enabled: false,
            advisor_backend: AdvisorBackend::default(),
            advisor_model: default_model(),
            anthropic_api_key: None,
            ollama_base_url: default_ollama_url(),
            default_autonomy_tier: AutonomyTier::default(),
        }
    }
}

impl StationConfig {
    /// Fill secrets from the environment. Key material never lives in config
    /// files.
    pub fn with_env_keys(mut self) -> Self {
        if self.anthropic_api_key.is_none() {
            self.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        self
    }
}
