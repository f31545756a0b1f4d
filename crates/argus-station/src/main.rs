//! Argus Station - wires the decision pipeline together
//!
//! The real message-bus and WebSocket transports attach through the library
//! API; this binary stands the pipeline up with an in-process event bus and a
//! logging transport so the core can run (and be poked at) on its own.

use argus_advisor::{AdvisorProvider, AnthropicProvider, OllamaProvider};
use argus_core::{AdvisorBackend, AutonomyTier, StationConfig};
use argus_pipeline::{
    AnalysisService, AutonomyPolicy, CommandLog, Dispatcher, EventBus, HeuristicAnalyzer,
    RobotRegistry, SuggestionLedger, TransportPublisher,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "argus-station", about = "Argus ground station decision pipeline")]
struct Cli {
    /// Enable advisor escalation
    #[arg(long)]
    ai: bool,
    /// Advisor backend: anthropic or ollama
    #[arg(long, default_value = "anthropic")]
    backend: String,
    /// Advisor model override
    #[arg(short, long)]
    model: Option<String>,
    /// Fleet-wide default autonomy tier
    #[arg(short, long, default_value = "assisted")]
    tier: String,
}

/// Transport stub: logs every publish. Replaced by the message-bus client in
/// a full deployment.
struct LogTransport;

#[async_trait::async_trait]
impl TransportPublisher for LogTransport {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> argus_core::Result<()> {
        debug!("publish {}: {}", topic, payload);
        Ok(())
    }
}

fn build_provider(config: &StationConfig) -> anyhow::Result<Arc<dyn AdvisorProvider>> {
    Ok(match config.advisor_backend {
        AdvisorBackend::Anthropic => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("ANTHROPIC_API_KEY is not set"))?;
            Arc::new(AnthropicProvider::new(api_key, config.advisor_model.clone()))
        }
        AdvisorBackend::Ollama => Arc::new(OllamaProvider::new(
            config.ollama_base_url.clone(),
            config.advisor_model.clone(),
        )),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "argus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = StationConfig::default().with_env_keys();
    config.ai_enabled = cli.ai;
    config.advisor_backend = match cli.backend.as_str() {
        "ollama" => AdvisorBackend::Ollama,
        _ => AdvisorBackend::Anthropic,
    };
    if let Some(model) = cli.model {
        config.advisor_model = model;
    }
    config.default_autonomy_tier = AutonomyTier::parse(&cli.tier)
        .ok_or_else(|| anyhow::anyhow!("invalid autonomy tier: {}", cli.tier))?;

    let registry = Arc::new(RobotRegistry::new(config.default_autonomy_tier));
    let ledger = Arc::new(SuggestionLedger::new());
    let policy = Arc::new(AutonomyPolicy::new(
        Arc::clone(&registry),
        config.default_autonomy_tier,
    ));
    let events = Arc::new(EventBus::default());
    let commands = Arc::new(CommandLog::new());
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&ledger),
        Arc::clone(&registry),
        Arc::clone(&policy),
        commands,
        Arc::new(LogTransport),
        events,
    ));

    let provider = if config.ai_enabled {
        Some(build_provider(&config)?)
    } else {
        None
    };

    let service = Arc::new(AnalysisService::new(
        Arc::new(HeuristicAnalyzer::new()),
        Arc::clone(&registry),
        ledger,
        dispatcher,
        provider,
    ));
    service.start();

    info!(
        "Argus station up (ai_enabled={}, default_tier={})",
        config.ai_enabled, config.default_autonomy_tier
    );

    tokio::signal::ctrl_c().await?;
    service.stop();
    Ok(())
}
