//! Analysis service - orchestrates the heuristic checks and escalation
//! pipeline

use crate::dispatch::Dispatcher;
use crate::escalation::EscalationWorker;
use crate::heuristics::HeuristicAnalyzer;
use crate::ledger::{SuggestionDraft, SuggestionLedger};
use crate::registry::RobotRegistry;
use argus_advisor::AdvisorProvider;
use argus_core::{Alert, RobotState};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const PROXIMITY_PERIOD_SECS: u64 = 30;

/// Entry point for telemetry into the decision pipeline. Owns the escalation
/// queue's sending side and the background task lifecycle.
pub struct AnalysisService {
    analyzer: Arc<HeuristicAnalyzer>,
    registry: Arc<RobotRegistry>,
    ledger: Arc<SuggestionLedger>,
    dispatcher: Arc<Dispatcher>,
    provider: Option<Arc<dyn AdvisorProvider>>,
    queue_tx: mpsc::UnboundedSender<Alert>,
    queue_rx: Mutex<Option<mpsc::UnboundedReceiver<Alert>>>,
    cancel: CancellationToken,
}

impl AnalysisService {
    /// `provider: None` disables escalation entirely; judgment-requiring
    /// alerts then resolve as direct heuristic suggestions.
    pub fn new(
        analyzer: Arc<HeuristicAnalyzer>,
        registry: Arc<RobotRegistry>,
        ledger: Arc<SuggestionLedger>,
        dispatcher: Arc<Dispatcher>,
        provider: Option<Arc<dyn AdvisorProvider>>,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            analyzer,
            registry,
            ledger,
            dispatcher,
            provider,
            queue_tx,
            queue_rx: Mutex::new(Some(queue_rx)),
            cancel: CancellationToken::new(),
        }
    }

    /// Spawn the escalation worker (when a provider is configured) and the
    /// proximity monitor.
    pub fn start(self: &Arc<Self>) {
        if let Some(provider) = &self.provider {
            let rx = self
                .queue_rx
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take();
            match rx {
                Some(rx) => {
                    let worker = EscalationWorker::new(
                        rx,
                        Arc::clone(provider),
                        Arc::clone(&self.registry),
                        Arc::clone(&self.ledger),
                        Arc::clone(&self.dispatcher),
                        self.cancel.child_token(),
                    );
                    tokio::spawn(worker.run());
                    info!("Escalation worker spawned");
                }
                None => warn!("Analysis service already started"),
            }
        }

        let this = Arc::clone(self);
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            this.proximity_loop(cancel).await;
        });
        info!(
            "Analysis service started (escalation={})",
            self.provider.is_some()
        );
    }

    /// Cooperative shutdown of the worker and the proximity monitor.
    pub fn stop(&self) {
        self.cancel.cancel();
        info!("Analysis service stopped");
    }

    /// Called once per telemetry update by the transport layer.
    pub async fn on_telemetry(&self, robot: &RobotState) {
        for alert in self.analyzer.analyze(robot) {
            self.process_alert(alert).await;
        }
    }

    /// Route one alert: escalate it, or create the suggestion directly.
    pub async fn process_alert(&self, alert: Alert) {
        if alert.requires_judgment && self.provider.is_some() {
            // The queue is unbounded; a stalled advisor delays only
            // judgment-requiring alerts.
            let _ = self.queue_tx.send(alert);
        } else if let Some(suggestion) = self.ledger.create(SuggestionDraft::from_alert(&alert)) {
            self.dispatcher.dispatch(suggestion).await;
        }
    }

    /// Run one proximity sweep over the current fleet snapshot.
    pub async fn check_proximity(&self) {
        let robots = self.registry.snapshot();
        for alert in self.analyzer.check_proximity(&robots) {
            self.process_alert(alert).await;
        }
    }

    async fn proximity_loop(&self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_secs(PROXIMITY_PERIOD_SECS)) => {
                    self.check_proximity().await;
                }
            }
        }
    }
}
