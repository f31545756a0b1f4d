//! Escalation worker - defers ambiguous alerts to the advisor
//!
//! Single persistent consumer draining a FIFO queue of judgment-requiring
//! alerts. Provider failures and malformed responses degrade to a heuristic
//! fallback suggestion; only external cancellation stops the loop.

use crate::dispatch::Dispatcher;
use crate::ledger::{SuggestionDraft, SuggestionLedger};
use crate::registry::RobotRegistry;
use argus_advisor::{AdvisorProvider, ChatMessage};
use argus_core::{Action, Alert, RobotState, Severity, SuggestionSource};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const ADVISOR_TEMPERATURE: f32 = 0.2;
const ADVISOR_MAX_TOKENS: u32 = 1024;
const FALLBACK_NOTE: &str = " (advisor analysis unavailable)";

const SYSTEM_PROMPT: &str = "You are an AI advisor for the Argus ground station managing autonomous robot swarms. \
When presented with an alert about a robot, analyze the situation and provide a \
JSON response with these fields:\n\
- \"title\": short summary (max 60 chars)\n\
- \"description\": 1-2 sentence explanation\n\
- \"reasoning\": detailed analysis of why this matters\n\
- \"severity\": \"info\" | \"warning\" | \"critical\"\n\
- \"confidence\": 0.0-1.0\n\
- \"proposedAction\": null or {\"commandType\": \"...\", \"robotId\": \"...\", \"parameters\": {...}}\n\
\nRespond ONLY with valid JSON.";

/// The advisor's structured verdict. Every field is optional; missing fields
/// default to the originating alert's values.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorAnalysis {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reasoning: Option<String>,
    pub severity: Option<Severity>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub proposed_action: Option<Action>,
}

/// Strip an optional surrounding markdown code fence (```...```), returning
/// the inner text.
pub fn strip_code_fence(content: &str) -> &str {
    let text = content.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the fence line itself (which may carry a language tag).
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse advisor response content as JSON, tolerating a code fence wrapper.
pub fn parse_advisor_analysis(content: &str) -> Result<AdvisorAnalysis, serde_json::Error> {
    serde_json::from_str(strip_code_fence(content))
}

pub struct EscalationWorker {
    queue_rx: mpsc::UnboundedReceiver<Alert>,
    provider: Arc<dyn AdvisorProvider>,
    registry: Arc<RobotRegistry>,
    ledger: Arc<SuggestionLedger>,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
}

impl EscalationWorker {
    pub fn new(
        queue_rx: mpsc::UnboundedReceiver<Alert>,
        provider: Arc<dyn AdvisorProvider>,
        registry: Arc<RobotRegistry>,
        ledger: Arc<SuggestionLedger>,
        dispatcher: Arc<Dispatcher>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            queue_rx,
            provider,
            registry,
            ledger,
            dispatcher,
            cancel,
        }
    }

    /// Drain the queue strictly FIFO until cancelled. A single item's failure
    /// never terminates the loop.
    pub async fn run(mut self) {
        info!("Escalation worker started (provider={})", self.provider.name());
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Escalation worker cancelled");
                    break;
                }
                alert = self.queue_rx.recv() => {
                    match alert {
                        Some(alert) => self.handle_alert(alert).await,
                        None => {
                            info!("Escalation queue closed, worker stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle_alert(&self, alert: Alert) {
        // Unknown robots are dropped silently: no suggestion, no error.
        let Some(robot) = self.registry.get(&alert.robot_id) else {
            debug!(
                "Dropping {} alert for unknown robot {}",
                alert.alert_type, alert.robot_id
            );
            return;
        };

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_context(&robot, &alert)),
        ];

        let created = match self
            .provider
            .complete(&messages, ADVISOR_TEMPERATURE, ADVISOR_MAX_TOKENS)
            .await
        {
            Ok(response) => match parse_advisor_analysis(&response.content) {
                Ok(analysis) => self.ledger.create(draft_from_analysis(analysis, &alert)),
                Err(e) => {
                    warn!(
                        "Malformed advisor response for {} alert on {}: {}",
                        alert.alert_type, alert.robot_id, e
                    );
                    self.ledger.create(fallback_draft(&alert))
                }
            },
            Err(e) => {
                warn!(
                    "Advisor call failed for {} alert on {}: {}",
                    alert.alert_type, alert.robot_id, e
                );
                self.ledger.create(fallback_draft(&alert))
            }
        };

        if let Some(suggestion) = created {
            self.dispatcher.dispatch(suggestion).await;
        }
    }
}

fn build_context(robot: &RobotState, alert: &Alert) -> String {
    format!(
        "Alert: {}\n\
         Robot: {} ({}), type={}, status={:?}\n\
         Position: lat={:.5}, lon={:.5}, alt={:.1}m\n\
         Speed: {:.1} m/s, Heading: {:.0}deg\n\
         Battery: {:.0}%, Signal: {:.0}%\n\
         Alert details: {}\n\
         Heuristic reasoning: {}\n",
        alert.alert_type,
        robot.name,
        robot.id,
        robot.robot_type,
        robot.status,
        robot.latitude,
        robot.longitude,
        robot.altitude,
        robot.speed,
        robot.heading,
        robot.battery_percent,
        robot.signal_strength,
        alert.description,
        alert.reasoning,
    )
}

fn draft_from_analysis(analysis: AdvisorAnalysis, alert: &Alert) -> SuggestionDraft {
    let mut draft = SuggestionDraft::from_alert(alert);
    if let Some(title) = analysis.title {
        draft.title = title;
    }
    if let Some(description) = analysis.description {
        draft.description = description;
    }
    if let Some(reasoning) = analysis.reasoning {
        draft.reasoning = reasoning;
    }
    if let Some(severity) = analysis.severity {
        draft.severity = severity;
    }
    if analysis.proposed_action.is_some() {
        draft.proposed_action = analysis.proposed_action;
    }
    draft.confidence = analysis.confidence.unwrap_or(0.7);
    draft.source = SuggestionSource::Judgment;
    draft
}

fn fallback_draft(alert: &Alert) -> SuggestionDraft {
    let mut draft = SuggestionDraft::from_alert(alert);
    draft.reasoning.push_str(FALLBACK_NOTE);
    draft
}
