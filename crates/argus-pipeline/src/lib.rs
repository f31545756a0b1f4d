//! Argus Pipeline - the alert-to-action decision core
//!
//! Telemetry drives the heuristic rule engine, producing alerts. Alerts that
//! need advisor judgment go through a FIFO escalation queue; the rest become
//! suggestions directly. Every suggestion passes through the ledger
//! (dedup/expiry/capacity) and the autonomy policy, and the dispatcher either
//! executes it, schedules a countdown execution, or just notifies observers.

pub mod autonomy;
pub mod command;
pub mod dispatch;
pub mod escalation;
pub mod events;
pub mod heuristics;
pub mod ledger;
pub mod outbound;
pub mod registry;
pub mod service;

pub use autonomy::{is_high_risk, AutonomyPolicy, TiersSummary, SUPERVISED_COUNTDOWN_SECS};
pub use command::CommandLog;
pub use dispatch::Dispatcher;
pub use escalation::{parse_advisor_analysis, strip_code_fence, AdvisorAnalysis, EscalationWorker};
pub use events::EventBus;
pub use heuristics::{haversine_m, HeuristicAnalyzer, PROXIMITY_THRESHOLD_M};
pub use ledger::{SuggestionDraft, SuggestionLedger, DEFAULT_TTL_SECS, MAX_SUGGESTIONS};
pub use outbound::{CommandGateway, EventSink, TransportPublisher};
pub use registry::{HealthUpdate, PositionUpdate, RobotRegistry};
pub use service::{AnalysisService, PROXIMITY_PERIOD_SECS};
