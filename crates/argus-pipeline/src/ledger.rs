//! Suggestion ledger - dedup, expiry, and capacity management

use argus_core::{
    now_secs, short_id, Action, Alert, Severity, Suggestion, SuggestionSource, SuggestionStatus,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

pub const MAX_SUGGESTIONS: usize = 50;
pub const DEFAULT_TTL_SECS: f64 = 300.0;

/// Inputs for a new ledger entry. Defaults mirror what most call sites want:
/// confidence 0.8, heuristic source, 300 s TTL.
#[derive(Clone, Debug)]
pub struct SuggestionDraft {
    pub robot_id: String,
    pub title: String,
    pub description: String,
    pub reasoning: String,
    pub severity: Severity,
    pub proposed_action: Option<Action>,
    pub confidence: f64,
    pub source: SuggestionSource,
    pub ttl_seconds: f64,
}

impl SuggestionDraft {
    pub fn new(robot_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            robot_id: robot_id.into(),
            title: title.into(),
            description: String::new(),
            reasoning: String::new(),
            severity: Severity::Info,
            proposed_action: None,
            confidence: 0.8,
            source: SuggestionSource::Heuristic,
            ttl_seconds: DEFAULT_TTL_SECS,
        }
    }

    /// A heuristic-sourced draft carrying the alert's own fields. Used for
    /// direct (non-escalated) alerts and for advisor-failure fallbacks.
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            robot_id: alert.robot_id.clone(),
            title: alert.title.clone(),
            description: alert.description.clone(),
            reasoning: alert.reasoning.clone(),
            severity: alert.severity,
            proposed_action: alert.proposed_action.clone(),
            confidence: 0.8,
            source: SuggestionSource::Heuristic,
            ttl_seconds: DEFAULT_TTL_SECS,
        }
    }
}

/// In-memory suggestion store. Short lock sections only; never held across an
/// await point.
pub struct SuggestionLedger {
    entries: Mutex<HashMap<String, Suggestion>>,
    max_entries: usize,
}

impl Default for SuggestionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: MAX_SUGGESTIONS,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Suggestion>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a new suggestion, unless one with the same (robot, title) is
    /// already pending and unexpired. Returns `None` without mutating state
    /// on a duplicate.
    pub fn create(&self, draft: SuggestionDraft) -> Option<Suggestion> {
        self.create_at(draft, now_secs())
    }

    pub fn create_at(&self, draft: SuggestionDraft, now: f64) -> Option<Suggestion> {
        let mut entries = self.lock();

        let duplicate = entries.values().any(|s| {
            s.robot_id == draft.robot_id
                && s.title == draft.title
                && s.status == SuggestionStatus::Pending
                && !s.is_expired(now)
        });
        if duplicate {
            debug!(
                "Duplicate pending suggestion for robot={} title={:?}, skipping",
                draft.robot_id, draft.title
            );
            return None;
        }

        let suggestion = Suggestion {
            id: short_id(),
            robot_id: draft.robot_id,
            title: draft.title,
            description: draft.description,
            reasoning: draft.reasoning,
            severity: draft.severity,
            proposed_action: draft.proposed_action,
            confidence: draft.confidence,
            status: SuggestionStatus::Pending,
            source: draft.source,
            created_at: now,
            expires_at: if draft.ttl_seconds > 0.0 {
                now + draft.ttl_seconds
            } else {
                0.0
            },
        };
        entries.insert(suggestion.id.clone(), suggestion.clone());
        Self::cleanup(&mut entries, now, self.max_entries);
        Some(suggestion)
    }

    /// Expire stale pending entries, then evict oldest resolved entries while
    /// over capacity. Pending entries are never evicted by capacity pressure.
    fn cleanup(entries: &mut HashMap<String, Suggestion>, now: f64, max_entries: usize) {
        for s in entries.values_mut() {
            if s.status == SuggestionStatus::Pending && s.is_expired(now) {
                s.status = SuggestionStatus::Expired;
            }
        }

        if entries.len() > max_entries {
            let mut by_time: Vec<(String, f64)> = entries
                .values()
                .filter(|s| s.status != SuggestionStatus::Pending)
                .map(|s| (s.id.clone(), s.created_at))
                .collect();
            by_time.sort_by(|a, b| a.1.total_cmp(&b.1));

            let mut to_remove = entries.len() - max_entries;
            for (id, _) in by_time {
                if to_remove == 0 {
                    break;
                }
                entries.remove(&id);
                to_remove -= 1;
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Suggestion> {
        self.lock().get(id).cloned()
    }

    /// Approve a pending suggestion. No-op (returns `None`) for any other
    /// current status.
    pub fn approve(&self, id: &str) -> Option<Suggestion> {
        self.transition(id, SuggestionStatus::Approved)
    }

    /// Reject a pending suggestion. No-op (returns `None`) for any other
    /// current status.
    pub fn reject(&self, id: &str) -> Option<Suggestion> {
        self.transition(id, SuggestionStatus::Rejected)
    }

    fn transition(&self, id: &str, to: SuggestionStatus) -> Option<Suggestion> {
        let mut entries = self.lock();
        let s = entries.get_mut(id)?;
        if s.status != SuggestionStatus::Pending {
            return None;
        }
        s.status = to;
        Some(s.clone())
    }

    /// Non-expired pending suggestions, optionally filtered by robot. Stale
    /// pending entries are flipped to expired as a side effect of the read.
    pub fn get_pending(&self, robot_id: Option<&str>) -> Vec<Suggestion> {
        self.get_pending_at(robot_id, now_secs())
    }

    pub fn get_pending_at(&self, robot_id: Option<&str>, now: f64) -> Vec<Suggestion> {
        let mut entries = self.lock();
        let mut result = Vec::new();
        for s in entries.values_mut() {
            if s.status != SuggestionStatus::Pending {
                continue;
            }
            if s.is_expired(now) {
                s.status = SuggestionStatus::Expired;
                continue;
            }
            if let Some(rid) = robot_id {
                if s.robot_id != rid {
                    continue;
                }
            }
            result.push(s.clone());
        }
        result
    }

    /// Most recent suggestions first, any status.
    pub fn get_all(&self, limit: usize) -> Vec<Suggestion> {
        let entries = self.lock();
        let mut items: Vec<Suggestion> = entries.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.total_cmp(&a.created_at));
        items.truncate(limit);
        items
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
