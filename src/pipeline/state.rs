use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::models::AnalysisMode;

/// Per-request lifecycle step. Terminal states are not stored; a finished
/// request is removed from the tracker instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestPhase {
    Validating,
    SelectingAgents,
    Enriching,
    Executing,
    Aggregating,
    Persisting,
}

impl std::fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validating => "validating",
            Self::SelectingAgents => "selecting-agents",
            Self::Enriching => "enriching",
            Self::Executing => "executing",
            Self::Aggregating => "aggregating",
            Self::Persisting => "persisting",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRequest {
    pub audit_id: String,
    pub mode: AnalysisMode,
    pub phase: RequestPhase,
    pub started_at: DateTime<Utc>,
}

/// In-memory view of in-flight audits, keyed by audit id. Entries are
/// inserted at validation and removed on any terminal outcome.
#[derive(Default)]
pub struct RequestTracker {
    active: DashMap<String, ActiveRequest>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, audit_id: &str, mode: AnalysisMode) {
        self.active.insert(
            audit_id.to_string(),
            ActiveRequest {
                audit_id: audit_id.to_string(),
                mode,
                phase: RequestPhase::Validating,
                started_at: Utc::now(),
            },
        );
    }

    pub fn set_phase(&self, audit_id: &str, phase: RequestPhase) {
        if let Some(mut entry) = self.active.get_mut(audit_id) {
            entry.phase = phase;
        }
    }

    pub fn finish(&self, audit_id: &str) {
        self.active.remove(audit_id);
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn snapshot(&self) -> Vec<ActiveRequest> {
        self.active.iter().map(|e| e.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_lifecycle() {
        let tracker = RequestTracker::new();
        tracker.start("a-1", AnalysisMode::Quick);
        assert_eq!(tracker.len(), 1);

        tracker.set_phase("a-1", RequestPhase::Executing);
        assert_eq!(tracker.snapshot()[0].phase, RequestPhase::Executing);

        tracker.finish("a-1");
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_set_phase_on_unknown_id_is_noop() {
        let tracker = RequestTracker::new();
        tracker.set_phase("missing", RequestPhase::Aggregating);
        assert!(tracker.is_empty());
    }
}
