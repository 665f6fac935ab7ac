use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::finding::Finding;
use super::request::AgentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Success,
    Failed,
}

/// Overall risk or urgency label derived from finding counts and score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

/// Derive a risk label from finding counts. Fixed thresholds: any critical
/// finding is critical risk; more than two high findings is high risk; any
/// high finding is medium risk; otherwise low.
pub fn risk_from_counts(critical: usize, high: usize) -> RiskLevel {
    if critical > 0 {
        RiskLevel::Critical
    } else if high > 2 {
        RiskLevel::High
    } else if high > 0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Result of one specialized agent execution. Created at the end of the
/// agent's run and read-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent: AgentKind,
    pub version: String,
    pub findings: Vec<Finding>,
    /// Dimension score in [0, 100].
    pub score: u8,
    pub risk: RiskLevel,
    /// Models that produced usable output.
    pub models_used: Vec<String>,
    pub tokens_used: u64,
    pub cost_usd: Option<f64>,
    /// Static estimates from the pattern scan (gas costs, slot counts, ...).
    pub estimates: HashMap<String, f64>,
    pub duration_ms: u64,
    pub status: AgentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(risk_from_counts(1, 0), RiskLevel::Critical);
        assert_eq!(risk_from_counts(0, 3), RiskLevel::High);
        assert_eq!(risk_from_counts(0, 2), RiskLevel::Medium);
        assert_eq!(risk_from_counts(0, 1), RiskLevel::Medium);
        assert_eq!(risk_from_counts(0, 0), RiskLevel::Low);
    }
}
