use serde::{Deserialize, Serialize};

use super::request::AgentKind;

/// Severity level for an audit finding, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Returns a numeric rank where lower values indicate higher severity.
    /// Critical = 0, High = 1, Medium = 2, Low = 3, Info = 4.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Info => 4,
        }
    }

    /// Points deducted from a 100-point heuristic score per finding of this
    /// severity. Calibration constants carried over from the scoring model.
    pub fn penalty(&self) -> u8 {
        match self {
            Severity::Critical => 30,
            Severity::High => 15,
            Severity::Medium => 8,
            Severity::Low => 3,
            Severity::Info => 0,
        }
    }

    /// Parse a model-reported severity string, defaulting unknown values to Medium.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "info" | "informational" => Severity::Info,
            _ => Severity::Medium,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// One reported issue or optimization opportunity.
///
/// Severity and confidence are set once at creation, by either a pattern rule
/// (heuristic confidence) or a model (self-reported confidence), and are never
/// recomputed downstream, only aggregated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Category tag, e.g. "reentrancy", "storage-packing", "unlimited-mint".
    pub category: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Location hint: a line range ("lines 12-18") or a short snippet.
    pub location: Option<String>,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Agent that produced this finding.
    pub agent: AgentKind,
    pub remediation: String,
    /// Estimated gas saved, set only by the gas-optimizer agent.
    pub gas_savings: Option<u64>,
}

impl Finding {
    /// Duplicate-group key. Tokenomics findings collide on (type, title);
    /// everything else collides on (category, location).
    pub fn dedup_key(&self) -> (String, String) {
        let category = self.category.to_lowercase();
        match self.agent {
            AgentKind::Tokenomics => (category, self.title.trim().to_lowercase()),
            _ => {
                let location = self
                    .location
                    .as_deref()
                    .unwrap_or(&self.title)
                    .trim()
                    .to_lowercase();
                (category, location)
            }
        }
    }
}

/// Collapse duplicate findings. Within a duplicate group the highest-severity
/// instance wins, confidence breaking ties; order of survivors follows first
/// appearance. Running this twice changes nothing.
pub fn dedup_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut kept: Vec<Finding> = Vec::with_capacity(findings.len());
    for finding in findings {
        let key = finding.dedup_key();
        match kept.iter_mut().find(|f| f.dedup_key() == key) {
            Some(existing) => {
                let outranks = finding.severity.rank() < existing.severity.rank();
                let more_confident = finding.severity == existing.severity
                    && finding.confidence > existing.confidence;
                if outranks || more_confident {
                    *existing = finding;
                }
            }
            None => kept.push(finding),
        }
    }
    kept
}

/// Sort findings by descending severity; gas findings tie-break on descending
/// savings, everything else on descending confidence.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.severity
            .rank()
            .cmp(&b.severity.rank())
            .then_with(|| b.gas_savings.unwrap_or(0).cmp(&a.gas_savings.unwrap_or(0)))
            .then_with(|| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
}
