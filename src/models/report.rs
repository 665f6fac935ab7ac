use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent_result::{AgentStatus, RiskLevel};
use super::finding::{Finding, Severity};
use super::request::{AgentKind, AnalysisMode, ExecutionStrategy};

/// A group of findings independently reported by more than one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorroboratedGroup {
    pub category: String,
    pub severity: Severity,
    pub agents: Vec<AgentKind>,
    pub finding_count: usize,
}

/// Cross-validation summary: which finding groups were corroborated by
/// multiple agents, and what share of all findings they represent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidation {
    pub corroborated: Vec<CorroboratedGroup>,
    pub total_findings: usize,
    /// corroborated-group-count / total-finding-count; 0.0 when no findings.
    pub confidence_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedAgent {
    pub agent: AgentKind,
    pub error: String,
}

/// Per-agent execution metadata retained in the report (findings live in the
/// merged top-level list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecution {
    pub agent: AgentKind,
    pub score: u8,
    pub models_used: Vec<String>,
    pub tokens_used: u64,
    pub cost_usd: Option<f64>,
    pub duration_ms: u64,
    pub status: AgentStatus,
}

/// The orchestrator's output for one request: merged findings, overall
/// scoring, cross-validation and execution metadata. Created once, persisted,
/// then immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedReport {
    pub audit_id: String,
    pub user_id: Option<String>,
    pub mode: AnalysisMode,
    pub strategy: ExecutionStrategy,
    pub agents_used: Vec<AgentKind>,
    pub findings: Vec<Finding>,
    pub security_score: Option<u8>,
    pub gas_score: Option<u8>,
    pub tokenomics_score: Option<u8>,
    /// Mean of the per-agent dimension scores, in [0, 100].
    pub overall_score: u8,
    pub risk_level: RiskLevel,
    pub cross_validation: CrossValidation,
    pub recommendations: Vec<String>,
    /// Static code insights merged from the pattern analyzers.
    pub code_insights: HashMap<String, f64>,
    pub agent_executions: Vec<AgentExecution>,
    pub failed_agents: Vec<FailedAgent>,
    /// True when the knowledge retriever fell back to its built-in bundle.
    pub knowledge_degraded: bool,
    pub analysis_duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl AggregatedReport {
    pub fn severity_counts(&self) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for f in &self.findings {
            *counts.entry(f.severity).or_insert(0) += 1;
        }
        counts
    }
}
