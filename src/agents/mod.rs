//! Specialized agents. Each agent pairs a deterministic pattern scan with a
//! multi-model consensus call and folds both into one [`AgentResult`].

pub mod gas_optimizer;
pub mod prompts;
pub mod registry;
pub mod security;
pub mod tokenomics;

use std::time::Instant;

use tracing::{debug, info};

use crate::analysis::scan_for;
use crate::errors::AuditError;
use crate::knowledge::KnowledgeBundle;
use crate::llm::{ModelClient, ModelOutput};
use crate::models::{
    dedup_findings, risk_from_counts, sort_findings, AgentKind, AgentResult, AgentStatus, Finding,
    Severity,
};

pub use registry::{definition_for, AgentDefinition, AGENT_REGISTRY};

/// Score assigned when no model reported one.
pub const DEFAULT_MODEL_SCORE: u8 = 50;

/// What one model added to the consensus after parsing.
#[derive(Debug, Default)]
pub struct ModelContribution {
    pub findings: Vec<Finding>,
    pub score: Option<u8>,
    /// Gas optimizer only.
    pub total_savings: Option<u64>,
}

pub(crate) fn clamp_score(value: u64) -> u8 {
    value.min(100) as u8
}

/// Run one agent end to end: scan, prompt, model consensus, merge.
///
/// Fails only when zero models produce usable output; every partial outcome
/// (some models dropped, sparse responses) still yields a result.
pub async fn run_agent(
    kind: AgentKind,
    client: &ModelClient,
    source: &str,
    knowledge: &KnowledgeBundle,
    prior: &[AgentResult],
) -> Result<AgentResult, AuditError> {
    let def = definition_for(kind);
    let start = Instant::now();

    let scan = scan_for(kind, source);
    debug!(agent = %kind, static_findings = scan.findings.len(), "Pattern scan complete");

    let prompt = prompts::build_prompt(kind, source, &scan, knowledge, prior);
    let outputs = client.call_many(def.models, &prompt).await;

    let successes: Vec<ModelOutput> = outputs.into_iter().filter_map(Result::ok).collect();
    if successes.is_empty() {
        return Err(AuditError::NoValidAnalysis(format!(
            "{}: no model produced usable output",
            kind
        )));
    }

    let models_used: Vec<String> = successes.iter().map(|o| o.model.clone()).collect();
    let tokens_used: u64 = successes.iter().map(|o| o.tokens_used).sum();
    let cost_usd = successes
        .iter()
        .filter_map(|o| o.cost_usd)
        .reduce(|a, b| a + b);

    let contributions: Vec<ModelContribution> = successes
        .iter()
        .map(|o| match kind {
            AgentKind::Security => security::parse(o),
            AgentKind::GasOptimizer => gas_optimizer::parse(o),
            AgentKind::Tokenomics => tokenomics::parse(o),
        })
        .collect();

    let mut findings = scan.findings;
    let mut scores = Vec::new();
    let mut savings_estimates = Vec::new();
    for mut c in contributions {
        findings.append(&mut c.findings);
        if let Some(s) = c.score {
            scores.push(s);
        }
        if let Some(s) = c.total_savings {
            savings_estimates.push(s);
        }
    }

    let mut findings = dedup_findings(findings);
    sort_findings(&mut findings);

    let score = if scores.is_empty() {
        DEFAULT_MODEL_SCORE
    } else {
        (scores.iter().map(|&s| s as u32).sum::<u32>() / scores.len() as u32) as u8
    };

    let critical = findings.iter().filter(|f| f.severity == Severity::Critical).count();
    let high = findings.iter().filter(|f| f.severity == Severity::High).count();
    let risk = risk_from_counts(critical, high);

    let mut estimates = scan.estimates;
    if !savings_estimates.is_empty() {
        let mean = savings_estimates.iter().sum::<u64>() as f64 / savings_estimates.len() as f64;
        estimates.insert("consensus_total_savings".into(), mean);
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        agent = %kind,
        findings = findings.len(),
        score,
        risk = %risk,
        models = models_used.len(),
        duration_ms,
        "Agent finished"
    );

    Ok(AgentResult {
        agent: kind,
        version: def.version.to_string(),
        findings,
        score,
        risk,
        models_used,
        tokens_used,
        cost_usd,
        estimates,
        duration_ms,
        status: AgentStatus::Success,
    })
}
