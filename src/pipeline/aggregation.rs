use std::collections::HashMap;

use chrono::Utc;

use crate::models::{
    dedup_findings, risk_from_counts, sort_findings, AgentExecution, AgentKind, AgentResult,
    AggregatedReport, AnalysisRequest, CorroboratedGroup, CrossValidation, ExecutionStrategy,
    FailedAgent, Finding, Severity,
};

/// Two findings corroborate each other when category and severity match and
/// their confidences sit within this band.
const CONFIDENCE_BAND: f64 = 0.2;

/// Fold all successful agent results and recorded failures into one report.
pub fn aggregate(
    request: &AnalysisRequest,
    strategy: ExecutionStrategy,
    agents_used: Vec<AgentKind>,
    results: &[AgentResult],
    failed_agents: Vec<FailedAgent>,
    knowledge_degraded: bool,
    analysis_duration_ms: u64,
) -> AggregatedReport {
    let merged: Vec<Finding> = results.iter().flat_map(|r| r.findings.clone()).collect();
    let mut findings = dedup_findings(merged);
    sort_findings(&mut findings);

    let score_for = |kind: AgentKind| results.iter().find(|r| r.agent == kind).map(|r| r.score);
    let security_score = score_for(AgentKind::Security);
    let gas_score = score_for(AgentKind::GasOptimizer);
    let tokenomics_score = score_for(AgentKind::Tokenomics);

    let overall_score = if results.is_empty() {
        0
    } else {
        (results.iter().map(|r| r.score as u32).sum::<u32>() / results.len() as u32) as u8
    };

    let critical = findings.iter().filter(|f| f.severity == Severity::Critical).count();
    let high = findings.iter().filter(|f| f.severity == Severity::High).count();
    let risk_level = risk_from_counts(critical, high);

    let cross_validation = cross_validate(&findings);
    let recommendations = build_recommendations(&findings);

    let mut code_insights = HashMap::new();
    for result in results {
        code_insights.extend(result.estimates.clone());
    }

    let agent_executions = results
        .iter()
        .map(|r| AgentExecution {
            agent: r.agent,
            score: r.score,
            models_used: r.models_used.clone(),
            tokens_used: r.tokens_used,
            cost_usd: r.cost_usd,
            duration_ms: r.duration_ms,
            status: r.status,
        })
        .collect();

    AggregatedReport {
        audit_id: request.audit_id.clone(),
        user_id: request.user_id.clone(),
        mode: request.mode,
        strategy,
        agents_used,
        findings,
        security_score,
        gas_score,
        tokenomics_score,
        overall_score,
        risk_level,
        cross_validation,
        recommendations,
        code_insights,
        agent_executions,
        failed_agents,
        knowledge_degraded,
        analysis_duration_ms,
        completed_at: Utc::now(),
    }
}

/// Group findings by (category, severity) with confidences within one band,
/// then report the groups seen by more than one agent. The ratio is defined
/// as 0.0 when there are no findings at all.
pub fn cross_validate(findings: &[Finding]) -> CrossValidation {
    struct Group<'a> {
        representative: &'a Finding,
        members: Vec<&'a Finding>,
    }

    let mut groups: Vec<Group> = Vec::new();
    for finding in findings {
        let slot = groups.iter_mut().find(|g| {
            g.representative.category.eq_ignore_ascii_case(&finding.category)
                && g.representative.severity == finding.severity
                && (g.representative.confidence - finding.confidence).abs() <= CONFIDENCE_BAND
        });
        match slot {
            Some(group) => group.members.push(finding),
            None => groups.push(Group { representative: finding, members: vec![finding] }),
        }
    }

    let corroborated: Vec<CorroboratedGroup> = groups
        .iter()
        .filter_map(|g| {
            let mut agents: Vec<AgentKind> = g.members.iter().map(|f| f.agent).collect();
            agents.sort_by_key(|a| a.as_str());
            agents.dedup();
            if agents.len() < 2 {
                return None;
            }
            Some(CorroboratedGroup {
                category: g.representative.category.clone(),
                severity: g.representative.severity,
                agents,
                finding_count: g.members.len(),
            })
        })
        .collect();

    let total_findings = findings.len();
    let confidence_ratio = if total_findings == 0 {
        0.0
    } else {
        corroborated.len() as f64 / total_findings as f64
    };

    CrossValidation { corroborated, total_findings, confidence_ratio }
}

fn build_recommendations(findings: &[Finding]) -> Vec<String> {
    let mut recommendations = Vec::new();

    if findings.iter().any(|f| f.severity == Severity::Critical) {
        recommendations
            .push("Address critical vulnerabilities immediately before any deployment.".into());
    }
    if findings.iter().any(|f| f.agent == AgentKind::GasOptimizer) {
        recommendations.push("Implement the identified gas optimizations.".into());
    }
    if findings.iter().any(|f| f.category.eq_ignore_ascii_case("governance")) {
        recommendations.push("Review governance processes and timelock configuration.".into());
    }

    recommendations
}
