use console::style;

use crate::models::{AggregatedReport, RiskLevel, Severity};

fn styled_severity(severity: Severity) -> String {
    match severity {
        Severity::Critical => style("CRITICAL").red().bold().to_string(),
        Severity::High => style("HIGH").red().to_string(),
        Severity::Medium => style("MEDIUM").yellow().to_string(),
        Severity::Low => style("LOW").blue().to_string(),
        Severity::Info => style("INFO").dim().to_string(),
    }
}

fn styled_risk(risk: RiskLevel) -> String {
    match risk {
        RiskLevel::Critical => style("critical").red().bold().to_string(),
        RiskLevel::High => style("high").red().to_string(),
        RiskLevel::Medium => style("medium").yellow().to_string(),
        RiskLevel::Low => style("low").green().to_string(),
    }
}

/// Render the report as styled terminal lines.
pub fn render_report(report: &AggregatedReport) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "\n{} Audit {} ({} mode, {} strategy)",
        style("▶").green().bold(),
        style(&report.audit_id).cyan(),
        report.mode,
        report.strategy,
    ));
    lines.push(format!(
        "  Risk: {} | Overall score: {}",
        styled_risk(report.risk_level),
        style(format!("{}/100", report.overall_score)).bold(),
    ));

    for execution in &report.agent_executions {
        lines.push(format!(
            "  {} {} score {} ({} ms, {} models)",
            style("✓").green(),
            execution.agent,
            execution.score,
            execution.duration_ms,
            execution.models_used.len(),
        ));
    }
    for failed in &report.failed_agents {
        lines.push(format!(
            "  {} {} ({})",
            style("✗").red(),
            failed.agent,
            style(&failed.error).dim(),
        ));
    }

    if report.findings.is_empty() {
        lines.push(format!("  {} no findings", style("·").dim()));
    }
    for finding in &report.findings {
        let location = finding
            .location
            .as_deref()
            .map(|l| format!(" [{}]", l))
            .unwrap_or_default();
        lines.push(format!(
            "  {} {}{}",
            styled_severity(finding.severity),
            finding.title,
            style(location).dim(),
        ));
    }

    if !report.recommendations.is_empty() {
        lines.push(String::new());
        for rec in &report.recommendations {
            lines.push(format!("  {} {}", style("→").cyan(), rec));
        }
    }

    if report.knowledge_degraded {
        lines.push(format!(
            "  {}",
            style("knowledge retrieval degraded, fallback bundle used").yellow().dim()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentKind, AnalysisMode, CrossValidation, ExecutionStrategy};
    use std::collections::HashMap;

    #[test]
    fn test_render_mentions_id_and_score() {
        let report = AggregatedReport {
            audit_id: "a-42".into(),
            user_id: None,
            mode: AnalysisMode::Quick,
            strategy: ExecutionStrategy::Parallel,
            agents_used: vec![AgentKind::Security],
            findings: vec![],
            security_score: Some(90),
            gas_score: None,
            tokenomics_score: None,
            overall_score: 90,
            risk_level: RiskLevel::Low,
            cross_validation: CrossValidation {
                corroborated: vec![],
                total_findings: 0,
                confidence_ratio: 0.0,
            },
            recommendations: vec![],
            code_insights: HashMap::new(),
            agent_executions: vec![],
            failed_agents: vec![],
            knowledge_degraded: false,
            analysis_duration_ms: 5,
            completed_at: chrono::Utc::now(),
        };
        let rendered = render_report(&report);
        assert!(rendered.contains("a-42"));
        assert!(rendered.contains("90/100"));
        assert!(rendered.contains("no findings"));
    }
}
