use std::fmt::Write;

use crate::models::{AggregatedReport, Finding, Severity};

pub fn format_finding_markdown(finding: &Finding) -> String {
    let mut out = format!(
        "### {}\n\n**Severity:** {}\n**Category:** {}\n**Agent:** {}\n**Confidence:** {:.2}\n",
        finding.title, finding.severity, finding.category, finding.agent, finding.confidence,
    );
    if let Some(location) = &finding.location {
        let _ = writeln!(out, "**Location:** {}", location);
    }
    if let Some(savings) = finding.gas_savings {
        let _ = writeln!(out, "**Estimated savings:** {} gas", savings);
    }
    let _ = write!(out, "\n{}\n", finding.description);
    if !finding.remediation.is_empty() {
        let _ = write!(out, "\n**Remediation:** {}\n", finding.remediation);
    }
    out
}

pub fn format_severity_summary(findings: &[Finding]) -> String {
    let count = |s: Severity| findings.iter().filter(|f| f.severity == s).count();
    format!(
        "## Summary\n\n| Severity | Count |\n|---|---|\n| Critical | {} |\n| High | {} |\n| Medium | {} |\n| Low | {} |\n| Info | {} |\n| **Total** | **{}** |\n",
        count(Severity::Critical),
        count(Severity::High),
        count(Severity::Medium),
        count(Severity::Low),
        count(Severity::Info),
        findings.len()
    )
}

/// Full markdown rendering of one aggregated report.
pub fn format_report_markdown(report: &AggregatedReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Audit Report: {}\n", report.audit_id);
    let _ = writeln!(
        out,
        "Mode: {} | Strategy: {} | Risk: **{}** | Overall score: **{}/100**\n",
        report.mode, report.strategy, report.risk_level, report.overall_score
    );

    let mut scores = Vec::new();
    if let Some(s) = report.security_score {
        scores.push(format!("security {}/100", s));
    }
    if let Some(s) = report.gas_score {
        scores.push(format!("gas {}/100", s));
    }
    if let Some(s) = report.tokenomics_score {
        scores.push(format!("tokenomics {}/100", s));
    }
    if !scores.is_empty() {
        let _ = writeln!(out, "Dimension scores: {}\n", scores.join(", "));
    }

    out.push_str(&format_severity_summary(&report.findings));

    if !report.recommendations.is_empty() {
        out.push_str("\n## Recommendations\n\n");
        for rec in &report.recommendations {
            let _ = writeln!(out, "- {}", rec);
        }
    }

    if !report.cross_validation.corroborated.is_empty() {
        out.push_str("\n## Cross-validated findings\n\n");
        for group in &report.cross_validation.corroborated {
            let agents: Vec<&str> = group.agents.iter().map(|a| a.as_str()).collect();
            let _ = writeln!(
                out,
                "- {} ({}) confirmed by {} [{} findings]",
                group.category,
                group.severity,
                agents.join(", "),
                group.finding_count
            );
        }
        let _ = writeln!(
            out,
            "\nCross-validation confidence ratio: {:.2}",
            report.cross_validation.confidence_ratio
        );
    }

    if !report.findings.is_empty() {
        out.push_str("\n## Findings\n\n");
        for finding in &report.findings {
            out.push_str(&format_finding_markdown(finding));
            out.push_str("\n---\n\n");
        }
    }

    if !report.failed_agents.is_empty() {
        out.push_str("\n## Failed agents\n\n");
        for failed in &report.failed_agents {
            let _ = writeln!(out, "- {}: {}", failed.agent, failed.error);
        }
    }

    if report.knowledge_degraded {
        out.push_str("\n_Knowledge retrieval was degraded; built-in reference material was used._\n");
    }

    let _ = writeln!(
        out,
        "\nCompleted in {} ms at {}.",
        report.analysis_duration_ms,
        report.completed_at.to_rfc3339()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentKind;

    fn finding() -> Finding {
        Finding {
            category: "reentrancy".into(),
            severity: Severity::Critical,
            title: "Reentrant withdraw".into(),
            description: "State written after external call.".into(),
            location: Some("line 12".into()),
            confidence: 0.9,
            agent: AgentKind::Security,
            remediation: "Apply checks-effects-interactions.".into(),
            gas_savings: None,
        }
    }

    #[test]
    fn test_finding_markdown_has_all_sections() {
        let md = format_finding_markdown(&finding());
        assert!(md.contains("### Reentrant withdraw"));
        assert!(md.contains("**Severity:** critical"));
        assert!(md.contains("**Location:** line 12"));
        assert!(md.contains("**Remediation:**"));
    }

    #[test]
    fn test_severity_summary_counts() {
        let findings = vec![finding(), finding()];
        let md = format_severity_summary(&findings);
        assert!(md.contains("| Critical | 2 |"));
        assert!(md.contains("**2**"));
    }
}
