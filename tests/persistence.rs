use std::collections::HashMap;

use chrono::Utc;
use tempfile::TempDir;

use solaudit::db::Database;
use solaudit::models::{
    AgentExecution, AgentKind, AgentStatus, AggregatedReport, AnalysisMode, CrossValidation,
    ExecutionStrategy, Finding, RiskLevel, Severity,
};
use solaudit::reporting::format_report_markdown;

fn sample_report() -> AggregatedReport {
    AggregatedReport {
        audit_id: "file-audit-1".into(),
        user_id: Some("u-9".into()),
        mode: AnalysisMode::Standard,
        strategy: ExecutionStrategy::Adaptive,
        agents_used: vec![AgentKind::Security, AgentKind::GasOptimizer],
        findings: vec![Finding {
            category: "reentrancy".into(),
            severity: Severity::High,
            title: "Reentrant withdraw".into(),
            description: "External call precedes state update.".into(),
            location: Some("line 7".into()),
            confidence: 0.85,
            agent: AgentKind::Security,
            remediation: "Update state first.".into(),
            gas_savings: None,
        }],
        security_score: Some(55),
        gas_score: Some(80),
        tokenomics_score: None,
        overall_score: 67,
        risk_level: RiskLevel::Medium,
        cross_validation: CrossValidation {
            corroborated: vec![],
            total_findings: 1,
            confidence_ratio: 0.0,
        },
        recommendations: vec!["Implement the identified gas optimizations.".into()],
        code_insights: HashMap::from([("function_count".to_string(), 3.0)]),
        agent_executions: vec![AgentExecution {
            agent: AgentKind::Security,
            score: 55,
            models_used: vec!["anthropic/claude-3.5-sonnet".into()],
            tokens_used: 1200,
            cost_usd: Some(0.05),
            duration_ms: 900,
            status: AgentStatus::Success,
        }],
        failed_agents: vec![],
        knowledge_degraded: true,
        analysis_duration_ms: 1500,
        completed_at: Utc::now(),
    }
}

#[test]
fn test_report_survives_database_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audits.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new(path).unwrap();
        db.record_report(&sample_report()).unwrap();
    }

    let db = Database::new(path).unwrap();
    let report = db.get_report("file-audit-1").unwrap().unwrap();
    assert_eq!(report.security_score, Some(55));
    assert_eq!(report.findings.len(), 1);
    assert!(report.knowledge_degraded);

    let rows = db.list_audits(10, 0).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "completed");
    assert_eq!(rows[0].overall_score, Some(67));
}

#[test]
fn test_markdown_report_renders_every_section() {
    let md = format_report_markdown(&sample_report());
    assert!(md.contains("# Audit Report: file-audit-1"));
    assert!(md.contains("| High | 1 |"));
    assert!(md.contains("Implement the identified gas optimizations."));
    assert!(md.contains("### Reentrant withdraw"));
    assert!(md.contains("degraded"));
}
