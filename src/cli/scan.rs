use console::style;

use crate::analysis::{gas_costs, scan_for};
use crate::errors::AuditError;
use crate::models::{sort_findings, AgentKind, Finding};
use crate::pipeline::validate_source;

use super::commands::{parse_agent_list, ScanArgs};

/// Offline pattern scan: deterministic rule sets only, no model calls.
pub async fn handle_scan(args: ScanArgs) -> Result<(), AuditError> {
    let source = std::fs::read_to_string(&args.file)?;
    validate_source(&source)?;

    let agents = match args.agents.as_deref() {
        Some(list) => parse_agent_list(list)?,
        None => AgentKind::all().to_vec(),
    };

    let mut findings: Vec<Finding> = Vec::new();
    let mut estimates = Vec::new();
    for agent in &agents {
        let report = scan_for(*agent, &source);
        findings.extend(report.findings);
        let mut pairs: Vec<(String, f64)> = report.estimates.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        estimates.push((*agent, pairs));
    }
    sort_findings(&mut findings);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
        return Ok(());
    }

    println!(
        "{} {} findings from {} rule set(s)",
        style("▶").green().bold(),
        findings.len(),
        agents.len()
    );
    for finding in &findings {
        let location = finding
            .location
            .as_deref()
            .map(|l| format!(" [{}]", l))
            .unwrap_or_default();
        println!(
            "  {} {} ({}){}",
            style(finding.severity.to_string().to_uppercase()).bold(),
            finding.title,
            finding.category,
            style(location).dim(),
        );
    }
    for (agent, pairs) in estimates {
        println!("\n{} {} estimates", style("·").dim(), agent);
        for (key, value) in pairs {
            println!("  {} = {}", key, value);
        }
    }
    if args.costs {
        println!("\n{} reference gas costs", style("·").dim());
        for op in gas_costs::OPS {
            if let Some(cost) = gas_costs::lookup(op) {
                println!("  {} = {}", op, cost);
            }
        }
    }
    Ok(())
}
