use std::fmt::Write;

use crate::analysis::ScanReport;
use crate::knowledge::KnowledgeBundle;
use crate::models::{AgentKind, AgentResult};

/// Per-agent response rubric. Each restates the exact JSON shape the parser
/// accepts; the shared system instruction already forbids prose.
const SECURITY_RUBRIC: &str = r#"Audit this Solidity contract for security vulnerabilities.
Respond with a JSON object of this exact shape:
{
  "vulnerabilities": [
    {
      "category": "reentrancy|access-control|oracle|mev|overflow|other",
      "severity": "critical|high|medium|low|info",
      "title": "...",
      "description": "...",
      "location": "line N or function name",
      "confidence": 0.0,
      "remediation": "..."
    }
  ],
  "securityScore": 0,
  "riskLevel": "critical|high|medium|low"
}"#;

const GAS_RUBRIC: &str = r#"Review this Solidity contract for gas optimizations.
Respond with a JSON object of this exact shape:
{
  "optimizations": [
    {
      "category": "storage-packing|loop|visibility|events|other",
      "title": "...",
      "description": "...",
      "location": "line N or function name",
      "gasSavings": 0,
      "confidence": 0.0,
      "remediation": "..."
    }
  ],
  "gasScore": 0,
  "totalSavings": 0
}"#;

const TOKENOMICS_RUBRIC: &str = r#"Analyze the token economics of this Solidity contract.
Respond with a JSON object of this exact shape:
{
  "tokenomicsFindings": [
    {
      "category": "unlimited-mint|ownership-concentration|governance|incentives|other",
      "severity": "critical|high|medium|low|info",
      "title": "...",
      "description": "...",
      "confidence": 0.0,
      "remediation": "..."
    }
  ],
  "tokenomicsScore": 0,
  "overallRisk": "critical|high|medium|low"
}"#;

pub fn rubric_for(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Security => SECURITY_RUBRIC,
        AgentKind::GasOptimizer => GAS_RUBRIC,
        AgentKind::Tokenomics => TOKENOMICS_RUBRIC,
    }
}

/// Assemble the full per-agent prompt: rubric, contract source, static scan
/// results, retrieved knowledge, and (sequentially) prior agent results.
pub fn build_prompt(
    kind: AgentKind,
    source: &str,
    scan: &ScanReport,
    knowledge: &KnowledgeBundle,
    prior: &[AgentResult],
) -> String {
    let mut prompt = String::with_capacity(source.len() + 2048);
    prompt.push_str(rubric_for(kind));

    prompt.push_str("\n\n## Contract source\n```solidity\n");
    prompt.push_str(source);
    prompt.push_str("\n```\n");

    if !scan.findings.is_empty() {
        prompt.push_str("\n## Static analysis hits (verify, refine, or dismiss)\n");
        for f in &scan.findings {
            let _ = writeln!(
                prompt,
                "- [{}] {} ({}){}",
                f.severity,
                f.title,
                f.category,
                f.location.as_deref().map(|l| format!(" at {}", l)).unwrap_or_default(),
            );
        }
    }

    if !knowledge.snippets.is_empty() {
        prompt.push_str("\n## Relevant knowledge\n");
        for s in &knowledge.snippets {
            let _ = writeln!(prompt, "### {}\n{}", s.title, s.content);
        }
    }

    if !prior.is_empty() {
        prompt.push_str("\n## Findings from earlier analysis passes\n");
        for result in prior {
            for f in &result.findings {
                let _ = writeln!(prompt, "- [{}] {}: {}", result.agent, f.severity, f.title);
            }
        }
    }

    prompt
}
