use serde_json::Value;

use crate::llm::ModelOutput;
use crate::models::{AgentKind, Finding, Severity};

use super::{clamp_score, ModelContribution};

/// Parse one model's security response. A missing `vulnerabilities` array or
/// `securityScore` is an empty contribution, not an error; consensus handles
/// partial answers.
pub fn parse(output: &ModelOutput) -> ModelContribution {
    let mut contribution = ModelContribution::default();

    if let Some(items) = output.json["vulnerabilities"].as_array() {
        for item in items {
            if let Some(finding) = parse_vulnerability(item) {
                contribution.findings.push(finding);
            }
        }
    }
    contribution.score = output.json["securityScore"].as_u64().map(clamp_score);
    contribution
}

fn parse_vulnerability(item: &Value) -> Option<Finding> {
    let title = item["title"].as_str()?.to_string();
    let category = item["category"]
        .as_str()
        .or_else(|| item["type"].as_str())
        .unwrap_or("other")
        .to_string();

    Some(Finding {
        category,
        severity: Severity::parse_lenient(item["severity"].as_str().unwrap_or("")),
        title,
        description: item["description"].as_str().unwrap_or("").to_string(),
        location: item["location"].as_str().map(String::from),
        confidence: item["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0),
        agent: AgentKind::Security,
        remediation: item["remediation"].as_str().unwrap_or("").to_string(),
        gas_savings: None,
    })
}
