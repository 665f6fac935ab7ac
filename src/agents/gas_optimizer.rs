use serde_json::Value;

use crate::llm::ModelOutput;
use crate::models::{AgentKind, Finding, Severity};

use super::{clamp_score, ModelContribution};

/// Parse one model's gas-optimization response. Optimizations carry a savings
/// estimate instead of a severity; reported severity defaults to Info.
pub fn parse(output: &ModelOutput) -> ModelContribution {
    let mut contribution = ModelContribution::default();

    if let Some(items) = output.json["optimizations"].as_array() {
        for item in items {
            if let Some(finding) = parse_optimization(item) {
                contribution.findings.push(finding);
            }
        }
    }
    contribution.score = output.json["gasScore"].as_u64().map(clamp_score);
    contribution.total_savings = output.json["totalSavings"].as_u64();
    contribution
}

fn parse_optimization(item: &Value) -> Option<Finding> {
    let title = item["title"].as_str()?.to_string();
    let category = item["category"]
        .as_str()
        .or_else(|| item["type"].as_str())
        .unwrap_or("other")
        .to_string();

    Some(Finding {
        category,
        severity: item["severity"]
            .as_str()
            .map(Severity::parse_lenient)
            .unwrap_or(Severity::Info),
        title,
        description: item["description"].as_str().unwrap_or("").to_string(),
        location: item["location"].as_str().map(String::from),
        confidence: item["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0),
        agent: AgentKind::GasOptimizer,
        remediation: item["remediation"].as_str().unwrap_or("").to_string(),
        gas_savings: item["gasSavings"].as_u64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(json: Value) -> ModelOutput {
        ModelOutput {
            model: "test/model".into(),
            json,
            tokens_used: 10,
            cost_usd: None,
        }
    }

    #[test]
    fn test_parse_optimizations_with_savings() {
        let c = parse(&output(serde_json::json!({
            "optimizations": [{
                "category": "storage-packing",
                "title": "Pack owner and paused flag",
                "location": "struct Config",
                "gasSavings": 20000,
                "confidence": 0.85
            }],
            "gasScore": 70,
            "totalSavings": 20000
        })));
        assert_eq!(c.findings.len(), 1);
        assert_eq!(c.findings[0].gas_savings, Some(20000));
        assert_eq!(c.findings[0].severity, Severity::Info);
        assert_eq!(c.score, Some(70));
        assert_eq!(c.total_savings, Some(20000));
    }

    #[test]
    fn test_missing_arrays_are_empty() {
        let c = parse(&output(serde_json::json!({"gasScore": 95})));
        assert!(c.findings.is_empty());
        assert_eq!(c.score, Some(95));
        assert_eq!(c.total_savings, None);
    }
}
