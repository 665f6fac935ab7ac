//! Deterministic pattern analysis. Pure regex/string scanning over the
//! source text: same input, same output, no network.

pub mod gas;
pub mod gas_costs;
pub mod security;
pub mod struct_packing;
pub mod tokenomics;

use std::collections::HashMap;

use crate::models::{AgentKind, Finding};

/// Output of one pattern scan: heuristic findings plus numeric estimates
/// that feed both the agent prompt and the final report's code insights.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub estimates: HashMap<String, f64>,
}

/// Run the rule set belonging to the given agent.
pub fn scan_for(agent: AgentKind, source: &str) -> ScanReport {
    match agent {
        AgentKind::Security => security::scan(source),
        AgentKind::GasOptimizer => gas::scan(source),
        AgentKind::Tokenomics => tokenomics::scan(source),
    }
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(source: &str, byte_idx: usize) -> usize {
    source[..byte_idx.min(source.len())].bytes().filter(|&b| b == b'\n').count() + 1
}

pub(crate) fn location_at(source: &str, byte_idx: usize) -> Option<String> {
    Some(format!("line {}", line_of(source, byte_idx)))
}
