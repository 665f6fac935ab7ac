use std::sync::LazyLock;

use crate::models::AgentKind;

/// Static description of one specialized agent: the model panel it queries,
/// its execution budget, and its place in the dependency order.
pub struct AgentDefinition {
    pub kind: AgentKind,
    pub display_name: &'static str,
    pub version: &'static str,
    /// Models queried for consensus, in priority order.
    pub models: &'static [&'static str],
    pub timeout_secs: u64,
    /// A required agent's failure aborts the whole audit; an optional one is
    /// recorded and skipped.
    pub required: bool,
    /// Agents whose results must be available before this one runs in
    /// sequential and adaptive strategies.
    pub prerequisites: &'static [AgentKind],
}

pub static AGENT_REGISTRY: LazyLock<Vec<AgentDefinition>> = LazyLock::new(|| {
    vec![
        AgentDefinition {
            kind: AgentKind::Security,
            display_name: "Security analyzer",
            version: "2.1.0",
            models: &[
                "anthropic/claude-3.5-sonnet",
                "openai/gpt-4-turbo",
                "google/gemini-pro-1.5",
            ],
            timeout_secs: 120,
            required: true,
            prerequisites: &[],
        },
        AgentDefinition {
            kind: AgentKind::GasOptimizer,
            display_name: "Gas optimizer",
            version: "1.4.0",
            models: &["anthropic/claude-3.5-sonnet", "openai/gpt-4-turbo"],
            timeout_secs: 90,
            required: false,
            prerequisites: &[AgentKind::Security],
        },
        AgentDefinition {
            kind: AgentKind::Tokenomics,
            display_name: "Tokenomics analyzer",
            version: "1.2.0",
            models: &["anthropic/claude-3.5-sonnet", "openai/gpt-4-turbo"],
            timeout_secs: 100,
            required: false,
            prerequisites: &[AgentKind::Security],
        },
    ]
});

pub fn definition_for(kind: AgentKind) -> &'static AgentDefinition {
    AGENT_REGISTRY
        .iter()
        .find(|d| d.kind == kind)
        .unwrap_or_else(|| unreachable!("every AgentKind has a registry entry"))
}
