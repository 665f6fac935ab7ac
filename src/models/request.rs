use serde::{Deserialize, Serialize};

/// The closed set of specialized analysis agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    Security,
    GasOptimizer,
    Tokenomics,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::GasOptimizer => "gas-optimizer",
            Self::Tokenomics => "tokenomics",
        }
    }

    pub fn all() -> &'static [AgentKind] {
        &[Self::Security, Self::GasOptimizer, Self::Tokenomics]
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target analysis mode, mapping to a default agent set when the request
/// does not name agents explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    Quick,
    Comprehensive,
    DefiFocused,
    SecurityOnly,
    GasOptimization,
    #[default]
    Standard,
}

impl AnalysisMode {
    pub fn default_agents(&self) -> Vec<AgentKind> {
        match self {
            Self::Quick | Self::SecurityOnly => vec![AgentKind::Security],
            Self::Comprehensive => vec![
                AgentKind::Security,
                AgentKind::GasOptimizer,
                AgentKind::Tokenomics,
            ],
            Self::DefiFocused => vec![AgentKind::Security, AgentKind::Tokenomics],
            Self::GasOptimization => vec![AgentKind::GasOptimizer],
            Self::Standard => vec![AgentKind::Security, AgentKind::GasOptimizer],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Comprehensive => "comprehensive",
            Self::DefiFocused => "defi-focused",
            Self::SecurityOnly => "security-only",
            Self::GasOptimization => "gas-optimization",
            Self::Standard => "standard",
        }
    }
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How selected agents are scheduled relative to one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    Parallel,
    Sequential,
    Adaptive,
}

impl std::fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Parallel => "parallel",
            Self::Sequential => "sequential",
            Self::Adaptive => "adaptive",
        };
        f.write_str(s)
    }
}

/// Caller-supplied options for one audit invocation.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    pub audit_id: Option<String>,
    pub user_id: Option<String>,
    pub mode: AnalysisMode,
    /// Explicit agent list; takes precedence over the mode's default set.
    pub agents: Option<Vec<AgentKind>>,
    /// Explicit strategy override; bypasses complexity-based selection.
    pub strategy: Option<ExecutionStrategy>,
    /// Skip the knowledge-enrichment step.
    pub skip_knowledge: bool,
}

/// Immutable per-audit input, created once per invocation.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub audit_id: String,
    pub user_id: Option<String>,
    pub source: String,
    pub mode: AnalysisMode,
    pub agents: Option<Vec<AgentKind>>,
    pub strategy: Option<ExecutionStrategy>,
}

impl AnalysisRequest {
    pub fn new(source: &str, options: &AuditOptions) -> Self {
        Self {
            audit_id: options
                .audit_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: options.user_id.clone(),
            source: source.to_string(),
            mode: options.mode,
            agents: options.agents.clone(),
            strategy: options.strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_default_agent_sets() {
        assert_eq!(AnalysisMode::Quick.default_agents(), vec![AgentKind::Security]);
        assert_eq!(
            AnalysisMode::Comprehensive.default_agents(),
            vec![AgentKind::Security, AgentKind::GasOptimizer, AgentKind::Tokenomics]
        );
        assert_eq!(
            AnalysisMode::DefiFocused.default_agents(),
            vec![AgentKind::Security, AgentKind::Tokenomics]
        );
        assert_eq!(
            AnalysisMode::GasOptimization.default_agents(),
            vec![AgentKind::GasOptimizer]
        );
        assert_eq!(
            AnalysisMode::Standard.default_agents(),
            vec![AgentKind::Security, AgentKind::GasOptimizer]
        );
    }

    #[test]
    fn test_request_generates_audit_id() {
        let req = AnalysisRequest::new("contract A {}", &AuditOptions::default());
        assert!(!req.audit_id.is_empty());
    }

    #[test]
    fn test_request_keeps_explicit_audit_id() {
        let options = AuditOptions { audit_id: Some("audit-7".into()), ..Default::default() };
        let req = AnalysisRequest::new("contract A {}", &options);
        assert_eq!(req.audit_id, "audit-7");
    }
}
