use clap::{Args, Parser, Subcommand};

use crate::errors::AuditError;
use crate::models::{AgentKind, AnalysisMode, ExecutionStrategy};

const GIT_HASH: &str = match option_env!("GIT_HASH") {
    Some(hash) => hash,
    None => "unknown",
};

/// Version string for `--version`: crate version plus the commit and build
/// timestamp embedded by the build script.
fn long_version() -> String {
    format!(
        "{} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        GIT_HASH,
        env!("BUILD_TIMESTAMP")
    )
}

#[derive(Parser)]
#[command(
    name = "solaudit",
    version,
    long_version = &*long_version().leak(),
    about = "Multi-agent smart contract auditor"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full multi-agent audit against a contract file
    Audit(AuditArgs),
    /// Run only the offline pattern scan (no network)
    Scan(ScanArgs),
    /// List persisted audits or show one report
    History(HistoryArgs),
}

#[derive(Args, Clone)]
pub struct AuditArgs {
    /// Path to the Solidity source file
    #[arg(short, long)]
    pub file: String,

    /// Analysis mode: quick, comprehensive, defi-focused, security-only,
    /// gas-optimization, standard
    #[arg(short, long, default_value = "standard")]
    pub mode: String,

    /// Comma-separated explicit agent list (security, gas-optimizer, tokenomics)
    #[arg(long)]
    pub agents: Option<String>,

    /// Execution strategy override: parallel, sequential, adaptive
    #[arg(long)]
    pub strategy: Option<String>,

    /// Correlation id; generated when omitted
    #[arg(long)]
    pub audit_id: Option<String>,

    /// User id recorded with the audit
    #[arg(long)]
    pub user: Option<String>,

    /// SQLite database path for report persistence
    #[arg(long, default_value = "solaudit.db")]
    pub db: String,

    /// Skip report persistence entirely
    #[arg(long)]
    pub no_db: bool,

    /// Skip the knowledge-enrichment step
    #[arg(long)]
    pub no_knowledge: bool,

    /// JSON file with knowledge documents to embed and search
    #[arg(long)]
    pub knowledge: Option<String>,

    /// Write the markdown report to this path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the raw report JSON instead of the styled summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Path to the Solidity source file
    #[arg(short, long)]
    pub file: String,

    /// Comma-separated agent rule sets to run; defaults to all
    #[arg(long)]
    pub agents: Option<String>,

    /// Print findings as JSON
    #[arg(long)]
    pub json: bool,

    /// Append the fixed gas cost table the estimates are based on
    #[arg(long)]
    pub costs: bool,
}

#[derive(Args, Clone)]
pub struct HistoryArgs {
    /// SQLite database path
    #[arg(long, default_value = "solaudit.db")]
    pub db: String,

    /// Show the full report for one audit id
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

pub fn parse_mode(s: &str) -> Result<AnalysisMode, AuditError> {
    match s {
        "quick" => Ok(AnalysisMode::Quick),
        "comprehensive" => Ok(AnalysisMode::Comprehensive),
        "defi-focused" => Ok(AnalysisMode::DefiFocused),
        "security-only" => Ok(AnalysisMode::SecurityOnly),
        "gas-optimization" => Ok(AnalysisMode::GasOptimization),
        "standard" => Ok(AnalysisMode::Standard),
        other => Err(AuditError::Config(format!("Unknown analysis mode: {}", other))),
    }
}

pub fn parse_strategy(s: &str) -> Result<ExecutionStrategy, AuditError> {
    match s {
        "parallel" => Ok(ExecutionStrategy::Parallel),
        "sequential" => Ok(ExecutionStrategy::Sequential),
        "adaptive" => Ok(ExecutionStrategy::Adaptive),
        other => Err(AuditError::Config(format!("Unknown strategy: {}", other))),
    }
}

pub fn parse_agent_list(s: &str) -> Result<Vec<AgentKind>, AuditError> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p {
            "security" => Ok(AgentKind::Security),
            "gas-optimizer" => Ok(AgentKind::GasOptimizer),
            "tokenomics" => Ok(AgentKind::Tokenomics),
            other => Err(AuditError::Config(format!("Unknown agent: {}", other))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_round_trip() {
        for mode in [
            AnalysisMode::Quick,
            AnalysisMode::Comprehensive,
            AnalysisMode::DefiFocused,
            AnalysisMode::SecurityOnly,
            AnalysisMode::GasOptimization,
            AnalysisMode::Standard,
        ] {
            assert_eq!(parse_mode(mode.as_str()).unwrap(), mode);
        }
        assert!(parse_mode("bogus").is_err());
    }

    #[test]
    fn test_long_version_embeds_build_info() {
        let version = long_version();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.contains("built "));
    }

    #[test]
    fn test_parse_agent_list() {
        let agents = parse_agent_list("security, tokenomics").unwrap();
        assert_eq!(agents, vec![AgentKind::Security, AgentKind::Tokenomics]);
        assert!(parse_agent_list("security,unknown").is_err());
    }
}
