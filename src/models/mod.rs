pub mod agent_result;
pub mod finding;
pub mod report;
pub mod request;

pub use agent_result::{risk_from_counts, AgentResult, AgentStatus, RiskLevel};
pub use finding::{dedup_findings, sort_findings, Finding, Severity};
pub use report::{AggregatedReport, AgentExecution, CorroboratedGroup, CrossValidation, FailedAgent};
pub use request::{AgentKind, AnalysisMode, AnalysisRequest, AuditOptions, ExecutionStrategy};
