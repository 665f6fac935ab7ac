use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use solaudit::db::Database;
use solaudit::errors::AuditError;
use solaudit::llm::{ChatCompletion, ChatResponse, ModelClient};
use solaudit::models::{
    AgentKind, AnalysisMode, AuditOptions, ExecutionStrategy, RiskLevel,
};
use solaudit::pipeline::Orchestrator;

/// Chat backend scripted per agent. The agent is recognized from the rubric
/// embedded in the prompt; `fail_agents` answers with a non-retryable error,
/// `stall_agents` never resolves at all.
struct ScriptedChat {
    calls: AtomicUsize,
    fail_agents: Vec<AgentKind>,
    stall_agents: Vec<AgentKind>,
}

impl ScriptedChat {
    fn new(fail_agents: Vec<AgentKind>) -> Self {
        Self { calls: AtomicUsize::new(0), fail_agents, stall_agents: vec![] }
    }

    fn stalling(stall_agents: Vec<AgentKind>) -> Self {
        Self { calls: AtomicUsize::new(0), fail_agents: vec![], stall_agents }
    }

    fn agent_for_prompt(prompt: &str) -> AgentKind {
        if prompt.contains("securityScore") {
            AgentKind::Security
        } else if prompt.contains("gasScore") {
            AgentKind::GasOptimizer
        } else {
            AgentKind::Tokenomics
        }
    }

    fn response_for(agent: AgentKind) -> String {
        match agent {
            AgentKind::Security => json!({
                "vulnerabilities": [{
                    "category": "reentrancy",
                    "severity": "critical",
                    "title": "Reentrant withdrawal",
                    "description": "Balance cleared after the external call.",
                    "location": "line 5",
                    "confidence": 0.9,
                    "remediation": "Zero the balance before transferring."
                }],
                "securityScore": 35,
                "riskLevel": "critical"
            })
            .to_string(),
            AgentKind::GasOptimizer => json!({
                "optimizations": [{
                    "category": "loop",
                    "title": "Cache array length",
                    "location": "line 9",
                    "gasSavings": 2100,
                    "confidence": 0.8
                }],
                "gasScore": 75,
                "totalSavings": 2100
            })
            .to_string(),
            AgentKind::Tokenomics => json!({
                "tokenomicsFindings": [],
                "tokenomicsScore": 80,
                "overallRisk": "low"
            })
            .to_string(),
        }
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        _system: Option<&str>,
    ) -> Result<ChatResponse, AuditError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let agent = Self::agent_for_prompt(prompt);
        if self.fail_agents.contains(&agent) {
            return Err(AuditError::Authentication("scripted failure".into()));
        }
        if self.stall_agents.contains(&agent) {
            std::future::pending::<()>().await;
        }
        Ok(ChatResponse {
            content: Self::response_for(agent),
            input_tokens: Some(500),
            output_tokens: Some(120),
            cost_usd: Some(0.02),
            model: model_id.to_string(),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

const VULNERABLE_CONTRACT: &str = r#"
contract Vault {
    mapping(address => uint256) public balances;

    function withdraw() public {
        (bool ok,) = msg.sender.call{value: balances[msg.sender]}("");
        require(ok);
        balances[msg.sender] = 0;
    }
}
"#;

fn orchestrator(chat: Arc<ScriptedChat>) -> Orchestrator {
    Orchestrator::new(Arc::new(ModelClient::new(chat)))
}

#[tokio::test]
async fn test_quick_mode_selects_security_and_finds_reentrancy() {
    let chat = Arc::new(ScriptedChat::new(vec![]));
    let db = Database::in_memory().unwrap();
    let orch = orchestrator(chat.clone()).with_database(db.clone());

    let options = AuditOptions { mode: AnalysisMode::Quick, ..Default::default() };
    let report = orch.analyze_contract(VULNERABLE_CONTRACT, &options).await.unwrap();

    assert_eq!(report.agents_used, vec![AgentKind::Security]);
    assert!(report.findings.iter().any(|f| f.category == "reentrancy"));
    assert_eq!(report.risk_level, RiskLevel::Critical);
    assert!(report.failed_agents.is_empty());

    // security panel is three models wide
    assert_eq!(chat.calls.load(Ordering::SeqCst), 3);

    let persisted = db.get_report(&report.audit_id).unwrap().unwrap();
    assert_eq!(persisted.overall_score, report.overall_score);
}

#[tokio::test]
async fn test_optional_agent_failure_is_tolerated() {
    let chat = Arc::new(ScriptedChat::new(vec![AgentKind::GasOptimizer]));
    let orch = orchestrator(chat);

    let options = AuditOptions { mode: AnalysisMode::Standard, ..Default::default() };
    let report = orch.analyze_contract(VULNERABLE_CONTRACT, &options).await.unwrap();

    assert!(report.findings.iter().any(|f| f.agent == AgentKind::Security));
    assert_eq!(report.failed_agents.len(), 1);
    assert_eq!(report.failed_agents[0].agent, AgentKind::GasOptimizer);
    assert_eq!(report.gas_score, None);
    assert_eq!(report.security_score, Some(35));
}

#[tokio::test]
async fn test_optional_agent_timeout_is_recorded() {
    let chat = Arc::new(ScriptedChat::stalling(vec![AgentKind::GasOptimizer]));
    let orch = orchestrator(chat).with_agent_timeout(Duration::from_millis(200));

    let options = AuditOptions { mode: AnalysisMode::Standard, ..Default::default() };
    let report = orch.analyze_contract(VULNERABLE_CONTRACT, &options).await.unwrap();

    assert_eq!(report.failed_agents.len(), 1);
    assert_eq!(report.failed_agents[0].agent, AgentKind::GasOptimizer);
    assert!(report.failed_agents[0].error.contains("timed out"));
    assert_eq!(report.security_score, Some(35));
    assert_eq!(report.gas_score, None);
}

#[tokio::test]
async fn test_required_agent_timeout_aborts() {
    let chat = Arc::new(ScriptedChat::stalling(vec![AgentKind::Security]));
    let orch = orchestrator(chat).with_agent_timeout(Duration::from_millis(200));

    let options = AuditOptions { mode: AnalysisMode::Standard, ..Default::default() };
    let err = orch.analyze_contract(VULNERABLE_CONTRACT, &options).await.unwrap_err();
    assert!(matches!(err, AuditError::AgentTimeout { .. }));
}

#[tokio::test]
async fn test_required_agent_failure_aborts() {
    let chat = Arc::new(ScriptedChat::new(vec![AgentKind::Security]));
    let db = Database::in_memory().unwrap();
    let orch = orchestrator(chat).with_database(db.clone());

    let options = AuditOptions {
        audit_id: Some("abort-1".into()),
        mode: AnalysisMode::Standard,
        ..Default::default()
    };
    let err = orch.analyze_contract(VULNERABLE_CONTRACT, &options).await.unwrap_err();
    assert!(matches!(err, AuditError::NoValidAnalysis(_)));

    let rows = db.list_audits(10, 0).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "failed");
    assert_eq!(rows[0].audit_id, "abort-1");
}

#[tokio::test]
async fn test_validation_rejects_before_any_model_call() {
    let chat = Arc::new(ScriptedChat::new(vec![]));
    let orch = orchestrator(chat.clone());

    let oversized = " ".repeat(2_000_000);
    for source in ["", "short", oversized.as_str()] {
        let err = orch.analyze_contract(source, &AuditOptions::default()).await.unwrap_err();
        assert!(matches!(err, AuditError::Validation(_)));
    }
    assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_comprehensive_small_contract_runs_parallel() {
    let chat = Arc::new(ScriptedChat::new(vec![]));
    let orch = orchestrator(chat);

    let options = AuditOptions { mode: AnalysisMode::Comprehensive, ..Default::default() };
    let report = orch.analyze_contract(VULNERABLE_CONTRACT, &options).await.unwrap();

    assert_eq!(report.strategy, ExecutionStrategy::Parallel);
    assert_eq!(report.agents_used.len(), 3);
    assert_eq!(report.agent_executions.len(), 3);
    // mean of 35, 75, 80
    assert_eq!(report.overall_score, 63);
}

#[tokio::test]
async fn test_explicit_strategy_override_is_honored() {
    let chat = Arc::new(ScriptedChat::new(vec![]));
    let orch = orchestrator(chat);

    let options = AuditOptions {
        mode: AnalysisMode::Comprehensive,
        strategy: Some(ExecutionStrategy::Sequential),
        ..Default::default()
    };
    let report = orch.analyze_contract(VULNERABLE_CONTRACT, &options).await.unwrap();
    assert_eq!(report.strategy, ExecutionStrategy::Sequential);
    // sequential order respects the dependency table
    assert_eq!(report.agent_executions[0].agent, AgentKind::Security);
}

#[tokio::test]
async fn test_scores_stay_within_bounds() {
    let chat = Arc::new(ScriptedChat::new(vec![]));
    let orch = orchestrator(chat);

    let options = AuditOptions { mode: AnalysisMode::Comprehensive, ..Default::default() };
    let report = orch.analyze_contract(VULNERABLE_CONTRACT, &options).await.unwrap();

    assert!(report.overall_score <= 100);
    for execution in &report.agent_executions {
        assert!(execution.score <= 100);
    }
}
