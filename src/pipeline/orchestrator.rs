use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::agents::{definition_for, run_agent};
use crate::db::Database;
use crate::errors::AuditError;
use crate::knowledge::{KnowledgeBundle, KnowledgeRetriever};
use crate::llm::ModelClient;
use crate::models::{
    AgentKind, AgentResult, AggregatedReport, AnalysisRequest, AuditOptions, ExecutionStrategy,
    FailedAgent,
};

use super::aggregation::aggregate;
use super::state::{RequestPhase, RequestTracker};
use super::strategy::select_strategy;
use super::validation::validate_source;

/// Drives one audit request through validation, agent selection, knowledge
/// enrichment, scheduled execution, aggregation, and best-effort persistence.
///
/// The caller always gets either a complete [`AggregatedReport`] or one
/// descriptive error; never a partial report.
pub struct Orchestrator {
    client: Arc<ModelClient>,
    retriever: Option<Arc<KnowledgeRetriever>>,
    db: Option<Database>,
    tracker: RequestTracker,
    agent_timeout_override: Option<Duration>,
}

struct ExecutionOutcome {
    results: Vec<AgentResult>,
    failed: Vec<FailedAgent>,
}

impl Orchestrator {
    pub fn new(client: Arc<ModelClient>) -> Self {
        Self {
            client,
            retriever: None,
            db: None,
            tracker: RequestTracker::new(),
            agent_timeout_override: None,
        }
    }

    pub fn with_retriever(mut self, retriever: Arc<KnowledgeRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    /// Replace every agent's registry deadline with one fixed duration.
    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout_override = Some(timeout);
        self
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    pub async fn analyze_contract(
        &self,
        source: &str,
        options: &AuditOptions,
    ) -> Result<AggregatedReport, AuditError> {
        let request = AnalysisRequest::new(source, options);
        let started = Instant::now();
        self.tracker.start(&request.audit_id, request.mode);
        info!(audit_id = %request.audit_id, mode = %request.mode, "Audit started");

        let outcome = self.run_pipeline(&request, options, started).await;

        self.tracker.set_phase(&request.audit_id, RequestPhase::Persisting);
        match &outcome {
            Ok(report) => self.persist_report(report),
            Err(e) => self.persist_failure(&request, e),
        }
        self.tracker.finish(&request.audit_id);
        outcome
    }

    async fn run_pipeline(
        &self,
        request: &AnalysisRequest,
        options: &AuditOptions,
        started: Instant,
    ) -> Result<AggregatedReport, AuditError> {
        validate_source(&request.source)?;

        self.tracker.set_phase(&request.audit_id, RequestPhase::SelectingAgents);
        let agents = select_agents(request);

        self.tracker.set_phase(&request.audit_id, RequestPhase::Enriching);
        let knowledge = match (&self.retriever, options.skip_knowledge) {
            (Some(retriever), false) => {
                retriever.contextual_knowledge(&request.source, request.mode).await
            }
            _ => KnowledgeBundle::empty(),
        };

        let strategy = request
            .strategy
            .unwrap_or_else(|| select_strategy(&request.source, request.mode, &agents));

        self.tracker.set_phase(&request.audit_id, RequestPhase::Executing);
        let outcome = match strategy {
            ExecutionStrategy::Parallel => self.execute_parallel(request, &agents, &knowledge).await?,
            ExecutionStrategy::Sequential => {
                self.execute_sequential(request, &agents, &knowledge).await?
            }
            ExecutionStrategy::Adaptive => self.execute_adaptive(request, &agents, &knowledge).await?,
        };

        self.tracker.set_phase(&request.audit_id, RequestPhase::Aggregating);
        let report = aggregate(
            request,
            strategy,
            agents,
            &outcome.results,
            outcome.failed,
            knowledge.fallback,
            started.elapsed().as_millis() as u64,
        );
        info!(
            audit_id = %request.audit_id,
            findings = report.findings.len(),
            overall_score = report.overall_score,
            risk = %report.risk_level,
            "Audit aggregated"
        );
        Ok(report)
    }

    /// One agent execution raced against its deadline, the registry value
    /// unless overridden. A future that outlives the race is dropped, not
    /// surfaced.
    async fn run_timed(
        &self,
        kind: AgentKind,
        request: &AnalysisRequest,
        knowledge: &KnowledgeBundle,
        prior: &[AgentResult],
    ) -> Result<AgentResult, AuditError> {
        let def = definition_for(kind);
        let deadline = self
            .agent_timeout_override
            .unwrap_or_else(|| Duration::from_secs(def.timeout_secs));
        match timeout(
            deadline,
            run_agent(kind, &self.client, &request.source, knowledge, prior),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AuditError::AgentTimeout {
                agent: kind.to_string(),
                timeout_secs: deadline.as_secs(),
            }),
        }
    }

    async fn execute_parallel(
        &self,
        request: &AnalysisRequest,
        agents: &[AgentKind],
        knowledge: &KnowledgeBundle,
    ) -> Result<ExecutionOutcome, AuditError> {
        let futures: Vec<_> = agents
            .iter()
            .map(|&kind| async move { (kind, self.run_timed(kind, request, knowledge, &[]).await) })
            .collect();

        let mut outcome = ExecutionOutcome { results: Vec::new(), failed: Vec::new() };
        for (kind, result) in join_all(futures).await {
            match result {
                Ok(r) => outcome.results.push(r),
                Err(e) if definition_for(kind).required => return Err(e),
                Err(e) => {
                    warn!(agent = %kind, error = %e, "Optional agent failed");
                    outcome.failed.push(FailedAgent { agent: kind, error: e.to_string() });
                }
            }
        }
        Ok(outcome)
    }

    async fn execute_sequential(
        &self,
        request: &AnalysisRequest,
        agents: &[AgentKind],
        knowledge: &KnowledgeBundle,
    ) -> Result<ExecutionOutcome, AuditError> {
        let mut outcome = ExecutionOutcome { results: Vec::new(), failed: Vec::new() };
        let mut completed: HashSet<AgentKind> = HashSet::new();

        for kind in topo_order(agents) {
            let def = definition_for(kind);
            let blocked = def
                .prerequisites
                .iter()
                .any(|p| agents.contains(p) && !completed.contains(p));
            if blocked {
                warn!(agent = %kind, "Skipping agent: prerequisite did not complete");
                outcome.failed.push(FailedAgent {
                    agent: kind,
                    error: "Skipped: prerequisite agent did not complete".into(),
                });
                continue;
            }

            match self.run_timed(kind, request, knowledge, &outcome.results).await {
                Ok(r) => {
                    completed.insert(kind);
                    outcome.results.push(r);
                }
                Err(e) if def.required => return Err(e),
                Err(e) => {
                    warn!(agent = %kind, error = %e, "Optional agent failed");
                    outcome.failed.push(FailedAgent { agent: kind, error: e.to_string() });
                }
            }
        }
        Ok(outcome)
    }

    /// Required agents race in parallel first; optional agents then run
    /// sequentially with the required results as prompt context.
    async fn execute_adaptive(
        &self,
        request: &AnalysisRequest,
        agents: &[AgentKind],
        knowledge: &KnowledgeBundle,
    ) -> Result<ExecutionOutcome, AuditError> {
        let (required, optional): (Vec<AgentKind>, Vec<AgentKind>) =
            agents.iter().copied().partition(|&k| definition_for(k).required);

        let mut outcome = self.execute_parallel(request, &required, knowledge).await?;

        let mut completed: HashSet<AgentKind> = outcome.results.iter().map(|r| r.agent).collect();
        for kind in topo_order(&optional) {
            let def = definition_for(kind);
            let blocked = def
                .prerequisites
                .iter()
                .any(|p| agents.contains(p) && !completed.contains(p));
            if blocked {
                outcome.failed.push(FailedAgent {
                    agent: kind,
                    error: "Skipped: prerequisite agent did not complete".into(),
                });
                continue;
            }

            match self.run_timed(kind, request, knowledge, &outcome.results).await {
                Ok(r) => {
                    completed.insert(kind);
                    outcome.results.push(r);
                }
                Err(e) => {
                    warn!(agent = %kind, error = %e, "Optional agent failed");
                    outcome.failed.push(FailedAgent { agent: kind, error: e.to_string() });
                }
            }
        }
        Ok(outcome)
    }

    fn persist_report(&self, report: &AggregatedReport) {
        if let Some(db) = &self.db {
            if let Err(e) = db.record_report(report) {
                warn!(audit_id = %report.audit_id, error = %e, "Failed to persist report");
            }
        }
    }

    fn persist_failure(&self, request: &AnalysisRequest, error: &AuditError) {
        if let Some(db) = &self.db {
            if let Err(e) = db.record_failure(
                &request.audit_id,
                request.user_id.as_deref(),
                request.mode.as_str(),
                &error.to_string(),
            ) {
                warn!(audit_id = %request.audit_id, error = %e, "Failed to persist failure row");
            }
        }
    }
}

/// Explicit request list wins; otherwise the mode's default set.
fn select_agents(request: &AnalysisRequest) -> Vec<AgentKind> {
    match &request.agents {
        Some(agents) if !agents.is_empty() => {
            let mut seen = HashSet::new();
            agents.iter().copied().filter(|k| seen.insert(*k)).collect()
        }
        _ => request.mode.default_agents(),
    }
}

/// Order agents so every selected prerequisite precedes its dependents.
/// Prerequisites outside the selection are ignored.
fn topo_order(agents: &[AgentKind]) -> Vec<AgentKind> {
    let mut remaining: Vec<AgentKind> = agents.to_vec();
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let next = remaining.iter().position(|&k| {
            definition_for(k)
                .prerequisites
                .iter()
                .all(|p| !remaining.contains(p))
        });
        match next {
            Some(i) => order.push(remaining.remove(i)),
            // registry is acyclic; this arm only guards against future edits
            None => {
                order.append(&mut remaining);
            }
        }
    }
    order
}
