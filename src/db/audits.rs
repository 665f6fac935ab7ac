use chrono::Utc;

use crate::errors::AuditError;
use crate::models::{AggregatedReport, Severity};

use super::Database;

/// Compact row used by history listings; the full report lives in
/// `report_json`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditRow {
    pub audit_id: String,
    pub user_id: Option<String>,
    pub analysis_mode: String,
    pub status: String,
    pub overall_score: Option<u8>,
    pub risk_level: Option<String>,
    pub error_message: Option<String>,
    pub completed_at: String,
}

impl Database {
    /// Persist one completed report. One row per audit id, written once.
    pub fn record_report(&self, report: &AggregatedReport) -> Result<(), AuditError> {
        let counts = report.severity_counts();
        let count = |s: Severity| *counts.get(&s).unwrap_or(&0) as i64;
        let agents_used = report
            .agents_used
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let total_cost: Option<f64> = report
            .agent_executions
            .iter()
            .filter_map(|e| e.cost_usd)
            .reduce(|a, b| a + b);
        let report_json = serde_json::to_string(report)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO audits (audit_id, user_id, analysis_mode, strategy, agents_used, status,
                overall_score, security_score, gas_score, tokenomics_score, risk_level,
                finding_count_critical, finding_count_high, finding_count_medium,
                finding_count_low, finding_count_info, total_cost_usd, analysis_duration_ms,
                report_json, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'completed', ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            rusqlite::params![
                report.audit_id,
                report.user_id,
                report.mode.as_str(),
                report.strategy.to_string(),
                agents_used,
                report.overall_score,
                report.security_score,
                report.gas_score,
                report.tokenomics_score,
                report.risk_level.to_string(),
                count(Severity::Critical),
                count(Severity::High),
                count(Severity::Medium),
                count(Severity::Low),
                count(Severity::Info),
                total_cost,
                report.analysis_duration_ms as i64,
                report_json,
                report.completed_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AuditError::Database(format!("Failed to record report: {}", e)))?;
        Ok(())
    }

    /// Persist a minimal failure row for a request that never produced a
    /// report.
    pub fn record_failure(
        &self,
        audit_id: &str,
        user_id: Option<&str>,
        mode: &str,
        error_message: &str,
    ) -> Result<(), AuditError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO audits (audit_id, user_id, analysis_mode, status, error_message, completed_at)
             VALUES (?1, ?2, ?3, 'failed', ?4, ?5)",
            rusqlite::params![audit_id, user_id, mode, error_message, Utc::now().to_rfc3339()],
        )
        .map_err(|e| AuditError::Database(format!("Failed to record failure: {}", e)))?;
        Ok(())
    }

    pub fn get_report(&self, audit_id: &str) -> Result<Option<AggregatedReport>, AuditError> {
        let conn = self.conn.lock().unwrap();
        let result: Result<Option<String>, rusqlite::Error> = conn.query_row(
            "SELECT report_json FROM audits WHERE audit_id = ?1",
            rusqlite::params![audit_id],
            |row| row.get(0),
        );
        match result {
            Ok(Some(json)) => Ok(Some(serde_json::from_str(&json)?)),
            Ok(None) => Ok(None),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AuditError::Database(format!("Query error: {}", e))),
        }
    }

    pub fn list_audits(&self, limit: usize, offset: usize) -> Result<Vec<AuditRow>, AuditError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT audit_id, user_id, analysis_mode, status, overall_score, risk_level,
                        error_message, completed_at
                 FROM audits ORDER BY completed_at DESC LIMIT ?1 OFFSET ?2",
            )
            .map_err(|e| AuditError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt
            .query_map(rusqlite::params![limit as i64, offset as i64], |row| {
                Ok(AuditRow {
                    audit_id: row.get(0)?,
                    user_id: row.get(1)?,
                    analysis_mode: row.get(2)?,
                    status: row.get(3)?,
                    overall_score: row.get::<_, Option<i64>>(4)?.map(|v| v as u8),
                    risk_level: row.get(5)?,
                    error_message: row.get(6)?,
                    completed_at: row.get(7)?,
                })
            })
            .map_err(|e| AuditError::Database(format!("Query failed: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AuditError::Database(format!("Row error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AgentKind, AnalysisMode, CrossValidation, ExecutionStrategy, RiskLevel,
    };
    use std::collections::HashMap;

    fn sample_report(audit_id: &str) -> AggregatedReport {
        AggregatedReport {
            audit_id: audit_id.into(),
            user_id: Some("u-1".into()),
            mode: AnalysisMode::Standard,
            strategy: ExecutionStrategy::Parallel,
            agents_used: vec![AgentKind::Security],
            findings: vec![],
            security_score: Some(70),
            gas_score: None,
            tokenomics_score: None,
            overall_score: 70,
            risk_level: RiskLevel::Low,
            cross_validation: CrossValidation {
                corroborated: vec![],
                total_findings: 0,
                confidence_ratio: 0.0,
            },
            recommendations: vec![],
            code_insights: HashMap::new(),
            agent_executions: vec![],
            failed_agents: vec![],
            knowledge_degraded: false,
            analysis_duration_ms: 1234,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_and_fetch_report() {
        let db = Database::in_memory().unwrap();
        db.record_report(&sample_report("a-1")).unwrap();

        let report = db.get_report("a-1").unwrap().unwrap();
        assert_eq!(report.audit_id, "a-1");
        assert_eq!(report.overall_score, 70);
        assert!(db.get_report("missing").unwrap().is_none());
    }

    #[test]
    fn test_record_failure_row() {
        let db = Database::in_memory().unwrap();
        db.record_failure("a-2", Some("u-1"), "quick", "Validation error: Source is empty")
            .unwrap();

        let rows = db.list_audits(10, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "failed");
        assert!(rows[0].error_message.as_deref().unwrap().contains("empty"));
    }

    #[test]
    fn test_list_audits_orders_newest_first() {
        let db = Database::in_memory().unwrap();
        let mut older = sample_report("a-old");
        older.completed_at = Utc::now() - chrono::Duration::hours(1);
        db.record_report(&older).unwrap();
        db.record_report(&sample_report("a-new")).unwrap();

        let rows = db.list_audits(10, 0).unwrap();
        assert_eq!(rows[0].audit_id, "a-new");
        assert_eq!(rows[1].audit_id, "a-old");
    }
}
