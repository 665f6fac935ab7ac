pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS audits (
    audit_id TEXT PRIMARY KEY,
    user_id TEXT,
    analysis_mode TEXT NOT NULL DEFAULT 'standard',
    strategy TEXT,
    agents_used TEXT,
    status TEXT NOT NULL,
    overall_score INTEGER,
    security_score INTEGER,
    gas_score INTEGER,
    tokenomics_score INTEGER,
    risk_level TEXT,
    finding_count_critical INTEGER DEFAULT 0,
    finding_count_high INTEGER DEFAULT 0,
    finding_count_medium INTEGER DEFAULT 0,
    finding_count_low INTEGER DEFAULT 0,
    finding_count_info INTEGER DEFAULT 0,
    total_cost_usd REAL,
    analysis_duration_ms INTEGER DEFAULT 0,
    report_json TEXT,
    error_message TEXT,
    completed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audits_user ON audits(user_id);
CREATE INDEX IF NOT EXISTS idx_audits_status ON audits(status);
CREATE INDEX IF NOT EXISTS idx_audits_completed ON audits(completed_at);
";
