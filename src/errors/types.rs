use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// Fatal input rejection: empty, undersized, oversized, or non-contract source.
    #[error("Validation error: {0}")]
    Validation(String),

    /// All retry attempts for one model exhausted. Carries the last underlying error.
    #[error("Model call failed: {model} after {attempts} attempts: {last_error}")]
    ModelCallFailed {
        model: String,
        attempts: u32,
        last_error: String,
    },

    /// Every model call for an agent failed; the agent produced nothing usable.
    #[error("No valid analysis from any model for agent: {0}")]
    NoValidAnalysis(String),

    /// An agent exceeded its per-agent execution deadline.
    #[error("Agent timed out: {agent} after {timeout_secs}s")]
    AgentTimeout { agent: String, timeout_secs: u64 },

    #[error("Knowledge retrieval error: {0}")]
    Knowledge(String),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Rate limited: {0}")]
    RateLimit(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
