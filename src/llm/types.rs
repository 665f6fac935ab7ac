use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub cost_usd: Option<f64>,
    pub model: String,
}

impl ChatResponse {
    pub fn tokens_total(&self) -> u64 {
        self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0)
    }
}

/// One model's successfully parsed contribution to an agent run.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    pub model: String,
    pub json: serde_json::Value,
    pub tokens_used: u64,
    pub cost_usd: Option<f64>,
}
