use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{with_retry, AuditError, RetryConfig};

use super::provider::ChatCompletion;
use super::types::ModelOutput;

/// System instruction sent with every model call. The agents' prompts restate
/// the exact response shape per dimension.
const SYSTEM_INSTRUCTION: &str =
    "You are a smart contract auditing assistant. Respond only with valid JSON. \
     No prose, no markdown outside of a single JSON object.";

/// Retry-wrapped, JSON-enforcing client over a chat-completion backend.
///
/// One logical `call` issues up to `max_retries` attempts with linear backoff;
/// a response that does not parse as JSON counts as a failed attempt.
pub struct ModelClient {
    chat: Arc<dyn ChatCompletion>,
    retry: RetryConfig,
}

impl ModelClient {
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self { chat, retry: RetryConfig::default() }
    }

    pub fn with_retry_config(chat: Arc<dyn ChatCompletion>, retry: RetryConfig) -> Self {
        Self { chat, retry }
    }

    /// Call one model and parse its strict-JSON response.
    ///
    /// On exhaustion returns [`AuditError::ModelCallFailed`] carrying the last
    /// underlying error.
    pub async fn call(&self, model_id: &str, prompt: &str) -> Result<ModelOutput, AuditError> {
        let mut attempts = 0u32;
        let result = with_retry(model_id, &self.retry, || {
            attempts += 1;
            async move {
                let response =
                    self.chat.complete(model_id, prompt, Some(SYSTEM_INSTRUCTION)).await?;
                let json = extract_json(&response.content)?;
                debug!(model = model_id, tokens = response.tokens_total(), "Model call parsed");
                Ok(ModelOutput {
                    model: model_id.to_string(),
                    json,
                    tokens_used: response.tokens_total(),
                    cost_usd: response.cost_usd,
                })
            }
        })
        .await;

        result.map_err(|e| AuditError::ModelCallFailed {
            model: model_id.to_string(),
            attempts,
            last_error: e.to_string(),
        })
    }

    /// Best-effort fan-out: call every model concurrently and return each
    /// outcome. The caller decides what a usable quorum is; zero successes is
    /// its hard-failure condition, not ours.
    pub async fn call_many(&self, models: &[&str], prompt: &str) -> Vec<Result<ModelOutput, AuditError>> {
        let futures: Vec<_> = models.iter().map(|m| self.call(m, prompt)).collect();
        let results = join_all(futures).await;

        for (model, result) in models.iter().zip(&results) {
            if let Err(e) = result {
                warn!(model, error = %e, "Model dropped from consensus");
            }
        }
        results
    }
}

/// Extract one JSON object from model output. Direct parse first, then a
/// ```json fenced block, then the outermost brace span.
pub fn extract_json(text: &str) -> Result<Value, AuditError> {
    if let Ok(v) = serde_json::from_str::<Value>(text) {
        return Ok(v);
    }

    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        if let Some(end) = rest.find("```") {
            let block = rest[..end].trim();
            return serde_json::from_str(block)
                .map_err(|e| AuditError::LlmApi(format!("Invalid JSON in code block: {}", e)));
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return serde_json::from_str(&text[start..=end])
                .map_err(|e| AuditError::LlmApi(format!("Invalid JSON extraction: {}", e)));
        }
    }

    Err(AuditError::LlmApi("No valid JSON found in model response".into()))
}
