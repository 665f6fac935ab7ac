use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::AuditError;

use super::provider::ChatCompletion;
use super::types::ChatResponse;

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: "https://api.anthropic.com".to_string(),
        }
    }
}

#[async_trait]
impl ChatCompletion for AnthropicProvider {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<ChatResponse, AuditError> {
        let model = model_id.strip_prefix("anthropic/").unwrap_or(model_id);

        let mut body = json!({
            "model": model,
            "max_tokens": 4096,
            "messages": [{"role": "user", "content": prompt}]
        });
        if let Some(sys) = system {
            body["system"] = json!(sys);
        }

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AuditError::Network(format!("Anthropic request failed: {}", e)))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(AuditError::RateLimit("Anthropic rate limit exceeded".into()));
        }
        if status.as_u16() == 401 {
            return Err(AuditError::Authentication("Invalid Anthropic API key".into()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| AuditError::LlmApi(format!("Failed to parse Anthropic response: {}", e)))?;

        if let Some(error) = data.get("error") {
            let msg = error["message"].as_str().unwrap_or("Unknown Anthropic error");
            return Err(AuditError::LlmApi(msg.to_string()));
        }

        let content = data["content"][0]["text"]
            .as_str()
            .ok_or_else(|| AuditError::LlmApi("No content in Anthropic response".into()))?
            .to_string();

        let input_tokens = data["usage"]["input_tokens"].as_u64();
        let output_tokens = data["usage"]["output_tokens"].as_u64();

        debug!(model, input_tokens, output_tokens, "Anthropic completion");

        Ok(ChatResponse {
            content,
            input_tokens,
            output_tokens,
            cost_usd: None,
            model: model_id.to_string(),
        })
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }
}
