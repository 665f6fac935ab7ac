use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::AuditError;

use super::provider::ChatCompletion;
use super::types::ChatResponse;

pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenRouterProvider {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<ChatResponse, AuditError> {
        let mut messages = Vec::new();
        if let Some(sys) = system {
            messages.push(json!({"role": "system", "content": sys}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        let body = json!({
            "model": model_id,
            "messages": messages,
            "max_tokens": 4096,
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuditError::Network(format!("OpenRouter request failed: {}", e)))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(AuditError::RateLimit("OpenRouter rate limit".into()));
        }
        if status.as_u16() == 401 {
            return Err(AuditError::Authentication("Invalid OpenRouter API key".into()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| AuditError::LlmApi(format!("Failed to parse OpenRouter response: {}", e)))?;

        if let Some(error) = data.get("error") {
            return Err(AuditError::LlmApi(
                error["message"].as_str().unwrap_or("Unknown OpenRouter error").to_string(),
            ));
        }

        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AuditError::LlmApi("No content in OpenRouter response".into()))?
            .to_string();
        let input_tokens = data["usage"]["prompt_tokens"].as_u64();
        let output_tokens = data["usage"]["completion_tokens"].as_u64();
        let cost_usd = data["usage"]["cost"].as_f64();

        Ok(ChatResponse {
            content,
            input_tokens,
            output_tokens,
            cost_usd,
            model: model_id.to_string(),
        })
    }

    fn provider_name(&self) -> &str {
        "openrouter"
    }
}
