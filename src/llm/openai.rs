use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::AuditError;

use super::provider::ChatCompletion;
use super::types::ChatResponse;

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiProvider {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<ChatResponse, AuditError> {
        // Accept namespaced ids ("openai/gpt-4-turbo") and strip the prefix
        let model = model_id.strip_prefix("openai/").unwrap_or(model_id);

        let mut messages = Vec::new();
        if let Some(sys) = system {
            messages.push(json!({"role": "system", "content": sys}));
        }
        messages.push(json!({"role": "user", "content": prompt}));

        let body = json!({
            "model": model,
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
            .map_err(|e| AuditError::Network(format!("OpenAI request failed: {}", e)))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(AuditError::RateLimit("OpenAI rate limit".into()));
        }
        if status.as_u16() == 401 {
            return Err(AuditError::Authentication("Invalid OpenAI API key".into()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| AuditError::LlmApi(format!("Failed to parse OpenAI response: {}", e)))?;

        if let Some(error) = data.get("error") {
            return Err(AuditError::LlmApi(
                error["message"].as_str().unwrap_or("Unknown OpenAI error").to_string(),
            ));
        }

        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AuditError::LlmApi("No content in OpenAI response".into()))?
            .to_string();
        let input_tokens = data["usage"]["prompt_tokens"].as_u64();
        let output_tokens = data["usage"]["completion_tokens"].as_u64();

        Ok(ChatResponse {
            content,
            input_tokens,
            output_tokens,
            cost_usd: None,
            model: model_id.to_string(),
        })
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
