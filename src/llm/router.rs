use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::AuditError;

use super::anthropic::AnthropicProvider;
use super::openai::OpenAiProvider;
use super::openrouter::OpenRouterProvider;
use super::provider::ChatCompletion;
use super::types::ChatResponse;

/// Routes namespaced model ids ("anthropic/...", "openai/...") to direct
/// provider APIs when no OpenRouter key is configured.
pub struct DirectRouter {
    openai: Option<OpenAiProvider>,
    anthropic: Option<AnthropicProvider>,
}

#[async_trait]
impl ChatCompletion for DirectRouter {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<ChatResponse, AuditError> {
        if model_id.starts_with("anthropic/") || model_id.starts_with("claude") {
            if let Some(p) = &self.anthropic {
                return p.complete(model_id, prompt, system).await;
            }
        }
        if model_id.starts_with("openai/") || model_id.starts_with("gpt") {
            if let Some(p) = &self.openai {
                return p.complete(model_id, prompt, system).await;
            }
        }
        Err(AuditError::Config(format!(
            "No provider configured that can serve model '{}'",
            model_id
        )))
    }

    fn provider_name(&self) -> &str {
        "direct"
    }
}

/// Build a chat-completion backend from environment keys.
///
/// OPENROUTER_API_KEY wins (one endpoint serves every namespaced model id);
/// otherwise OPENAI_API_KEY / ANTHROPIC_API_KEY route directly.
pub fn create_provider_from_env() -> Result<Arc<dyn ChatCompletion>, AuditError> {
    if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
        return Ok(Arc::new(OpenRouterProvider::new(&key)));
    }

    let openai = std::env::var("OPENAI_API_KEY").ok().map(|k| OpenAiProvider::new(&k));
    let anthropic = std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .map(|k| AnthropicProvider::new(&k));

    if openai.is_none() && anthropic.is_none() {
        return Err(AuditError::Config(
            "No LLM API key configured. Set OPENROUTER_API_KEY, or OPENAI_API_KEY / ANTHROPIC_API_KEY.".into(),
        ));
    }

    Ok(Arc::new(DirectRouter { openai, anthropic }))
}
