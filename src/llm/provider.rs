use async_trait::async_trait;

use crate::errors::AuditError;

use super::types::ChatResponse;

/// One chat-completion request to a named model.
///
/// Implementations perform a single attempt with no retry; retry and JSON
/// enforcement live in [`super::client::ModelClient`].
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<ChatResponse, AuditError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
