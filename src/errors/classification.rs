use super::types::AuditError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl AuditError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Retryable: transport and parse failures count as failed attempts
            AuditError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            AuditError::RateLimit(_) => ErrorClassification {
                error_type: "RateLimitError",
                retryable: true,
            },
            AuditError::LlmApi(_) => ErrorClassification {
                error_type: "LlmApiError",
                retryable: true,
            },
            AuditError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: true,
            },
            AuditError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: true,
            },
            AuditError::Database(_) => ErrorClassification {
                error_type: "DatabaseError",
                retryable: true,
            },
            AuditError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: true,
            },

            // Non-retryable: terminal by definition
            AuditError::Validation(_) => ErrorClassification {
                error_type: "ValidationError",
                retryable: false,
            },
            AuditError::ModelCallFailed { .. } => ErrorClassification {
                error_type: "ModelCallFailed",
                retryable: false,
            },
            AuditError::NoValidAnalysis(_) => ErrorClassification {
                error_type: "NoValidAnalysis",
                retryable: false,
            },
            AuditError::AgentTimeout { .. } => ErrorClassification {
                error_type: "AgentTimeout",
                retryable: false,
            },
            AuditError::Authentication(_) => ErrorClassification {
                error_type: "AuthenticationError",
                retryable: false,
            },
            AuditError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            AuditError::Knowledge(_) => ErrorClassification {
                error_type: "KnowledgeError",
                retryable: false,
            },
        }
    }
}
