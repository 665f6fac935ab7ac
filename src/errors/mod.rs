mod classification;
mod retry;
mod types;

pub use classification::ErrorClassification;
pub use retry::{with_retry, RetryConfig};
pub use types::AuditError;
