pub mod anthropic;
pub mod client;
pub mod openai;
pub mod openrouter;
pub mod provider;
pub mod router;
pub mod types;

pub use client::{extract_json, ModelClient};
pub use provider::ChatCompletion;
pub use router::create_provider_from_env;
pub use types::{ChatResponse, ModelOutput};
