//! Multi-agent smart contract auditing: deterministic pattern scanning,
//! multi-model LLM consensus, retrieval-augmented prompts, and orchestrated
//! aggregation into one persisted report.

pub mod agents;
pub mod analysis;
pub mod cli;
pub mod db;
pub mod errors;
pub mod knowledge;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod reporting;
