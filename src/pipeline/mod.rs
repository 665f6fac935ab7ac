//! Request orchestration: validation, agent selection and scheduling,
//! aggregation, and best-effort persistence.

pub mod aggregation;
pub mod orchestrator;
pub mod state;
pub mod strategy;
pub mod validation;

pub use aggregation::{aggregate, cross_validate};
pub use orchestrator::Orchestrator;
pub use state::{ActiveRequest, RequestPhase, RequestTracker};
pub use strategy::{complexity_score, select_strategy};
pub use validation::validate_source;
