pub mod audit;
pub mod commands;
pub mod history;
pub mod scan;

pub use commands::{Cli, Commands};
