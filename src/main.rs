use clap::Parser;
use tracing_subscriber::EnvFilter;

use solaudit::cli::{self, Cli, Commands};
use solaudit::errors::AuditError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    let result = match cli.command {
        Commands::Audit(args) => cli::audit::handle_audit(args).await,
        Commands::Scan(args) => cli::scan::handle_scan(args).await,
        Commands::History(args) => cli::history::handle_history(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let exit_code = match &e {
            AuditError::Validation(_) => 2,
            AuditError::Config(_) => 3,
            AuditError::Authentication(_) => 4,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}
