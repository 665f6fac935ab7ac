use console::style;

use crate::db::Database;
use crate::errors::AuditError;
use crate::reporting::format_report_markdown;

use super::commands::HistoryArgs;

pub async fn handle_history(args: HistoryArgs) -> Result<(), AuditError> {
    let db = Database::new(&args.db)?;

    if let Some(audit_id) = &args.id {
        match db.get_report(audit_id)? {
            Some(report) => println!("{}", format_report_markdown(&report)),
            None => println!("No completed report found for audit {}", audit_id),
        }
        return Ok(());
    }

    let rows = db.list_audits(args.limit, args.offset)?;
    if rows.is_empty() {
        println!("No audits recorded.");
        return Ok(());
    }

    for row in rows {
        let status = match row.status.as_str() {
            "completed" => style(row.status.clone()).green(),
            _ => style(row.status.clone()).red(),
        };
        let score = row
            .overall_score
            .map(|s| format!("{}/100", s))
            .unwrap_or_else(|| "-".to_string());
        let detail = row
            .error_message
            .or(row.risk_level)
            .unwrap_or_default();
        println!(
            "{}  {}  {}  {}  {}  {}",
            row.completed_at,
            style(row.audit_id).cyan(),
            row.analysis_mode,
            status,
            score,
            style(detail).dim(),
        );
    }
    Ok(())
}
