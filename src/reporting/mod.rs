pub mod console;
pub mod formatter;

pub use console::render_report;
pub use formatter::{format_finding_markdown, format_report_markdown, format_severity_summary};
