pub mod audits;
pub mod connection;
pub mod schema;

pub use audits::AuditRow;
pub use connection::Database;
