pub mod types;

pub use types::AuditError;
