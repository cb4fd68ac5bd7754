pub mod events;
pub mod runner;
pub mod state;

pub use events::AuditEvent;
pub use runner::AuditRunner;
pub use state::{ExecutionMode, RunConfig, DEFAULT_MAX_CONCURRENCY};
