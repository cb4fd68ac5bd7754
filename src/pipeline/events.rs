use crate::models::Category;

/// Messages sent from the runner to a progress display.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// Run started with this many checks
    AuditStarted {
        check_count: usize,
    },
    CheckStarted {
        category: Category,
        display_name: String,
    },
    CheckCompleted {
        category: Category,
        findings: usize,
        duration_ms: u64,
    },
    CheckFailed {
        category: Category,
        error: String,
        duration_ms: u64,
    },
    /// Every check has produced its outcome
    AuditCompleted {
        total_findings: usize,
        failed_checks: usize,
        duration_ms: u64,
    },
}
