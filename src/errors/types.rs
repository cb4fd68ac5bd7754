use thiserror::Error;

/// Errors that can abort the tool as a whole. Individual check failures never
/// surface here; they become `CheckOutcome::Failed` inside the report.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} finding(s) reported")]
    FindingsReported(usize),
}

impl AuditError {
    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AuditError::Config(_) | AuditError::Yaml(_) => 2,
            AuditError::Provider(_) => 3,
            AuditError::FindingsReported(_) => 4,
            AuditError::InvalidArgument(_) => 5,
            _ => 1,
        }
    }
}
