use serde::{Deserialize, Serialize};
use super::finding::{Category, Finding};

/// Why a check produced no trustworthy result. Single-shot: carries no retry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckError {
    pub category: Category,
    pub cause: String,
}

impl CheckError {
    pub fn new(category: Category, cause: impl Into<String>) -> Self {
        Self { category, cause: cause.into() }
    }
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} check failed: {}", self.category, self.cause)
    }
}

impl std::error::Error for CheckError {}

/// Result of running one check. A check never partially succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckOutcome {
    Success { findings: Vec<Finding> },
    Failed { error: CheckError },
}

impl CheckOutcome {
    pub fn success(findings: Vec<Finding>) -> Self {
        Self::Success { findings }
    }

    pub fn failed(category: Category, cause: impl Into<String>) -> Self {
        Self::Failed { error: CheckError::new(category, cause) }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Findings of a successful check; empty for a failed one.
    pub fn findings(&self) -> &[Finding] {
        match self {
            Self::Success { findings } => findings,
            Self::Failed { .. } => &[],
        }
    }

    /// Number of findings counted in the report summary. Always 0 when failed.
    pub fn finding_count(&self) -> usize {
        self.findings().len()
    }

    pub fn error(&self) -> Option<&CheckError> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Success { .. } => None,
        }
    }
}
