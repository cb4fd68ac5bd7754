use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Parallel,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// How the runner schedules checks. Sequential is a fan-out of width 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub mode: ExecutionMode,
    pub max_concurrency: usize,
}

impl RunConfig {
    pub fn sequential() -> Self {
        Self { mode: ExecutionMode::Sequential, max_concurrency: 1 }
    }

    pub fn parallel(max_concurrency: usize) -> Self {
        Self { mode: ExecutionMode::Parallel, max_concurrency: max_concurrency.max(1) }
    }

    /// Number of checks allowed in flight at once.
    pub fn width(&self) -> usize {
        match self.mode {
            ExecutionMode::Sequential => 1,
            ExecutionMode::Parallel => self.max_concurrency.max(1),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::parallel(DEFAULT_MAX_CONCURRENCY)
    }
}
