use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::finding::{Category, Finding};
use super::outcome::CheckOutcome;

/// Where and with what an audit ran. Supplied by the caller, copied into the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContext {
    pub region: String,
    pub provider: String,
    pub tool_version: String,
}

impl Default for ReportContext {
    fn default() -> Self {
        Self {
            region: String::new(),
            provider: String::new(),
            tool_version: tool_version(),
        }
    }
}

/// Package version, suffixed with the git revision when built from a checkout.
pub fn tool_version() -> String {
    match option_env!("CLOUD_AUDIT_GIT_HASH") {
        Some(hash) => format!("{}+{}", env!("CARGO_PKG_VERSION"), hash),
        None => env!("CARGO_PKG_VERSION").to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReportSummary {
    /// Finding count per category. Failed or clean categories count 0 and are never omitted.
    pub counts: BTreeMap<Category, usize>,
    pub total_findings: usize,
    pub failed_checks: usize,
}

/// Aggregated result of one audit run. Built once by the aggregator; renderers only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub context: ReportContext,
    pub outcomes: BTreeMap<Category, CheckOutcome>,
    pub summary: ReportSummary,
}

impl Report {
    pub fn outcome(&self, category: Category) -> Option<&CheckOutcome> {
        self.outcomes.get(&category)
    }

    pub fn count(&self, category: Category) -> usize {
        self.summary.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.outcomes.keys().copied()
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed_checks > 0
    }
}
