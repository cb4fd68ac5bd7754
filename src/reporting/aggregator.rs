use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use crate::models::{Category, CheckOutcome, Report, ReportContext, ReportSummary};

/// Folds per-check outcomes into one immutable [`Report`].
pub struct ReportAggregator {
    context: ReportContext,
}

impl ReportAggregator {
    pub fn new(context: ReportContext) -> Self {
        Self { context }
    }

    /// Aggregate with a fresh run id and the current time.
    pub fn aggregate(&self, outcomes: Vec<(Category, CheckOutcome)>) -> Report {
        self.aggregate_at(outcomes, Utc::now(), uuid::Uuid::new_v4().to_string())
    }

    /// Pure aggregation. Identical inputs give identical reports.
    ///
    /// The runner never yields two outcomes for one category; if a caller
    /// does, the first one is kept.
    pub fn aggregate_at(
        &self,
        outcomes: Vec<(Category, CheckOutcome)>,
        generated_at: DateTime<Utc>,
        run_id: String,
    ) -> Report {
        let mut by_category: BTreeMap<Category, CheckOutcome> = BTreeMap::new();
        for (category, outcome) in outcomes {
            by_category.entry(category).or_insert(outcome);
        }

        let summary = summarize(&by_category);
        Report {
            run_id,
            generated_at,
            context: self.context.clone(),
            outcomes: by_category,
            summary,
        }
    }
}

/// Per-category finding counts plus totals. Failed categories count 0.
pub fn summarize(outcomes: &BTreeMap<Category, CheckOutcome>) -> ReportSummary {
    let counts: BTreeMap<Category, usize> = outcomes
        .iter()
        .map(|(category, outcome)| (*category, outcome.finding_count()))
        .collect();

    ReportSummary {
        total_findings: counts.values().sum(),
        failed_checks: outcomes.values().filter(|o| o.is_failed()).count(),
        counts,
    }
}
