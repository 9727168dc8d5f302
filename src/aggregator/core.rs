//! Aggregator entry point combining filtering, counting and totals

use tracing::{debug, instrument};

use crate::aggregator::{count_by_status, compute_totals, filter_by_criteria};
use crate::config::ReconciliationConfig;
use crate::types::*;

/// Stateless reconciliation aggregator
///
/// Every call recomputes the result from the records it is given; nothing
/// is cached between calls, so the same inputs always give the same output.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationAggregator {
    config: ReconciliationConfig,
}

impl ReconciliationAggregator {
    /// Create an aggregator with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator with a custom configuration
    pub fn with_config(config: ReconciliationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Filter the records and compute counts and totals
    ///
    /// Status counts cover the whole input; totals cover only the records
    /// that pass the filter.
    #[instrument(name = "aggregate", skip_all, fields(records = records.len()))]
    pub fn aggregate(
        &self,
        records: &[ReconciliationRecord],
        criteria: &FilterCriteria,
    ) -> AggregateResult {
        let criteria = FilterCriteria {
            search_references: criteria.search_references && self.config.search_references,
            ..criteria.clone()
        };

        let filtered_records = filter_by_criteria(records, &criteria);
        let counts_by_status = count_by_status(records);
        let totals = compute_totals(&filtered_records);

        debug!(
            filtered = filtered_records.len(),
            external_total = %totals.external_total,
            internal_total = %totals.internal_total,
            variance = %totals.variance,
            "aggregation complete"
        );

        AggregateResult {
            filtered_records,
            counts_by_status,
            totals,
        }
    }

    /// Totals rounded to the configured display scale
    pub fn display_totals(&self, totals: &ReconciliationTotals) -> ReconciliationTotals {
        totals.rounded(self.config.display_scale)
    }
}
