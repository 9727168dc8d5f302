//! Search, status and date filtering

use crate::types::*;

/// Filter records by search term and status, preserving input order
///
/// The search term is matched case-insensitively against the description
/// and the journal entry reference. An empty term matches every record.
pub fn filter_records(
    records: &[ReconciliationRecord],
    search_term: &str,
    status_filter: &StatusFilter,
) -> Vec<ReconciliationRecord> {
    filter_by_criteria(records, &FilterCriteria::new(search_term, *status_filter))
}

/// Filter records by a full set of criteria, preserving input order
pub fn filter_by_criteria(
    records: &[ReconciliationRecord],
    criteria: &FilterCriteria,
) -> Vec<ReconciliationRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}
