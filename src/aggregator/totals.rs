//! Totals, variance and status counts

use bigdecimal::BigDecimal;

use crate::types::*;

/// Sum both sides of the given records and compute the variance
///
/// Absent amounts count as zero. The variance percentage is defined as
/// zero when the external total is zero.
pub fn compute_totals(records: &[ReconciliationRecord]) -> ReconciliationTotals {
    let external_total: BigDecimal = records
        .iter()
        .filter_map(|r| r.external_amount.as_ref())
        .sum();
    let internal_total: BigDecimal = records
        .iter()
        .filter_map(|r| r.internal_amount.as_ref())
        .sum();

    let variance = &external_total - &internal_total;
    let variance_percent = variance_percent(&variance, &external_total);

    ReconciliationTotals {
        external_total,
        internal_total,
        variance,
        variance_percent,
    }
}

/// `variance / base * 100`, or zero when `base` is zero
pub fn variance_percent(variance: &BigDecimal, base: &BigDecimal) -> BigDecimal {
    if *base == BigDecimal::from(0) {
        return BigDecimal::from(0);
    }
    (variance * BigDecimal::from(100)) / base
}

/// Count records per status; statuses not present map to zero
pub fn count_by_status(records: &[ReconciliationRecord]) -> StatusCounts {
    let mut counts = StatusCounts::new();
    for record in records {
        counts.increment(record.match_status);
    }
    counts
}
