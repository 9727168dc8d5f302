//! Core types and data structures for the reconciliation system

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identifier of a reconciliation record
///
/// Record sources hand out either numeric row ids (bank feeds, ledger
/// exports) or opaque strings (payment processor ids such as `po_1Nx...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

/// Matching status of a record
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    /// Confirmed against a ledger entry
    Matched,
    /// An external matcher proposed a ledger entry with a confidence score
    Suggested,
    /// No ledger counterpart found yet
    #[default]
    Unmatched,
    /// Booked near a period boundary; the ledger period may be wrong
    CutoffRisk,
}

impl MatchStatus {
    /// Every variant, in display order
    pub const ALL: [MatchStatus; 4] = [
        MatchStatus::Matched,
        MatchStatus::Suggested,
        MatchStatus::Unmatched,
        MatchStatus::CutoffRisk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::Suggested => "suggested",
            MatchStatus::Unmatched => "unmatched",
            MatchStatus::CutoffRisk => "cutoff-risk",
        }
    }

    /// Whether a caller may move a record from this status to `next`
    ///
    /// `Matched` is terminal. Moving to the same status is not a transition.
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        matches!(
            (self, next),
            (
                MatchStatus::Unmatched,
                MatchStatus::Suggested | MatchStatus::Matched | MatchStatus::CutoffRisk
            ) | (
                MatchStatus::Suggested,
                MatchStatus::Matched | MatchStatus::Unmatched
            ) | (
                MatchStatus::CutoffRisk,
                MatchStatus::Matched | MatchStatus::Unmatched
            )
        )
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = ReconciliationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "matched" => Ok(MatchStatus::Matched),
            "suggested" => Ok(MatchStatus::Suggested),
            "unmatched" => Ok(MatchStatus::Unmatched),
            "cutoff-risk" | "cutoff_risk" | "cutoffrisk" => Ok(MatchStatus::CutoffRisk),
            other => Err(ReconciliationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Status filter applied by the aggregator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    /// No status restriction
    #[default]
    All,
    /// Only records in the given status
    Only(MatchStatus),
}

impl StatusFilter {
    pub fn accepts(&self, status: MatchStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ReconciliationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

impl From<MatchStatus> for StatusFilter {
    fn from(status: MatchStatus) -> Self {
        StatusFilter::Only(status)
    }
}

/// One line item to be reconciled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    /// Unique identifier, immutable once created
    pub id: RecordId,
    /// Free-text label
    pub description: String,
    /// Amount reported by the external system (bank feed, payment processor)
    #[serde(default)]
    pub external_amount: Option<BigDecimal>,
    /// Amount recorded in the ledger
    #[serde(default)]
    pub internal_amount: Option<BigDecimal>,
    /// Current matching status
    #[serde(default)]
    pub match_status: MatchStatus,
    /// Matcher confidence (0-100), only for suggested records
    #[serde(default)]
    pub confidence: Option<u8>,
    /// Journal entry identifier once matched or suggested
    #[serde(default)]
    pub reference_id: Option<String>,
    /// Booking date
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Transaction type label (receipt, payout, refund, ...)
    #[serde(default)]
    pub category: Option<String>,
}

impl ReconciliationRecord {
    /// Create a new unmatched record with only an external amount
    pub fn new(id: impl Into<RecordId>, description: String, external_amount: BigDecimal) -> Self {
        Self {
            id: id.into(),
            description,
            external_amount: Some(external_amount),
            internal_amount: None,
            match_status: MatchStatus::Unmatched,
            confidence: None,
            reference_id: None,
            date: None,
            category: None,
        }
    }

    /// Create a record already matched to a ledger entry
    pub fn matched(
        id: impl Into<RecordId>,
        description: String,
        external_amount: BigDecimal,
        internal_amount: BigDecimal,
        reference_id: Option<String>,
    ) -> Self {
        Self {
            internal_amount: Some(internal_amount),
            match_status: MatchStatus::Matched,
            reference_id,
            ..Self::new(id, description, external_amount)
        }
    }

    /// Create a record carrying a matcher suggestion
    pub fn suggested(
        id: impl Into<RecordId>,
        description: String,
        external_amount: BigDecimal,
        reference_id: String,
        confidence: u8,
    ) -> Self {
        Self {
            match_status: MatchStatus::Suggested,
            confidence: Some(confidence),
            reference_id: Some(reference_id),
            ..Self::new(id, description, external_amount)
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_internal_amount(mut self, amount: BigDecimal) -> Self {
        self.internal_amount = Some(amount);
        self
    }

    /// External amount, absent treated as zero
    pub fn external_or_zero(&self) -> BigDecimal {
        self.external_amount
            .clone()
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    /// Internal amount, absent treated as zero
    pub fn internal_or_zero(&self) -> BigDecimal {
        self.internal_amount
            .clone()
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    /// Check the record against the data model invariants
    pub fn validate(&self) -> ReconciliationResult<()> {
        if let RecordId::Text(ref id) = self.id {
            if id.trim().is_empty() {
                return Err(ReconciliationError::InvalidRecord {
                    id: self.id.clone(),
                    reason: "record id cannot be empty".to_string(),
                });
            }
        }

        match self.match_status {
            MatchStatus::Unmatched if self.internal_amount.is_some() => {
                return Err(ReconciliationError::InvalidRecord {
                    id: self.id.clone(),
                    reason: "unmatched record cannot carry an internal amount".to_string(),
                });
            }
            MatchStatus::Suggested => match self.confidence {
                None => {
                    return Err(ReconciliationError::InvalidRecord {
                        id: self.id.clone(),
                        reason: "suggested record requires a confidence score".to_string(),
                    });
                }
                Some(c) if c > 100 => {
                    return Err(ReconciliationError::InvalidRecord {
                        id: self.id.clone(),
                        reason: format!("confidence {} is outside 0-100", c),
                    });
                }
                Some(_) => {}
            },
            _ => {}
        }

        if self.match_status != MatchStatus::Suggested && self.confidence.is_some() {
            return Err(ReconciliationError::InvalidRecord {
                id: self.id.clone(),
                reason: format!("{} record cannot carry a confidence score", self.match_status),
            });
        }

        Ok(())
    }
}

/// Per-status record counts; every variant is always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts(BTreeMap<MatchStatus, usize>);

impl StatusCounts {
    pub fn new() -> Self {
        Self(MatchStatus::ALL.iter().map(|s| (*s, 0)).collect())
    }

    pub fn increment(&mut self, status: MatchStatus) {
        *self.0.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: MatchStatus) -> usize {
        self.0.get(&status).copied().unwrap_or(0)
    }

    /// Sum over all statuses
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MatchStatus, usize)> + '_ {
        self.0.iter().map(|(s, c)| (*s, *c))
    }
}

impl Default for StatusCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Totals on both sides of a reconciliation and their variance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationTotals {
    pub external_total: BigDecimal,
    pub internal_total: BigDecimal,
    /// `external_total - internal_total`
    pub variance: BigDecimal,
    /// Variance as a percentage of the external total, 0 when that total is 0
    pub variance_percent: BigDecimal,
}

impl ReconciliationTotals {
    pub fn zero() -> Self {
        Self {
            external_total: BigDecimal::from(0),
            internal_total: BigDecimal::from(0),
            variance: BigDecimal::from(0),
            variance_percent: BigDecimal::from(0),
        }
    }

    /// Both sides agree
    pub fn is_reconciled(&self) -> bool {
        self.variance == BigDecimal::from(0)
    }

    /// Copy rounded half-up to `scale` decimal places, for display only
    pub fn rounded(&self, scale: i64) -> Self {
        Self {
            external_total: self.external_total.with_scale_round(scale, RoundingMode::HalfUp),
            internal_total: self.internal_total.with_scale_round(scale, RoundingMode::HalfUp),
            variance: self.variance.with_scale_round(scale, RoundingMode::HalfUp),
            variance_percent: self
                .variance_percent
                .with_scale_round(scale, RoundingMode::HalfUp),
        }
    }
}

impl Default for ReconciliationTotals {
    fn default() -> Self {
        Self::zero()
    }
}

/// Inputs to one aggregation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring, whitespace included; only an empty term
    /// matches everything
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub status_filter: StatusFilter,
    /// Inclusive lower bound on `date`; undated records are excluded when set
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on `date`; undated records are excluded when set
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    /// Whether the search term also matches `reference_id`
    #[serde(default = "default_search_references")]
    pub search_references: bool,
}

fn default_search_references() -> bool {
    true
}

impl FilterCriteria {
    pub fn new(search_term: impl Into<String>, status_filter: StatusFilter) -> Self {
        Self {
            search_term: search_term.into(),
            status_filter,
            ..Self::default()
        }
    }

    pub fn between(mut self, date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) -> Self {
        self.date_from = date_from;
        self.date_to = date_to;
        self
    }

    /// Whether a single record passes every active filter
    pub fn matches(&self, record: &ReconciliationRecord) -> bool {
        if !self.status_filter.accepts(record.match_status) {
            return false;
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = record.date else {
                return false;
            };
            if self.date_from.is_some_and(|from| date < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| date > to) {
                return false;
            }
        }

        let needle = self.search_term.to_lowercase();
        if needle.is_empty() {
            return true;
        }

        record.description.to_lowercase().contains(&needle)
            || (self.search_references
                && record
                    .reference_id
                    .as_ref()
                    .is_some_and(|r| r.to_lowercase().contains(&needle)))
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            status_filter: StatusFilter::All,
            date_from: None,
            date_to: None,
            search_references: default_search_references(),
        }
    }
}

/// Output of one aggregation pass, recomputed on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Records passing the filter, in input order
    pub filtered_records: Vec<ReconciliationRecord>,
    /// Counts over the whole input, so status tabs stay stable while filtering
    pub counts_by_status: StatusCounts,
    /// Totals over `filtered_records`
    pub totals: ReconciliationTotals,
}

/// Errors that can occur in the reconciliation system
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("Record source error: {0}")]
    Source(String),
    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: RecordId, reason: String },
    #[error("Duplicate record: {0}")]
    DuplicateRecord(RecordId),
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),
    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: RecordId,
        from: MatchStatus,
        to: MatchStatus,
    },
    #[error("Unknown match status: {0}")]
    UnknownStatus(String),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for reconciliation operations
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(MatchStatus::Unmatched.can_transition_to(MatchStatus::Suggested));
        assert!(MatchStatus::Unmatched.can_transition_to(MatchStatus::Matched));
        assert!(MatchStatus::Suggested.can_transition_to(MatchStatus::Matched));
        assert!(MatchStatus::Suggested.can_transition_to(MatchStatus::Unmatched));
        assert!(MatchStatus::CutoffRisk.can_transition_to(MatchStatus::Matched));

        assert!(!MatchStatus::Matched.can_transition_to(MatchStatus::Unmatched));
        assert!(!MatchStatus::Matched.can_transition_to(MatchStatus::Suggested));
        assert!(!MatchStatus::Suggested.can_transition_to(MatchStatus::CutoffRisk));
        assert!(!MatchStatus::Unmatched.can_transition_to(MatchStatus::Unmatched));
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Matched".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(MatchStatus::Matched)
        );
        assert_eq!(
            "cutoff-risk".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(MatchStatus::CutoffRisk)
        );
        assert!(matches!(
            "pending".parse::<StatusFilter>(),
            Err(ReconciliationError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_record_validation() {
        let valid = ReconciliationRecord::suggested(
            "txn-1",
            "Stripe payout".to_string(),
            BigDecimal::from(500),
            "JE-1042".to_string(),
            87,
        );
        assert!(valid.validate().is_ok());

        let mut no_confidence = valid.clone();
        no_confidence.confidence = None;
        assert!(no_confidence.validate().is_err());

        let mut too_confident = valid.clone();
        too_confident.confidence = Some(101);
        assert!(too_confident.validate().is_err());

        let unmatched_with_ledger =
            ReconciliationRecord::new(1i64, "Wire".to_string(), BigDecimal::from(10))
                .with_internal_amount(BigDecimal::from(10));
        assert!(unmatched_with_ledger.validate().is_err());

        let blank_id = ReconciliationRecord::new("  ", "Wire".to_string(), BigDecimal::from(10));
        assert!(blank_id.validate().is_err());
    }

    #[test]
    fn test_record_deserialization() {
        let json = r#"{
            "id": 7,
            "description": "Acme Corp payment",
            "external_amount": "1250.50",
            "match_status": "cutoff-risk",
            "date": "2024-03-31"
        }"#;

        let record: ReconciliationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, RecordId::Number(7));
        assert_eq!(record.match_status, MatchStatus::CutoffRisk);
        assert_eq!(record.internal_amount, None);

        let bad = r#"{ "id": "x", "description": "y", "match_status": "pending" }"#;
        assert!(serde_json::from_str::<ReconciliationRecord>(bad).is_err());
    }

    #[test]
    fn test_negative_numeric_id() {
        let json = r#"{ "id": -5, "description": "Reversal", "external_amount": "-12.00" }"#;
        let record: ReconciliationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, RecordId::Number(-5));
        assert_eq!(record.id.to_string(), "-5");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_status_counts_default_to_zero() {
        let mut counts = StatusCounts::new();
        counts.increment(MatchStatus::Matched);

        assert_eq!(counts.get(MatchStatus::Matched), 1);
        assert_eq!(counts.get(MatchStatus::CutoffRisk), 0);
        assert_eq!(counts.iter().count(), 4);
        assert_eq!(counts.total(), 1);
    }
}
