//! Traits for record sources, ingestion rules and external matchers

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Source of reconciliation records
///
/// This trait lets the reconciliation engine work with any backend (bank
/// feed importer, payment processor webhook store, ledger export, in-memory)
/// by implementing these methods. Implementations must return records in a
/// stable order; the aggregator preserves whatever order it is given.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every record, in source order
    async fn fetch_records(&self) -> ReconciliationResult<Vec<ReconciliationRecord>>;

    /// Get a record by ID
    async fn get_record(&self, id: &RecordId) -> ReconciliationResult<Option<ReconciliationRecord>>;

    /// Append a new record
    async fn save_record(&mut self, record: &ReconciliationRecord) -> ReconciliationResult<()>;

    /// Replace an existing record, keeping its position
    async fn update_record(&mut self, record: &ReconciliationRecord) -> ReconciliationResult<()>;
}

/// Rules applied to records at the ingestion boundary
pub trait RecordValidator: Send + Sync {
    /// Validate a record before it is stored
    fn validate_record(&self, record: &ReconciliationRecord) -> ReconciliationResult<()>;
}

/// Default validator enforcing the data model invariants only
pub struct DefaultRecordValidator;

impl RecordValidator for DefaultRecordValidator {
    fn validate_record(&self, record: &ReconciliationRecord) -> ReconciliationResult<()> {
        record.validate()
    }
}

/// A ledger entry an external matcher may pair with an unmatched record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerCandidate {
    /// Journal entry identifier
    pub reference_id: String,
    pub description: String,
    pub amount: BigDecimal,
    pub date: Option<NaiveDate>,
}

/// Output contract of an external matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Record the suggestion applies to
    pub record_id: RecordId,
    /// Proposed journal entry
    pub reference_id: String,
    /// Ledger amount of the proposed entry
    pub internal_amount: BigDecimal,
    /// Matcher confidence, 0-100
    pub confidence: u8,
}

/// External matching service
///
/// The aggregator never computes matches; implementations of this trait
/// (rule engines, ML services) propose them and the reconciliation engine
/// records the proposals as suggested matches.
pub trait MatchSuggester: Send + Sync {
    /// Propose ledger entries for the given unmatched records
    fn suggest(
        &self,
        unmatched: &[ReconciliationRecord],
        candidates: &[LedgerCandidate],
    ) -> Vec<Suggestion>;
}
