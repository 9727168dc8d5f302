//! Reconciliation engine for bank statements, payouts and deferred revenue
//!
//! The engine owns the ingestion boundary (validation, duplicate checks) and
//! the status transition commands the presentation layer issues: accepting
//! or rejecting a suggestion, matching manually, flagging cutoff risk. It
//! hands aggregation off to [`ReconciliationAggregator`], which never
//! mutates anything.

use bigdecimal::BigDecimal;
use chrono::{NaiveDateTime, Utc};
use std::collections::HashSet;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::aggregator::ReconciliationAggregator;
use crate::config::ReconciliationConfig;
use crate::traits::*;
use crate::types::*;

/// Summary of one import batch
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub counts_by_status: StatusCounts,
}

/// Outcome of applying matcher suggestions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionReport {
    /// Records moved to `Suggested`
    pub applied: Vec<RecordId>,
    /// Suggestions dropped: below the confidence floor, unknown record, or
    /// record no longer unmatched
    pub skipped: usize,
}

/// Reconciliation engine over a record source
pub struct ReconciliationEngine<S: RecordSource> {
    source: S,
    validator: Box<dyn RecordValidator>,
    aggregator: ReconciliationAggregator,
    session_id: Uuid,
    started_at: NaiveDateTime,
}

impl<S: RecordSource> ReconciliationEngine<S> {
    /// Create a new engine with the default validator and configuration
    pub fn new(source: S) -> Self {
        Self::with_parts(
            source,
            Box::new(DefaultRecordValidator),
            ReconciliationConfig::default(),
        )
    }

    /// Create a new engine with a custom validator
    pub fn with_validator(source: S, validator: Box<dyn RecordValidator>) -> Self {
        Self::with_parts(source, validator, ReconciliationConfig::default())
    }

    /// Create a new engine with a custom configuration
    pub fn with_config(source: S, config: ReconciliationConfig) -> Self {
        Self::with_parts(source, Box::new(DefaultRecordValidator), config)
    }

    /// Create a new engine with both a custom validator and configuration
    pub fn with_parts(
        source: S,
        validator: Box<dyn RecordValidator>,
        config: ReconciliationConfig,
    ) -> Self {
        Self {
            source,
            validator,
            aggregator: ReconciliationAggregator::with_config(config),
            session_id: Uuid::new_v4(),
            started_at: Utc::now().naive_utc(),
        }
    }

    /// Identifier of this reconciliation session, for audit trails
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn config(&self) -> &ReconciliationConfig {
        self.aggregator.config()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Validate and store a batch of records
    ///
    /// The whole batch is checked before anything is written, so a rejected
    /// batch leaves the source untouched.
    #[instrument(
        skip_all,
        fields(session = %self.session_id, started = %self.started_at, batch = records.len())
    )]
    pub async fn import_records(
        &mut self,
        records: Vec<ReconciliationRecord>,
    ) -> ReconciliationResult<ImportSummary> {
        let mut seen = HashSet::new();
        for record in &records {
            self.validator.validate_record(record)?;

            if !seen.insert(record.id.clone())
                || self.source.get_record(&record.id).await?.is_some()
            {
                return Err(ReconciliationError::DuplicateRecord(record.id.clone()));
            }
        }

        let mut counts_by_status = StatusCounts::new();
        for record in &records {
            self.source.save_record(record).await?;
            counts_by_status.increment(record.match_status);
        }

        info!(imported = records.len(), "records imported");

        Ok(ImportSummary {
            imported: records.len(),
            counts_by_status,
        })
    }

    /// Parse a JSON array of records and import it
    pub async fn import_json(&mut self, json: &str) -> ReconciliationResult<ImportSummary> {
        let records: Vec<ReconciliationRecord> = serde_json::from_str(json)?;
        self.import_records(records).await
    }

    /// All records, in source order
    pub async fn records(&self) -> ReconciliationResult<Vec<ReconciliationRecord>> {
        self.source.fetch_records().await
    }

    /// Get a record by ID, returning an error if not found
    pub async fn get_record_required(
        &self,
        id: &RecordId,
    ) -> ReconciliationResult<ReconciliationRecord> {
        self.source
            .get_record(id)
            .await?
            .ok_or_else(|| ReconciliationError::RecordNotFound(id.clone()))
    }

    /// Fetch the current records and aggregate them
    pub async fn aggregate(
        &self,
        criteria: &FilterCriteria,
    ) -> ReconciliationResult<AggregateResult> {
        let records = self.source.fetch_records().await?;
        Ok(self.aggregator.aggregate(&records, criteria))
    }

    /// Confirm a suggested match
    pub async fn accept_suggestion(
        &mut self,
        id: &RecordId,
    ) -> ReconciliationResult<ReconciliationRecord> {
        let record = self.get_record_required(id).await?;
        if record.match_status != MatchStatus::Suggested {
            return Err(transition_error(&record, MatchStatus::Matched));
        }

        self.transition(record, MatchStatus::Matched, |r| {
            r.confidence = None;
        })
        .await
    }

    /// Discard a suggested match, returning the record to unmatched
    pub async fn reject_suggestion(
        &mut self,
        id: &RecordId,
    ) -> ReconciliationResult<ReconciliationRecord> {
        let record = self.get_record_required(id).await?;
        if record.match_status != MatchStatus::Suggested {
            return Err(transition_error(&record, MatchStatus::Unmatched));
        }

        self.transition(record, MatchStatus::Unmatched, clear_ledger_side)
            .await
    }

    /// Match a record to a journal entry by hand
    pub async fn match_record(
        &mut self,
        id: &RecordId,
        reference_id: String,
        internal_amount: BigDecimal,
    ) -> ReconciliationResult<ReconciliationRecord> {
        let record = self.get_record_required(id).await?;
        self.transition(record, MatchStatus::Matched, |r| {
            r.reference_id = Some(reference_id);
            r.internal_amount = Some(internal_amount);
            r.confidence = None;
        })
        .await
    }

    /// Flag an unmatched record as booked near a period boundary
    pub async fn flag_cutoff_risk(
        &mut self,
        id: &RecordId,
    ) -> ReconciliationResult<ReconciliationRecord> {
        let record = self.get_record_required(id).await?;
        self.transition(record, MatchStatus::CutoffRisk, |_| {}).await
    }

    /// Clear a cutoff-risk flag, returning the record to unmatched
    pub async fn clear_cutoff_risk(
        &mut self,
        id: &RecordId,
    ) -> ReconciliationResult<ReconciliationRecord> {
        let record = self.get_record_required(id).await?;
        if record.match_status != MatchStatus::CutoffRisk {
            return Err(transition_error(&record, MatchStatus::Unmatched));
        }

        self.transition(record, MatchStatus::Unmatched, clear_ledger_side)
            .await
    }

    /// Ask an external matcher for suggestions and record them
    ///
    /// Only unmatched records are offered to the matcher. Suggestions below
    /// the configured confidence floor are ignored.
    #[instrument(
        skip_all,
        fields(
            session = %self.session_id,
            started = %self.started_at,
            candidates = candidates.len()
        )
    )]
    pub async fn apply_suggestions(
        &mut self,
        suggester: &dyn MatchSuggester,
        candidates: &[LedgerCandidate],
    ) -> ReconciliationResult<SuggestionReport> {
        let unmatched: Vec<ReconciliationRecord> = self
            .source
            .fetch_records()
            .await?
            .into_iter()
            .filter(|r| r.match_status == MatchStatus::Unmatched)
            .collect();

        let floor = self.config().suggestion_floor;
        let mut report = SuggestionReport::default();

        for suggestion in suggester.suggest(&unmatched, candidates) {
            if suggestion.confidence > 100 || suggestion.confidence < floor {
                report.skipped += 1;
                continue;
            }

            let Some(record) = self.source.get_record(&suggestion.record_id).await? else {
                warn!(record = %suggestion.record_id, "suggestion for unknown record");
                report.skipped += 1;
                continue;
            };

            if record.match_status != MatchStatus::Unmatched {
                warn!(
                    record = %record.id,
                    status = %record.match_status,
                    "suggestion for record that is no longer unmatched"
                );
                report.skipped += 1;
                continue;
            }

            let id = record.id.clone();
            self.transition(record, MatchStatus::Suggested, |r| {
                r.reference_id = Some(suggestion.reference_id);
                r.internal_amount = Some(suggestion.internal_amount);
                r.confidence = Some(suggestion.confidence);
            })
            .await?;
            report.applied.push(id);
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped,
            "suggestions applied"
        );

        Ok(report)
    }

    async fn transition<F>(
        &mut self,
        mut record: ReconciliationRecord,
        next: MatchStatus,
        update: F,
    ) -> ReconciliationResult<ReconciliationRecord>
    where
        F: FnOnce(&mut ReconciliationRecord),
    {
        let from = record.match_status;
        if !from.can_transition_to(next) {
            return Err(transition_error(&record, next));
        }

        record.match_status = next;
        update(&mut record);
        self.validator.validate_record(&record)?;
        self.source.update_record(&record).await?;

        info!(record = %record.id, %from, to = %next, "status changed");
        Ok(record)
    }
}

fn transition_error(record: &ReconciliationRecord, to: MatchStatus) -> ReconciliationError {
    ReconciliationError::InvalidTransition {
        id: record.id.clone(),
        from: record.match_status,
        to,
    }
}

fn clear_ledger_side(record: &mut ReconciliationRecord) {
    record.confidence = None;
    record.reference_id = None;
    record.internal_amount = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_source::MemoryRecordSource;

    fn seeded() -> Vec<ReconciliationRecord> {
        vec![
            ReconciliationRecord::suggested(
                "txn-1",
                "Stripe payout".to_string(),
                BigDecimal::from(980),
                "JE-301".to_string(),
                87,
            )
            .with_internal_amount(BigDecimal::from(980)),
            ReconciliationRecord::new("txn-2", "Wire from Acme".to_string(), BigDecimal::from(250)),
        ]
    }

    #[tokio::test]
    async fn test_accept_suggestion() {
        let mut engine = ReconciliationEngine::new(MemoryRecordSource::new());
        engine.import_records(seeded()).await.unwrap();

        let accepted = engine.accept_suggestion(&"txn-1".into()).await.unwrap();
        assert_eq!(accepted.match_status, MatchStatus::Matched);
        assert_eq!(accepted.confidence, None);
        assert_eq!(accepted.reference_id.as_deref(), Some("JE-301"));

        // Matched is terminal
        let again = engine.accept_suggestion(&"txn-1".into()).await;
        assert!(matches!(
            again,
            Err(ReconciliationError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_reject_suggestion_clears_ledger_side() {
        let mut engine = ReconciliationEngine::new(MemoryRecordSource::new());
        engine.import_records(seeded()).await.unwrap();

        let rejected = engine.reject_suggestion(&"txn-1".into()).await.unwrap();
        assert_eq!(rejected.match_status, MatchStatus::Unmatched);
        assert_eq!(rejected.internal_amount, None);
        assert_eq!(rejected.reference_id, None);
        assert!(rejected.validate().is_ok());
    }

    #[tokio::test]
    async fn test_import_rejects_whole_batch_on_duplicate() {
        let mut engine = ReconciliationEngine::new(MemoryRecordSource::new());
        let mut batch = seeded();
        batch.push(ReconciliationRecord::new("txn-2", "Dup".to_string(), BigDecimal::from(1)));

        let result = engine.import_records(batch).await;
        assert!(matches!(result, Err(ReconciliationError::DuplicateRecord(_))));
        assert!(engine.records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cutoff_risk_round_trip() {
        let mut engine = ReconciliationEngine::new(MemoryRecordSource::new());
        engine.import_records(seeded()).await.unwrap();

        let flagged = engine.flag_cutoff_risk(&"txn-2".into()).await.unwrap();
        assert_eq!(flagged.match_status, MatchStatus::CutoffRisk);

        let cleared = engine.clear_cutoff_risk(&"txn-2".into()).await.unwrap();
        assert_eq!(cleared.match_status, MatchStatus::Unmatched);

        assert!(engine.clear_cutoff_risk(&"txn-2".into()).await.is_err());
        assert!(matches!(
            engine.flag_cutoff_risk(&"missing".into()).await,
            Err(ReconciliationError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_session_start_is_fixed_at_construction() {
        let before = Utc::now().naive_utc();
        let engine = ReconciliationEngine::new(MemoryRecordSource::new());
        let after = Utc::now().naive_utc();

        assert!(before <= engine.started_at() && engine.started_at() <= after);
    }

    /// Returns the same suggestions whatever it is asked
    struct CannedSuggester(Vec<Suggestion>);

    impl MatchSuggester for CannedSuggester {
        fn suggest(&self, _: &[ReconciliationRecord], _: &[LedgerCandidate]) -> Vec<Suggestion> {
            self.0.clone()
        }
    }

    fn suggestion(id: &str, reference: &str, confidence: u8) -> Suggestion {
        Suggestion {
            record_id: id.into(),
            reference_id: reference.to_string(),
            internal_amount: BigDecimal::from(250),
            confidence,
        }
    }

    #[tokio::test]
    async fn test_apply_suggestions_skips_unusable_suggestions() {
        let mut engine = ReconciliationEngine::new(MemoryRecordSource::new());
        engine
            .import_records(vec![
                ReconciliationRecord::new("a", "Wire from Acme".to_string(), BigDecimal::from(250)),
                ReconciliationRecord::matched(
                    "b",
                    "Stripe payout".to_string(),
                    BigDecimal::from(980),
                    BigDecimal::from(980),
                    Some("JE-301".to_string()),
                ),
            ])
            .await
            .unwrap();

        let suggester = CannedSuggester(vec![
            suggestion("ghost", "JE-400", 90),
            suggestion("b", "JE-401", 90),
            suggestion("a", "JE-402", 101),
            suggestion("a", "JE-403", 90),
            suggestion("a", "JE-404", 95),
        ]);

        let report = engine.apply_suggestions(&suggester, &[]).await.unwrap();
        assert_eq!(report.applied, vec![RecordId::from("a")]);
        assert_eq!(report.skipped, 4);

        // The first usable suggestion wins; later ones find the record suggested
        let a = engine.get_record_required(&"a".into()).await.unwrap();
        assert_eq!(a.match_status, MatchStatus::Suggested);
        assert_eq!(a.reference_id.as_deref(), Some("JE-403"));
        assert_eq!(a.confidence, Some(90));

        // The matched record is untouched
        let b = engine.get_record_required(&"b".into()).await.unwrap();
        assert_eq!(b.match_status, MatchStatus::Matched);
        assert_eq!(b.reference_id.as_deref(), Some("JE-301"));
    }

    #[tokio::test]
    async fn test_import_rejects_id_already_in_source() {
        let mut engine = ReconciliationEngine::new(MemoryRecordSource::new());
        engine.import_records(seeded()).await.unwrap();

        let result = engine
            .import_records(vec![
                ReconciliationRecord::new("txn-3", "New wire".to_string(), BigDecimal::from(5)),
                ReconciliationRecord::new("txn-2", "Re-sent".to_string(), BigDecimal::from(5)),
            ])
            .await;
        assert!(matches!(
            result,
            Err(ReconciliationError::DuplicateRecord(RecordId::Text(ref id))) if id == "txn-2"
        ));

        // Nothing from the rejected batch was written
        assert_eq!(engine.records().await.unwrap().len(), 2);
        let original = engine.get_record_required(&"txn-2".into()).await.unwrap();
        assert_eq!(original.description, "Wire from Acme");
    }
}
