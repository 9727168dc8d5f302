//! Validation utilities

use bigdecimal::BigDecimal;

use crate::traits::*;
use crate::types::*;

fn invalid(id: &RecordId, reason: impl Into<String>) -> ReconciliationError {
    ReconciliationError::InvalidRecord {
        id: id.clone(),
        reason: reason.into(),
    }
}

/// Validate that a record ID is usable as a key
pub fn validate_record_id(id: &RecordId) -> ReconciliationResult<()> {
    let RecordId::Text(text) = id else {
        return Ok(());
    };

    if text.trim().is_empty() {
        return Err(invalid(id, "record id cannot be empty"));
    }

    if text.chars().count() > 64 {
        return Err(invalid(id, "record id cannot exceed 64 characters"));
    }

    // Processor ids look like `po_1Nx...`, `ch-42`, `TXN.2024.001`
    if !text
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(invalid(
            id,
            "record id can only contain alphanumeric characters, dashes, underscores and dots",
        ));
    }

    Ok(())
}

/// Validate that a record description is valid
pub fn validate_description(id: &RecordId, description: &str) -> ReconciliationResult<()> {
    if description.trim().is_empty() {
        return Err(invalid(id, "description cannot be empty"));
    }

    if description.chars().count() > 500 {
        return Err(invalid(id, "description cannot exceed 500 characters"));
    }

    Ok(())
}

/// Validate that a matched record carries both sides and a journal reference
pub fn validate_matched_record(record: &ReconciliationRecord) -> ReconciliationResult<()> {
    if record.match_status != MatchStatus::Matched {
        return Ok(());
    }

    if record.internal_amount.is_none() {
        return Err(invalid(&record.id, "matched record requires an internal amount"));
    }

    if record
        .reference_id
        .as_deref()
        .is_none_or(|r| r.trim().is_empty())
    {
        return Err(invalid(&record.id, "matched record requires a reference id"));
    }

    Ok(())
}

/// Validate that an amount, when present, is not zero
pub fn validate_nonzero_amount(
    id: &RecordId,
    amount: Option<&BigDecimal>,
) -> ReconciliationResult<()> {
    match amount {
        Some(a) if *a == BigDecimal::from(0) => Err(invalid(id, "amount cannot be zero")),
        _ => Ok(()),
    }
}

/// Stricter validator for production imports
pub struct EnhancedRecordValidator;

impl RecordValidator for EnhancedRecordValidator {
    fn validate_record(&self, record: &ReconciliationRecord) -> ReconciliationResult<()> {
        // Basic invariants
        record.validate()?;

        validate_record_id(&record.id)?;
        validate_description(&record.id, &record.description)?;
        validate_matched_record(record)?;
        validate_nonzero_amount(&record.id, record.external_amount.as_ref())?;

        if record.external_amount.is_none() && record.internal_amount.is_none() {
            return Err(invalid(&record.id, "record has no amount on either side"));
        }

        Ok(())
    }
}
