//! Bank reconciliation walkthrough

use bigdecimal::BigDecimal;
use reconciliation_core::utils::{format_amount, summarize_totals, MemoryRecordSource};
use reconciliation_core::{
    group_by_record_category, FilterCriteria, LedgerCandidate, MatchStatus, MatchSuggester,
    RecordId, ReconciliationEngine, ReconciliationRecord, ReconciliationView, StatusFilter,
    Suggestion, ViewAction,
};
use std::str::FromStr;

/// Stand-in for an external matching service
struct ExactAmountSuggester;

impl MatchSuggester for ExactAmountSuggester {
    fn suggest(
        &self,
        unmatched: &[ReconciliationRecord],
        candidates: &[LedgerCandidate],
    ) -> Vec<Suggestion> {
        unmatched
            .iter()
            .filter_map(|record| {
                let amount = record.external_amount.as_ref()?;
                let candidate = candidates.iter().find(|c| &c.amount == amount)?;
                Some(Suggestion {
                    record_id: record.id.clone(),
                    reference_id: candidate.reference_id.clone(),
                    internal_amount: candidate.amount.clone(),
                    confidence: 87,
                })
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Reconciliation Core - Bank Reconciliation Example\n");

    let mut engine = ReconciliationEngine::new(MemoryRecordSource::new());

    // 1. Import the bank feed
    let feed = vec![
        ReconciliationRecord::matched(
            "bank-001",
            "Acme Corp payment".to_string(),
            BigDecimal::from_str("12500.00")?,
            BigDecimal::from_str("12500.00")?,
            Some("JE-1001".to_string()),
        )
        .with_category("receipt"),
        ReconciliationRecord::new(
            "bank-002",
            "Stripe payout".to_string(),
            BigDecimal::from_str("4830.55")?,
        )
        .with_category("payout"),
        ReconciliationRecord::new(
            "bank-003",
            "AWS invoice".to_string(),
            BigDecimal::from_str("-1214.09")?,
        )
        .with_category("expense"),
    ];

    let summary = engine.import_records(feed).await?;
    println!("Imported {} records", summary.imported);

    // 2. Ask the matcher for suggestions
    let candidates = vec![LedgerCandidate {
        reference_id: "JE-1002".to_string(),
        description: "Stripe settlement".to_string(),
        amount: BigDecimal::from_str("4830.55")?,
        date: None,
    }];
    let report = engine
        .apply_suggestions(&ExactAmountSuggester, &candidates)
        .await?;
    println!("Suggestions applied: {:?}\n", report.applied);

    // 3. The reviewer accepts the suggestion
    engine
        .accept_suggestion(&RecordId::from("bank-002"))
        .await?;

    // 4. Aggregate for the dashboard
    let result = engine.aggregate(&FilterCriteria::default()).await?;
    for (status, count) in result.counts_by_status.iter() {
        println!("  {:<12} {}", status, count);
    }
    println!(
        "\nTotals: {}",
        summarize_totals(&result.totals, engine.config().display_scale)
    );

    // 5. Receipts grouped by transaction type
    println!("\nBy transaction type:");
    let groups = group_by_record_category(&result.filtered_records, "other");
    for (category, records) in &groups {
        for record in records {
            println!(
                "  {:<8} {:<20} {:>12}",
                category,
                record.description,
                format_amount(&record.external_or_zero(), 2)
            );
        }
    }

    // 6. A filtered view, as the table would request it
    let view = ReconciliationView::new()
        .reduce(ViewAction::SetStatusFilter(StatusFilter::Only(
            MatchStatus::Unmatched,
        )));
    let unmatched = engine.aggregate(&view.criteria()).await?;
    println!(
        "\nStill unmatched: {} record(s), variance {}",
        unmatched.filtered_records.len(),
        format_amount(&unmatched.totals.variance, 2)
    );

    Ok(())
}
