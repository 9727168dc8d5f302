//! # Reconciliation Core
//!
//! Reconciliation aggregation for bank feeds, payment processor payouts and
//! deferred-revenue schedules.
//!
//! ## Features
//!
//! - **Aggregation**: search/status/date filtering, per-status counts, totals on
//!   both sides and variance, all as pure functions over `BigDecimal` amounts
//! - **Grouping**: order-preserving grouping by transaction type or any key
//! - **Status transitions**: accept/reject suggestions, manual matches and
//!   cutoff-risk flags with an enforced transition table
//! - **Ingestion boundary**: record validation and JSON import
//! - **Matcher seam**: plug an external suggestion service in via `MatchSuggester`
//! - **Source abstraction**: backend-agnostic design with trait-based record sources
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{
//!     FilterCriteria, MatchStatus, ReconciliationAggregator, ReconciliationRecord, StatusFilter,
//! };
//! use bigdecimal::BigDecimal;
//!
//! let records = vec![
//!     ReconciliationRecord::matched(
//!         1i64,
//!         "Acme Corp payment".to_string(),
//!         BigDecimal::from(100),
//!         BigDecimal::from(100),
//!         Some("JE-1".to_string()),
//!     ),
//!     ReconciliationRecord::new(2i64, "Other vendor".to_string(), BigDecimal::from(50)),
//! ];
//!
//! let result = ReconciliationAggregator::new()
//!     .aggregate(&records, &FilterCriteria::new("", StatusFilter::All));
//!
//! assert_eq!(result.totals.variance, BigDecimal::from(50));
//! assert_eq!(result.counts_by_status.get(MatchStatus::Unmatched), 1);
//! ```

pub mod aggregator;
pub mod config;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;
pub mod view;

// Re-export commonly used types
pub use aggregator::*;
pub use config::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
pub use view::*;
