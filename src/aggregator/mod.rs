//! Reconciliation aggregator: filtering, grouping, status counts and totals
//!
//! Everything in this module is a pure function of its inputs.

pub mod core;
pub mod filter;
pub mod group;
pub mod totals;

pub use self::core::*;
pub use filter::*;
pub use group::*;
pub use totals::*;
