//! Presentation-layer view state for reconciliation tables

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::*;

/// Serializable state of one reconciliation table
///
/// Owned by the presentation layer and updated only through [`reduce`],
/// so every state can be reproduced from its action history.
///
/// [`reduce`]: ReconciliationView::reduce
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationView {
    pub search_term: String,
    pub status_filter: StatusFilter,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub selected: Option<RecordId>,
    pub expanded_groups: BTreeSet<String>,
    /// Suggestions accepted in this session, pending a server round-trip
    pub accepted: BTreeSet<RecordId>,
}

/// User interactions on a reconciliation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewAction {
    SetSearch(String),
    SetStatusFilter(StatusFilter),
    SetDateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    Select(RecordId),
    ClearSelection,
    ToggleGroup(String),
    MarkAccepted(RecordId),
    Reset,
}

impl ReconciliationView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action, returning the next state
    pub fn reduce(mut self, action: ViewAction) -> Self {
        match action {
            ViewAction::SetSearch(term) => self.search_term = term,
            ViewAction::SetStatusFilter(filter) => self.status_filter = filter,
            ViewAction::SetDateRange { from, to } => {
                self.date_from = from;
                self.date_to = to;
            }
            ViewAction::Select(id) => {
                // Clicking the selected row again closes the drill-down
                if self.selected.as_ref() == Some(&id) {
                    self.selected = None;
                } else {
                    self.selected = Some(id);
                }
            }
            ViewAction::ClearSelection => self.selected = None,
            ViewAction::ToggleGroup(group) => {
                if !self.expanded_groups.remove(&group) {
                    self.expanded_groups.insert(group);
                }
            }
            ViewAction::MarkAccepted(id) => {
                self.accepted.insert(id);
            }
            ViewAction::Reset => return Self::default(),
        }
        self
    }

    /// Criteria to hand to the aggregator for the current state
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new(self.search_term.clone(), self.status_filter)
            .between(self.date_from, self.date_to)
    }

    pub fn is_expanded(&self, group: &str) -> bool {
        self.expanded_groups.contains(group)
    }

    pub fn is_accepted(&self, id: &RecordId) -> bool {
        self.accepted.contains(id)
    }
}
