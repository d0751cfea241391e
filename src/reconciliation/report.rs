//! Reconciliation output consumed by reporting and review collaborators

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::*;

/// Full outcome of one reconciliation run
///
/// Every bank transaction lands in exactly one of `matches`,
/// `possible_matches` or `unmatched_bank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Identifier of the run that produced this report
    pub run_id: Uuid,
    /// When the sweep finished
    pub completed_at: DateTime<Utc>,
    pub matches: Vec<MatchResult>,
    pub unmatched_bank: Vec<Transaction>,
    /// System transactions never consumed by a match, in input order
    pub unmatched_system: Vec<Transaction>,
    pub possible_matches: Vec<PossibleMatch>,
}

impl ReconciliationReport {
    /// Number of bank transactions accounted for across all buckets
    pub fn bank_count(&self) -> usize {
        self.matches.len() + self.possible_matches.len() + self.unmatched_bank.len()
    }

    /// Look up the match a bank transaction ended up in
    pub fn match_for_bank(&self, bank_id: &str) -> Option<&MatchResult> {
        self.matches
            .iter()
            .find(|m| m.bank_transaction.id == bank_id)
    }

    /// Look up the match a system transaction was consumed by
    pub fn match_for_system(&self, system_id: &str) -> Option<&MatchResult> {
        self.matches
            .iter()
            .find(|m| m.system_transaction.id == system_id)
    }

    /// Aggregate counts for dashboards
    pub fn summary(&self) -> ReconciliationSummary {
        let count_of = |match_type: MatchType| {
            self.matches
                .iter()
                .filter(|m| m.match_type == match_type)
                .count()
        };

        let total_bank = self.bank_count();
        let match_rate = if total_bank == 0 {
            0.0
        } else {
            self.matches.len() as f64 / total_bank as f64 * 100.0
        };

        ReconciliationSummary {
            total_bank,
            exact_matches: count_of(MatchType::Exact),
            fuzzy_matches: count_of(MatchType::Fuzzy),
            manual_matches: count_of(MatchType::Manual),
            possible_matches: self.possible_matches.len(),
            unmatched_bank: self.unmatched_bank.len(),
            unmatched_system: self.unmatched_system.len(),
            match_rate,
            matched_amount: self
                .matches
                .iter()
                .map(|m| &m.bank_transaction.amount)
                .sum(),
        }
    }
}

/// Headline numbers of a reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub total_bank: usize,
    pub exact_matches: usize,
    pub fuzzy_matches: usize,
    pub manual_matches: usize,
    pub possible_matches: usize,
    pub unmatched_bank: usize,
    pub unmatched_system: usize,
    /// Percentage of bank transactions matched
    pub match_rate: f64,
    /// Sum of matched bank amounts
    pub matched_amount: BigDecimal,
}

impl ReconciliationSummary {
    /// Total matches of any type
    pub fn matched(&self) -> usize {
        self.exact_matches + self.fuzzy_matches + self.manual_matches
    }
}
