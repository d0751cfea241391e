//! Reconciliation engine for bank statements against the internal ledger
//!
//! Each bank transaction is tried against the exact rule first, then the
//! weighted fuzzy model. Matching is greedy and single pass: a consumed
//! system transaction is never offered again, so results depend on the order
//! of the bank statement.

pub mod confidence;
pub mod config;
pub mod exact;
pub mod fuzzy;
pub mod report;
pub mod similarity;

pub use confidence::*;
pub use config::*;
pub use exact::*;
pub use fuzzy::*;
pub use report::*;
pub use similarity::*;

use std::convert::Infallible;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// Fuzzy matches above this confidence are accepted automatically
pub const AUTO_ACCEPT_THRESHOLD: f64 = 0.8;
/// Fuzzy matches above this confidence are queued for review
pub const REVIEW_THRESHOLD: f64 = 0.5;

/// Where a bank transaction ended up after classification
enum Disposition {
    Matched(MatchResult),
    Possible(PossibleMatch),
    Unmatched,
}

/// Classifies bank transactions against a pool of system transactions
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: ConciliationConfig,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self {
            config: ConciliationConfig::default(),
        }
    }
}

impl ReconciliationEngine {
    /// Create an engine, rejecting out-of-range configuration
    pub fn new(config: ConciliationConfig) -> ConciliationResult<Self> {
        Self::with_validator(config, &DefaultConfigValidator)
    }

    /// Create an engine with a custom configuration validator
    pub fn with_validator(
        config: ConciliationConfig,
        validator: &dyn ConfigValidator,
    ) -> ConciliationResult<Self> {
        validator.validate_config(&config)?;
        Ok(Self { config })
    }

    /// Configuration this engine runs with
    pub fn config(&self) -> &ConciliationConfig {
        &self.config
    }

    /// Reconcile a bank statement against the system ledger
    pub fn reconcile(
        &self,
        bank_transactions: &[Transaction],
        system_transactions: &[Transaction],
    ) -> ReconciliationReport {
        match self.sweep(bank_transactions, system_transactions, |_| {
            Ok::<(), Infallible>(())
        }) {
            Ok(report) => report,
            Err(never) => match never {},
        }
    }

    /// Reconcile, giving up if `deadline` passes between bank transactions
    ///
    /// Either the whole report is returned or nothing is.
    pub fn reconcile_until(
        &self,
        bank_transactions: &[Transaction],
        system_transactions: &[Transaction],
        deadline: Instant,
    ) -> ConciliationResult<ReconciliationReport> {
        let total = bank_transactions.len();
        self.sweep(bank_transactions, system_transactions, |processed| {
            if Instant::now() >= deadline {
                warn!(processed, total, "reconciliation deadline exceeded");
                Err(ConciliationError::DeadlineExceeded { processed, total })
            } else {
                Ok(())
            }
        })
    }

    /// Single greedy pass over the bank statement
    ///
    /// `checkpoint` runs before each bank transaction with the number already
    /// processed; an error abandons the run.
    fn sweep<E>(
        &self,
        bank_transactions: &[Transaction],
        system_transactions: &[Transaction],
        mut checkpoint: impl FnMut(usize) -> Result<(), E>,
    ) -> Result<ReconciliationReport, E> {
        let run_id = Uuid::new_v4();
        let _span = info_span!(
            "reconcile",
            %run_id,
            bank = bank_transactions.len(),
            system = system_transactions.len()
        )
        .entered();

        let mut pool = system_transactions.to_vec();
        let mut matches = Vec::new();
        let mut unmatched_bank = Vec::new();
        let mut possible_matches = Vec::new();

        for (processed, bank_tx) in bank_transactions.iter().enumerate() {
            checkpoint(processed)?;
            match self.classify(bank_tx, &mut pool) {
                Disposition::Matched(result) => matches.push(result),
                Disposition::Possible(possible) => possible_matches.push(possible),
                Disposition::Unmatched => unmatched_bank.push(bank_tx.clone()),
            }
        }

        let mut report = ReconciliationReport {
            run_id,
            completed_at: Utc::now(),
            matches,
            unmatched_bank,
            unmatched_system: pool,
            possible_matches,
        };
        settle_possible_matches(&mut report);

        let summary = report.summary();
        info!(
            matched = summary.matched(),
            exact = summary.exact_matches,
            fuzzy = summary.fuzzy_matches,
            possible = summary.possible_matches,
            unmatched_bank = summary.unmatched_bank,
            unmatched_system = summary.unmatched_system,
            "reconciliation finished"
        );

        Ok(report)
    }

    /// Exact, then fuzzy, then possible, then unmatched
    fn classify(&self, bank_tx: &Transaction, pool: &mut Vec<Transaction>) -> Disposition {
        if let Some(index) = find_exact_match(bank_tx, pool, &self.config) {
            let system_tx = pool.remove(index);
            debug!(bank = %bank_tx.id, system = %system_tx.id, "exact match");
            return Disposition::Matched(MatchResult {
                criteria: exact_criteria(bank_tx, &system_tx, &self.config),
                bank_transaction: bank_tx.clone(),
                system_transaction: system_tx,
                confidence: 1.0,
                match_type: MatchType::Exact,
            });
        }

        if !self.config.enable_fuzzy_matching {
            debug!(bank = %bank_tx.id, "no exact match, fuzzy matching disabled");
            return Disposition::Unmatched;
        }

        let ranked = find_fuzzy_matches(bank_tx, pool, &self.config);
        let Some(best) = ranked.first().copied() else {
            debug!(bank = %bank_tx.id, "no candidates");
            return Disposition::Unmatched;
        };

        if best.confidence > AUTO_ACCEPT_THRESHOLD {
            let system_tx = pool.remove(best.index);
            debug!(
                bank = %bank_tx.id,
                system = %system_tx.id,
                confidence = best.confidence,
                "fuzzy match"
            );
            Disposition::Matched(MatchResult {
                criteria: match_criteria(bank_tx, &system_tx, &self.config),
                bank_transaction: bank_tx.clone(),
                system_transaction: system_tx,
                confidence: best.confidence,
                match_type: MatchType::Fuzzy,
            })
        } else if best.confidence > REVIEW_THRESHOLD {
            debug!(
                bank = %bank_tx.id,
                candidates = ranked.len(),
                best = best.confidence,
                "possible match queued for review"
            );
            Disposition::Possible(PossibleMatch {
                bank_transaction: bank_tx.clone(),
                candidates: ranked
                    .iter()
                    .map(|candidate| MatchCandidate {
                        transaction: pool[candidate.index].clone(),
                        confidence: candidate.confidence,
                    })
                    .collect(),
            })
        } else {
            debug!(bank = %bank_tx.id, best = best.confidence, "best candidate below review threshold");
            Disposition::Unmatched
        }
    }

    /// Accept one of a possible match's candidates as a manual match
    pub fn confirm_possible_match(
        &self,
        report: &mut ReconciliationReport,
        bank_id: &str,
        system_id: &str,
    ) -> ConciliationResult<MatchResult> {
        let possible_index = report
            .possible_matches
            .iter()
            .position(|p| p.bank_transaction.id == bank_id)
            .ok_or_else(|| ConciliationError::TransactionNotFound(bank_id.to_string()))?;

        let confidence = report.possible_matches[possible_index]
            .candidates
            .iter()
            .find(|c| c.transaction.id == system_id)
            .map(|c| c.confidence)
            .ok_or_else(|| ConciliationError::TransactionNotFound(system_id.to_string()))?;

        let pool_index = Self::pool_position(report, system_id)?;

        let possible = report.possible_matches.remove(possible_index);
        let result = self.consume(report, possible.bank_transaction, pool_index, confidence);
        info!(bank = bank_id, system = system_id, "possible match confirmed");
        Ok(result)
    }

    /// Dismiss a possible match, leaving the bank transaction unmatched
    pub fn reject_possible_match(
        &self,
        report: &mut ReconciliationReport,
        bank_id: &str,
    ) -> ConciliationResult<()> {
        let possible_index = report
            .possible_matches
            .iter()
            .position(|p| p.bank_transaction.id == bank_id)
            .ok_or_else(|| ConciliationError::TransactionNotFound(bank_id.to_string()))?;

        let possible = report.possible_matches.remove(possible_index);
        report.unmatched_bank.push(possible.bank_transaction);
        info!(bank = bank_id, "possible match rejected");
        Ok(())
    }

    /// Pair any unresolved bank transaction with any unmatched system one
    pub fn manual_match(
        &self,
        report: &mut ReconciliationReport,
        bank_id: &str,
        system_id: &str,
    ) -> ConciliationResult<MatchResult> {
        if report.match_for_bank(bank_id).is_some() {
            return Err(ConciliationError::AlreadyMatched(bank_id.to_string()));
        }

        let unmatched_index = report
            .unmatched_bank
            .iter()
            .position(|t| t.id == bank_id);
        let possible_index = report
            .possible_matches
            .iter()
            .position(|p| p.bank_transaction.id == bank_id);
        if unmatched_index.is_none() && possible_index.is_none() {
            return Err(ConciliationError::TransactionNotFound(bank_id.to_string()));
        }

        let pool_index = Self::pool_position(report, system_id)?;

        let bank_tx = if let Some(index) = unmatched_index {
            report.unmatched_bank.remove(index)
        } else if let Some(index) = possible_index {
            report.possible_matches.remove(index).bank_transaction
        } else {
            return Err(ConciliationError::TransactionNotFound(bank_id.to_string()));
        };
        let confidence =
            calculate_confidence(&bank_tx, &report.unmatched_system[pool_index], &self.config);

        let result = self.consume(report, bank_tx, pool_index, confidence);
        info!(bank = bank_id, system = system_id, confidence, "manual match recorded");
        Ok(result)
    }

    fn pool_position(report: &ReconciliationReport, system_id: &str) -> ConciliationResult<usize> {
        match report
            .unmatched_system
            .iter()
            .position(|t| t.id == system_id)
        {
            Some(index) => Ok(index),
            None if report.match_for_system(system_id).is_some() => {
                Err(ConciliationError::AlreadyMatched(system_id.to_string()))
            }
            None => Err(ConciliationError::TransactionNotFound(system_id.to_string())),
        }
    }

    /// Record a manual match and withdraw the system transaction from review
    fn consume(
        &self,
        report: &mut ReconciliationReport,
        bank_tx: Transaction,
        pool_index: usize,
        confidence: f64,
    ) -> MatchResult {
        let system_tx = report.unmatched_system.remove(pool_index);
        settle_possible_matches(report);

        let result = MatchResult {
            criteria: match_criteria(&bank_tx, &system_tx, &self.config),
            bank_transaction: bank_tx,
            system_transaction: system_tx,
            confidence: confidence.clamp(0.0, 1.0),
            match_type: MatchType::Manual,
        };
        report.matches.push(result.clone());
        result
    }
}

/// Drop candidates no longer in the system pool
///
/// A possible match left without a candidate above the review threshold
/// moves to the unmatched bank transactions.
fn settle_possible_matches(report: &mut ReconciliationReport) {
    let pool = &report.unmatched_system;
    let mut still_open = Vec::with_capacity(report.possible_matches.len());

    for mut possible in report.possible_matches.drain(..) {
        possible
            .candidates
            .retain(|c| pool.iter().any(|t| t.id == c.transaction.id));
        let reviewable = possible
            .best()
            .is_some_and(|best| best.confidence > REVIEW_THRESHOLD);
        if reviewable {
            still_open.push(possible);
        } else {
            debug!(bank = %possible.bank_transaction.id, "no reviewable candidate left");
            report.unmatched_bank.push(possible.bank_transaction);
        }
    }

    report.possible_matches = still_open;
}
