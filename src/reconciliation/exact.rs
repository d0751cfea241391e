//! Strict equality rule applied before any scoring

use crate::reconciliation::confidence::cent_tolerance;
use crate::reconciliation::config::ConciliationConfig;
use crate::types::*;

/// Whether a pair satisfies the exact rule
///
/// Amount within one cent, dates within the tolerance window (inclusive), and
/// equal documents when both sides carry one.
pub fn is_exact_match(bank: &Transaction, system: &Transaction, config: &ConciliationConfig) -> bool {
    if system.source != bank.source.counterpart() {
        return false;
    }

    if bank.amount_difference(system) > cent_tolerance() {
        return false;
    }

    if bank.days_between(system) > config.date_tolerance_days {
        return false;
    }

    match (bank.document_ref(), system.document_ref()) {
        (Some(bank_doc), Some(system_doc)) => bank_doc == system_doc,
        _ => true,
    }
}

/// Position in the pool of the first system transaction matching exactly
pub fn find_exact_match(
    bank: &Transaction,
    pool: &[Transaction],
    config: &ConciliationConfig,
) -> Option<usize> {
    pool.iter()
        .position(|system| is_exact_match(bank, system, config))
}

/// Criteria reported for an exact match
///
/// Document is only claimed when both sides actually carried one.
pub fn exact_criteria(
    bank: &Transaction,
    system: &Transaction,
    config: &ConciliationConfig,
) -> Vec<MatchCriterion> {
    let mut criteria = vec![MatchCriterion::Amount, MatchCriterion::Date];
    if bank.document_ref().is_some() && system.document_ref().is_some() {
        criteria.push(MatchCriterion::Document);
    }
    config.order_criteria(&criteria)
}
