//! Ranked fuzzy candidates for a bank transaction

use crate::reconciliation::confidence::calculate_confidence;
use crate::reconciliation::config::ConciliationConfig;
use crate::types::*;

/// Candidates at or below this confidence are discarded
pub const CANDIDATE_FLOOR: f64 = 0.3;

/// A scored pool entry, still pointing into the pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    /// Position in the pool the candidate was scored from
    pub index: usize,
    pub confidence: f64,
}

/// Score every counterpart in the pool and rank the survivors
///
/// Sorted by descending confidence. The sort is stable, so equal scores keep
/// their pool order.
pub fn find_fuzzy_matches(
    bank: &Transaction,
    pool: &[Transaction],
    config: &ConciliationConfig,
) -> Vec<RankedCandidate> {
    let counterpart = bank.source.counterpart();

    let mut ranked: Vec<RankedCandidate> = pool
        .iter()
        .enumerate()
        .filter(|(_, system)| system.source == counterpart)
        .map(|(index, system)| RankedCandidate {
            index,
            confidence: calculate_confidence(bank, system, config),
        })
        .filter(|candidate| candidate.confidence > CANDIDATE_FLOOR)
        .collect();

    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked
}
