//! Weighted confidence model for a bank/system transaction pair

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::reconciliation::config::ConciliationConfig;
use crate::reconciliation::similarity::string_similarity;
use crate::types::*;

/// Weight of the amount rule
pub const AMOUNT_WEIGHT: f64 = 0.4;
/// Weight of the date rule
pub const DATE_WEIGHT: f64 = 0.3;
/// Weight of the description rule
pub const DESCRIPTION_WEIGHT: f64 = 0.3;

/// Absolute amount tolerance used by the exact rule and the criteria report
pub fn cent_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 2)
}

/// Per-rule contributions to a pair's confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub amount: f64,
    pub date: f64,
    pub description: f64,
    /// Raw description similarity, whether or not it cleared the threshold
    pub similarity: f64,
}

impl ConfidenceBreakdown {
    /// Score a pair against the config
    pub fn score(bank: &Transaction, system: &Transaction, config: &ConciliationConfig) -> Self {
        let similarity = string_similarity(&bank.description, &system.description);
        let description = if similarity >= config.description_similarity_threshold {
            DESCRIPTION_WEIGHT * similarity
        } else {
            0.0
        };

        Self {
            amount: amount_score(bank, system, config),
            date: date_score(bank, system, config),
            description,
            similarity,
        }
    }

    /// Combined confidence in [0, 1]
    ///
    /// The weights sum to one and rules that did not fire still count
    /// against that maximum, so the total is the plain sum.
    pub fn total(&self) -> f64 {
        (self.amount + self.date + self.description).clamp(0.0, 1.0)
    }
}

/// Amount contribution, scaled by the distance inside the percentage tolerance
///
/// The tolerance is relative to the bank amount. When it is zero only an
/// exact amount earns the full weight.
pub fn amount_score(bank: &Transaction, system: &Transaction, config: &ConciliationConfig) -> f64 {
    let diff = bank.amount_difference(system);
    let bank_magnitude = bank.amount.abs().to_f64().unwrap_or(0.0);
    let tolerance = bank_magnitude * (config.amount_tolerance_percent / 100.0);

    if tolerance <= 0.0 {
        return if diff.is_zero() { AMOUNT_WEIGHT } else { 0.0 };
    }

    let diff = diff.to_f64().unwrap_or(f64::INFINITY);
    if diff <= tolerance {
        AMOUNT_WEIGHT * (1.0 - diff / tolerance)
    } else {
        0.0
    }
}

/// Date contribution, scaled by the day distance inside the tolerance window
pub fn date_score(bank: &Transaction, system: &Transaction, config: &ConciliationConfig) -> f64 {
    let days = bank.days_between(system);
    let tolerance = config.date_tolerance_days;

    if tolerance <= 0 {
        return if days == 0 { DATE_WEIGHT } else { 0.0 };
    }

    if days <= tolerance {
        DATE_WEIGHT * (1.0 - days as f64 / tolerance as f64)
    } else {
        0.0
    }
}

/// Weighted confidence that two transactions describe the same event
pub fn calculate_confidence(
    bank: &Transaction,
    system: &Transaction,
    config: &ConciliationConfig,
) -> f64 {
    ConfidenceBreakdown::score(bank, system, config).total()
}

/// Criteria that independently hold for a pair, ordered by priority
///
/// Independent of the weighted score: the amount criterion uses the fixed
/// cent tolerance, not the percentage one.
pub fn match_criteria(
    bank: &Transaction,
    system: &Transaction,
    config: &ConciliationConfig,
) -> Vec<MatchCriterion> {
    let mut criteria = Vec::with_capacity(MatchCriterion::ALL.len());

    if bank.amount_difference(system) <= cent_tolerance() {
        criteria.push(MatchCriterion::Amount);
    }

    if bank.days_between(system) <= config.date_tolerance_days {
        criteria.push(MatchCriterion::Date);
    }

    if let (Some(bank_doc), Some(system_doc)) = (bank.document_ref(), system.document_ref()) {
        if bank_doc == system_doc {
            criteria.push(MatchCriterion::Document);
        }
    }

    if string_similarity(&bank.description, &system.description)
        >= config.description_similarity_threshold
    {
        criteria.push(MatchCriterion::Description);
    }

    config.order_criteria(&criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(
        source: TransactionSource,
        id: &str,
        day: u32,
        description: &str,
        amount: &str,
    ) -> Transaction {
        Transaction::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2024, 12, day).unwrap(),
            description.to_string(),
            amount.parse().unwrap(),
            source,
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_pair_scores_one() {
        let config = ConciliationConfig::default();
        let bank = tx(TransactionSource::Bank, "B1", 28, "TED EMPRESA XYZ", "15000.00");
        let system = tx(TransactionSource::System, "S1", 28, "ted empresa xyz", "15000.00");

        assert!(approx(calculate_confidence(&bank, &system, &config), 1.0));
    }

    #[test]
    fn test_amount_partial_score() {
        let config = ConciliationConfig::default();
        let bank = tx(TransactionSource::Bank, "B1", 28, "TED", "-2500.50");
        let system = tx(TransactionSource::System, "S1", 28, "TED", "-2500.00");

        // tolerance = 2500.50 * 0.1% = 2.5005
        let expected = AMOUNT_WEIGHT * (1.0 - 0.5 / 2.5005);
        assert!(approx(amount_score(&bank, &system, &config), expected));
    }

    #[test]
    fn test_amount_outside_tolerance() {
        let config = ConciliationConfig::default();
        let bank = tx(TransactionSource::Bank, "B1", 28, "TED", "100.00");
        let system = tx(TransactionSource::System, "S1", 28, "TED", "101.00");

        assert_eq!(amount_score(&bank, &system, &config), 0.0);
    }

    #[test]
    fn test_zero_bank_amount() {
        let config = ConciliationConfig::default();
        let bank = tx(TransactionSource::Bank, "B1", 28, "TARIFA", "0.00");
        let same = tx(TransactionSource::System, "S1", 28, "TARIFA", "0");
        let other = tx(TransactionSource::System, "S2", 28, "TARIFA", "0.01");

        assert_eq!(amount_score(&bank, &same, &config), AMOUNT_WEIGHT);
        assert_eq!(amount_score(&bank, &other, &config), 0.0);
    }

    #[test]
    fn test_zero_percent_tolerance_is_exact_only() {
        let config = ConciliationConfig {
            amount_tolerance_percent: 0.0,
            ..Default::default()
        };
        let bank = tx(TransactionSource::Bank, "B1", 28, "TED", "500.00");
        let same = tx(TransactionSource::System, "S1", 28, "TED", "500");
        let off = tx(TransactionSource::System, "S2", 28, "TED", "500.01");

        assert_eq!(amount_score(&bank, &same, &config), AMOUNT_WEIGHT);
        assert_eq!(amount_score(&bank, &off, &config), 0.0);
    }

    #[test]
    fn test_date_score() {
        let config = ConciliationConfig::default();
        let bank = tx(TransactionSource::Bank, "B1", 10, "TED", "10");
        let one_day = tx(TransactionSource::System, "S1", 11, "TED", "10");
        let edge = tx(TransactionSource::System, "S2", 13, "TED", "10");
        let outside = tx(TransactionSource::System, "S3", 14, "TED", "10");

        assert!(approx(date_score(&bank, &one_day, &config), DATE_WEIGHT * (2.0 / 3.0)));
        assert_eq!(date_score(&bank, &edge, &config), 0.0);
        assert_eq!(date_score(&bank, &outside, &config), 0.0);
    }

    #[test]
    fn test_zero_day_tolerance() {
        let config = ConciliationConfig {
            date_tolerance_days: 0,
            ..Default::default()
        };
        let bank = tx(TransactionSource::Bank, "B1", 10, "TED", "10");
        let same_day = tx(TransactionSource::System, "S1", 10, "TED", "10");
        let next_day = tx(TransactionSource::System, "S2", 11, "TED", "10");

        assert_eq!(date_score(&bank, &same_day, &config), DATE_WEIGHT);
        assert_eq!(date_score(&bank, &next_day, &config), 0.0);
    }

    #[test]
    fn test_description_below_threshold_contributes_nothing() {
        let config = ConciliationConfig::default();
        let bank = tx(TransactionSource::Bank, "B1", 10, "SAQUE CAIXA ELETRONICO", "10");
        let system = tx(TransactionSource::System, "S1", 10, "RECEITA VENDA PRODUTO", "10");

        let breakdown = ConfidenceBreakdown::score(&bank, &system, &config);
        assert!(breakdown.similarity < config.description_similarity_threshold);
        assert_eq!(breakdown.description, 0.0);
        assert!(approx(breakdown.total(), AMOUNT_WEIGHT + DATE_WEIGHT));
    }

    #[test]
    fn test_confidence_is_asymmetric() {
        let config = ConciliationConfig {
            amount_tolerance_percent: 10.0,
            ..Default::default()
        };
        let bank = tx(TransactionSource::Bank, "B1", 10, "TED", "100");
        let system = tx(TransactionSource::System, "S1", 10, "TED", "109");

        // tolerance follows the first argument's magnitude
        let forward = amount_score(&bank, &system, &config);
        let swapped = amount_score(&system, &bank, &config);
        assert!(approx(forward, AMOUNT_WEIGHT * (1.0 - 9.0 / 10.0)));
        assert!(approx(swapped, AMOUNT_WEIGHT * (1.0 - 9.0 / 10.9)));
        assert!(forward != swapped);
    }

    #[test]
    fn test_match_criteria() {
        let config = ConciliationConfig::default();
        let bank = tx(TransactionSource::Bank, "B1", 10, "PIX JOAO SILVA", "250.00")
            .with_document("DOC000001".to_string());
        let system = tx(TransactionSource::System, "S1", 12, "PIX JOAO SILVA", "250.005")
            .with_document("DOC000001".to_string());

        assert_eq!(
            match_criteria(&bank, &system, &config),
            vec![
                MatchCriterion::Amount,
                MatchCriterion::Date,
                MatchCriterion::Document,
                MatchCriterion::Description
            ]
        );

        let far = tx(TransactionSource::System, "S2", 20, "ALUGUEL", "250.02");
        assert!(match_criteria(&bank, &far, &config).is_empty());
    }

    #[test]
    fn test_match_criteria_skips_missing_documents() {
        let config = ConciliationConfig::default();
        let bank = tx(TransactionSource::Bank, "B1", 10, "PIX", "250.00")
            .with_document("DOC1".to_string());
        let system = tx(TransactionSource::System, "S1", 10, "PIX", "250.00");

        let criteria = match_criteria(&bank, &system, &config);
        assert!(!criteria.contains(&MatchCriterion::Document));
    }
}
