//! Tolerances and weights that drive a reconciliation run

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Tolerance parameters for a reconciliation run
///
/// Built once per run and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConciliationConfig {
    /// Maximum day distance for the date rule (inclusive)
    pub date_tolerance_days: i64,
    /// Amount tolerance for fuzzy scoring, as a percentage of the bank amount
    pub amount_tolerance_percent: f64,
    /// Minimum description similarity for the description rule
    pub description_similarity_threshold: f64,
    /// Run the fuzzy matcher after the exact matcher
    pub enable_fuzzy_matching: bool,
    /// Reporting order for match criteria
    pub priority_fields: Vec<MatchCriterion>,
}

impl Default for ConciliationConfig {
    fn default() -> Self {
        Self {
            date_tolerance_days: 3,
            amount_tolerance_percent: 0.1,
            description_similarity_threshold: 0.7,
            enable_fuzzy_matching: true,
            priority_fields: MatchCriterion::ALL.to_vec(),
        }
    }
}

pub const ENV_DATE_TOLERANCE_DAYS: &str = "CONCILIATION_DATE_TOLERANCE_DAYS";
pub const ENV_AMOUNT_TOLERANCE_PERCENT: &str = "CONCILIATION_AMOUNT_TOLERANCE_PERCENT";
pub const ENV_DESCRIPTION_THRESHOLD: &str = "CONCILIATION_DESCRIPTION_THRESHOLD";
pub const ENV_ENABLE_FUZZY: &str = "CONCILIATION_ENABLE_FUZZY";
pub const ENV_PRIORITY_FIELDS: &str = "CONCILIATION_PRIORITY_FIELDS";

impl ConciliationConfig {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> ConciliationResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup on top of the defaults
    pub fn from_lookup<F>(lookup: F) -> ConciliationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DATE_TOLERANCE_DAYS) {
            config.date_tolerance_days = parse_value(ENV_DATE_TOLERANCE_DAYS, &value)?;
        }
        if let Some(value) = lookup(ENV_AMOUNT_TOLERANCE_PERCENT) {
            config.amount_tolerance_percent = parse_value(ENV_AMOUNT_TOLERANCE_PERCENT, &value)?;
        }
        if let Some(value) = lookup(ENV_DESCRIPTION_THRESHOLD) {
            config.description_similarity_threshold =
                parse_value(ENV_DESCRIPTION_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_ENABLE_FUZZY) {
            config.enable_fuzzy_matching = parse_value(ENV_ENABLE_FUZZY, &value)?;
        }
        if let Some(value) = lookup(ENV_PRIORITY_FIELDS) {
            config.priority_fields = value
                .split(',')
                .filter(|field| !field.trim().is_empty())
                .map(|field| field.parse::<MatchCriterion>())
                .collect::<ConciliationResult<Vec<_>>>()?;
        }

        Ok(config)
    }

    /// Order criteria by `priority_fields`, unlisted ones last in canonical order
    pub fn order_criteria(&self, criteria: &[MatchCriterion]) -> Vec<MatchCriterion> {
        self.priority_fields
            .iter()
            .chain(MatchCriterion::ALL.iter())
            .filter(|criterion| criteria.contains(*criterion))
            .fold(Vec::with_capacity(criteria.len()), |mut ordered, criterion| {
                if !ordered.contains(criterion) {
                    ordered.push(*criterion);
                }
                ordered
            })
    }
}

fn parse_value<T>(key: &str, value: &str) -> ConciliationResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConciliationError::Config(format!("{key}={value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConciliationConfig::default();
        assert_eq!(config.date_tolerance_days, 3);
        assert_eq!(config.amount_tolerance_percent, 0.1);
        assert_eq!(config.description_similarity_threshold, 0.7);
        assert!(config.enable_fuzzy_matching);
        assert_eq!(config.priority_fields, MatchCriterion::ALL.to_vec());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = ConciliationConfig::from_lookup(lookup_from(&[
            (ENV_DATE_TOLERANCE_DAYS, "5"),
            (ENV_AMOUNT_TOLERANCE_PERCENT, "1.5"),
            (ENV_ENABLE_FUZZY, "false"),
            (ENV_PRIORITY_FIELDS, "document, amount"),
        ]))
        .unwrap();

        assert_eq!(config.date_tolerance_days, 5);
        assert_eq!(config.amount_tolerance_percent, 1.5);
        assert_eq!(config.description_similarity_threshold, 0.7);
        assert!(!config.enable_fuzzy_matching);
        assert_eq!(
            config.priority_fields,
            vec![MatchCriterion::Document, MatchCriterion::Amount]
        );
    }

    #[test]
    fn test_lookup_rejects_garbage() {
        let result = ConciliationConfig::from_lookup(lookup_from(&[(
            ENV_DATE_TOLERANCE_DAYS,
            "three",
        )]));
        assert!(matches!(result, Err(ConciliationError::Config(_))));

        let result =
            ConciliationConfig::from_lookup(lookup_from(&[(ENV_PRIORITY_FIELDS, "amount,payee")]));
        assert!(matches!(result, Err(ConciliationError::Config(_))));
    }

    #[test]
    fn test_order_criteria() {
        let config = ConciliationConfig {
            priority_fields: vec![MatchCriterion::Description, MatchCriterion::Amount],
            ..Default::default()
        };
        let ordered = config.order_criteria(&[
            MatchCriterion::Amount,
            MatchCriterion::Date,
            MatchCriterion::Description,
        ]);
        assert_eq!(
            ordered,
            vec![
                MatchCriterion::Description,
                MatchCriterion::Amount,
                MatchCriterion::Date
            ]
        );

        let default_order = ConciliationConfig::default()
            .order_criteria(&[MatchCriterion::Date, MatchCriterion::Amount]);
        assert_eq!(default_order, vec![MatchCriterion::Amount, MatchCriterion::Date]);
    }
}
