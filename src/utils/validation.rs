//! Validation utilities

use std::collections::HashSet;

use crate::types::*;

/// Validate that the date tolerance is not negative
pub fn validate_date_tolerance(days: i64) -> ConciliationResult<()> {
    if days < 0 {
        return Err(ConciliationError::Config(format!(
            "Date tolerance cannot be negative: {days}"
        )));
    }
    Ok(())
}

/// Validate that the amount tolerance percentage is a non-negative number
pub fn validate_amount_tolerance(percent: f64) -> ConciliationResult<()> {
    if !percent.is_finite() || percent < 0.0 {
        return Err(ConciliationError::Config(format!(
            "Amount tolerance must be a non-negative percentage: {percent}"
        )));
    }
    Ok(())
}

/// Validate that the similarity threshold lies in [0, 1]
pub fn validate_similarity_threshold(threshold: f64) -> ConciliationResult<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConciliationError::Config(format!(
            "Description similarity threshold must be between 0 and 1: {threshold}"
        )));
    }
    Ok(())
}

/// Validate that no criterion is listed twice
pub fn validate_priority_fields(fields: &[MatchCriterion]) -> ConciliationResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field) {
            return Err(ConciliationError::Config(format!(
                "Priority field '{field}' appears more than once"
            )));
        }
    }
    Ok(())
}

/// Validate that transaction ids are unique within one ledger
pub fn validate_unique_ids(transactions: &[Transaction]) -> ConciliationResult<()> {
    let mut seen = HashSet::new();
    for tx in transactions {
        if !seen.insert((tx.source, tx.id.as_str())) {
            return Err(ConciliationError::Validation(format!(
                "Duplicate {} transaction id '{}'",
                tx.source, tx.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_ranges() {
        assert!(validate_date_tolerance(0).is_ok());
        assert!(validate_date_tolerance(-3).is_err());

        assert!(validate_amount_tolerance(0.0).is_ok());
        assert!(validate_amount_tolerance(150.0).is_ok());
        assert!(validate_amount_tolerance(f64::INFINITY).is_err());

        assert!(validate_similarity_threshold(0.0).is_ok());
        assert!(validate_similarity_threshold(1.0).is_ok());
        assert!(validate_similarity_threshold(1.01).is_err());
        assert!(validate_similarity_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_unique_ids() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let a = Transaction::system("S1".to_string(), date, "A".to_string(), 1.into());
        let b = Transaction::bank("S1".to_string(), date, "B".to_string(), 1.into());

        assert!(validate_unique_ids(&[a.clone(), b]).is_ok());
        assert!(matches!(
            validate_unique_ids(&[a.clone(), a]),
            Err(ConciliationError::Validation(_))
        ));
    }
}
