//! Readers turning delimited ledger exports into transactions
//!
//! Both readers skip the header row and blank lines, strip quote markers,
//! and skip rows that fail to parse, collecting the errors alongside the
//! transactions that did load.

pub mod bank;
pub mod system;

pub use bank::*;
pub use system::*;

use std::io::Read;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::warn;

use crate::types::*;
use crate::utils::validate_unique_ids;

/// Accepted date layouts, tried in order
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Transactions loaded from one input plus the rows that were skipped
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub transactions: Vec<Transaction>,
    /// One error per skipped row, in input order
    pub errors: Vec<ConciliationError>,
}

impl ParseOutcome {
    /// Whether every row loaded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail on the first skipped row or duplicate id instead of skipping
    pub fn into_strict(self) -> ConciliationResult<Vec<Transaction>> {
        let ParseOutcome {
            transactions,
            errors,
        } = self;

        if let Some(error) = errors.into_iter().next() {
            return Err(error);
        }
        validate_unique_ids(&transactions)?;
        Ok(transactions)
    }
}

/// Drive a CSV reader, handing each non-blank data row to `parse_row`
pub(crate) fn read_records<R, F>(
    input: R,
    delimiter: u8,
    mut parse_row: F,
) -> ConciliationResult<ParseOutcome>
where
    R: Read,
    F: FnMut(u64, &StringRecord) -> ConciliationResult<Transaction>,
{
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let mut outcome = ParseOutcome::default();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "skipping unreadable row");
                outcome.errors.push(e.into());
                continue;
            }
        };

        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match parse_row(line, &record) {
            Ok(transaction) => outcome.transactions.push(transaction),
            Err(e) => {
                warn!(line, error = %e, "skipping malformed row");
                outcome.errors.push(e);
            }
        }
    }

    Ok(outcome)
}

fn clean(value: &str) -> String {
    value.replace('"', "").trim().to_string()
}

/// A required column, with quote markers stripped
pub(crate) fn required_field(
    record: &StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> ConciliationResult<String> {
    record
        .get(index)
        .map(clean)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConciliationError::Parse {
            line,
            field: name.to_string(),
            message: "missing value".to_string(),
        })
}

/// An optional column; blank means absent
pub(crate) fn optional_field(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(clean)
        .filter(|value| !value.is_empty())
}

/// Parse a calendar date in any of the accepted layouts
pub fn parse_date(value: &str, line: u64) -> ConciliationResult<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| ConciliationError::Parse {
            line,
            field: "date".to_string(),
            message: format!("invalid date '{value}'"),
        })
}

/// Parse a signed decimal amount
pub fn parse_amount(value: &str, line: u64) -> ConciliationResult<BigDecimal> {
    BigDecimal::from_str(value).map_err(|e| ConciliationError::Parse {
        line,
        field: "amount".to_string(),
        message: format!("invalid amount '{value}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
        assert_eq!(parse_date("2024-12-28", 2).unwrap(), expected);
        assert_eq!(parse_date("28/12/2024", 2).unwrap(), expected);
        assert!(matches!(
            parse_date("2024-13-01", 7),
            Err(ConciliationError::Parse { line: 7, .. })
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("-2500.50", 2).unwrap(),
            "-2500.5".parse::<BigDecimal>().unwrap()
        );
        assert!(matches!(
            parse_amount("12,50", 3),
            Err(ConciliationError::Parse { line: 3, .. })
        ));
        assert!(parse_amount("abc", 3).is_err());
    }

    #[test]
    fn test_into_strict() {
        let clean = ParseOutcome::default();
        assert!(clean.is_clean());
        assert!(clean.into_strict().unwrap().is_empty());

        let dirty = ParseOutcome {
            transactions: vec![],
            errors: vec![ConciliationError::Parse {
                line: 4,
                field: "amount".to_string(),
                message: "invalid".to_string(),
            }],
        };
        assert!(!dirty.is_clean());
        assert!(matches!(
            dirty.into_strict(),
            Err(ConciliationError::Parse { line: 4, .. })
        ));
    }
}
