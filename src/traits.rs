//! Traits for input readers and configuration validation

use std::io::Read;

use crate::ingest::ParseOutcome;
use crate::reconciliation::ConciliationConfig;
use crate::types::*;
use crate::utils::validation::*;

/// Loads an ordered list of transactions from delimited text
///
/// Implement this for each ledger layout the application accepts. Rows that
/// fail to parse are reported in the outcome rather than aborting the load.
pub trait TransactionReader {
    /// Ledger the produced transactions belong to
    fn source(&self) -> TransactionSource;

    /// Read every row from the input
    fn read<R: Read>(&self, input: R) -> ConciliationResult<ParseOutcome>;

    /// Read every row from an in-memory string
    fn read_str(&self, content: &str) -> ConciliationResult<ParseOutcome> {
        self.read(content.as_bytes())
    }
}

/// Trait for implementing custom configuration validation rules
pub trait ConfigValidator: Send + Sync {
    /// Validate a configuration before an engine is built from it
    fn validate_config(&self, config: &ConciliationConfig) -> ConciliationResult<()>;
}

/// Default configuration validator enforcing the documented ranges
pub struct DefaultConfigValidator;

impl ConfigValidator for DefaultConfigValidator {
    fn validate_config(&self, config: &ConciliationConfig) -> ConciliationResult<()> {
        validate_date_tolerance(config.date_tolerance_days)?;
        validate_amount_tolerance(config.amount_tolerance_percent)?;
        validate_similarity_threshold(config.description_similarity_threshold)?;
        validate_priority_fields(&config.priority_fields)?;
        Ok(())
    }
}
