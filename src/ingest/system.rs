//! Internal ledger export: `id,date,description,amount,category`

use std::io::Read;

use csv::StringRecord;

use crate::ingest::*;
use crate::traits::TransactionReader;
use crate::types::*;

/// Reader for internal accounting system exports
#[derive(Debug, Clone)]
pub struct SystemLedgerReader {
    delimiter: u8,
}

impl Default for SystemLedgerReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemLedgerReader {
    /// Create a comma-delimited reader
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Create a reader for a different delimiter
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    fn parse_row(line: u64, record: &StringRecord) -> ConciliationResult<Transaction> {
        let id = required_field(record, 0, "id", line)?;
        let date = parse_date(&required_field(record, 1, "date", line)?, line)?;
        let description = optional_field(record, 2).unwrap_or_default();
        let amount = parse_amount(&required_field(record, 3, "amount", line)?, line)?;

        let mut transaction = Transaction::system(id, date, description, amount);
        transaction.category = optional_field(record, 4);
        Ok(transaction)
    }
}

impl TransactionReader for SystemLedgerReader {
    fn source(&self) -> TransactionSource {
        TransactionSource::System
    }

    fn read<R: Read>(&self, input: R) -> ConciliationResult<ParseOutcome> {
        read_records(input, self.delimiter, Self::parse_row)
    }
}
