//! Bank statement export: `date,description,amount,document`

use std::io::Read;

use csv::StringRecord;

use crate::ingest::*;
use crate::traits::TransactionReader;
use crate::types::*;

/// Reader for bank statement exports
///
/// Statements carry no ids of their own, so each row is named `BANK_<n>`
/// after its position below the header.
#[derive(Debug, Clone)]
pub struct BankStatementReader {
    delimiter: u8,
}

impl Default for BankStatementReader {
    fn default() -> Self {
        Self::new()
    }
}

impl BankStatementReader {
    /// Create a comma-delimited reader
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Create a reader for a different delimiter
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    fn parse_row(line: u64, record: &StringRecord) -> ConciliationResult<Transaction> {
        let date = parse_date(&required_field(record, 0, "date", line)?, line)?;
        let description = optional_field(record, 1).unwrap_or_default();
        let amount = parse_amount(&required_field(record, 2, "amount", line)?, line)?;

        let mut transaction = Transaction::bank(
            format!("BANK_{}", line.saturating_sub(1)),
            date,
            description,
            amount,
        );
        transaction.document = optional_field(record, 3);
        Ok(transaction)
    }
}

impl TransactionReader for BankStatementReader {
    fn source(&self) -> TransactionSource {
        TransactionSource::Bank
    }

    fn read<R: Read>(&self, input: R) -> ConciliationResult<ParseOutcome> {
        read_records(input, self.delimiter, Self::parse_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    const STATEMENT: &str = "Data,Descrição,Valor,Documento
2024-12-28,\"TED RECEBIDA EMPRESA XYZ LTDA\",15000.00,\"DOC000001\"
2024-12-29,\"PIX ENVIADO JOAO SILVA\",-2500.50,\"\"

2024-12-30,\"SAQUE CAIXA ELETRONICO\",-300.00
";

    #[test]
    fn test_reads_statement() {
        let outcome = BankStatementReader::new().read_str(STATEMENT).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.transactions.len(), 3);

        let first = &outcome.transactions[0];
        assert_eq!(first.id, "BANK_1");
        assert_eq!(first.source, TransactionSource::Bank);
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 12, 28).unwrap());
        assert_eq!(first.description, "TED RECEBIDA EMPRESA XYZ LTDA");
        assert_eq!(first.document.as_deref(), Some("DOC000001"));

        assert_eq!(outcome.transactions[1].document, None);
        assert_eq!(outcome.transactions[2].document, None);
        assert_eq!(outcome.transactions[2].amount, "-300".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn test_ids_follow_line_positions() {
        let outcome = BankStatementReader::new().read_str(STATEMENT).unwrap();
        let ids: Vec<&str> = outcome.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["BANK_1", "BANK_2", "BANK_4"]);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let input = "Data,Descrição,Valor,Documento
2024-12-28,TED,abc,
not-a-date,PIX,10.00,
2024-12-30,SAQUE,-300.00,
";
        let outcome = BankStatementReader::new().read_str(input).unwrap();
        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(outcome.transactions[0].id, "BANK_3");
        assert_eq!(outcome.errors.len(), 2);
        assert!(matches!(
            &outcome.errors[0],
            ConciliationError::Parse { line: 2, field, .. } if field == "amount"
        ));
        assert!(matches!(
            &outcome.errors[1],
            ConciliationError::Parse { line: 3, field, .. } if field == "date"
        ));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let input = "Data;Descrição;Valor;Documento\n28/12/2024;TARIFA;-12.90;\n";
        let outcome = BankStatementReader::with_delimiter(b';')
            .read_str(input)
            .unwrap();
        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(outcome.transactions[0].amount, "-12.90".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn test_header_only() {
        let outcome = BankStatementReader::new()
            .read_str("Data,Descrição,Valor,Documento\n")
            .unwrap();
        assert!(outcome.transactions.is_empty());
        assert!(outcome.is_clean());
    }
}
