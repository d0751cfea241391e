//! # Conciliation Core
//!
//! Reconciles a bank statement against an internal accounting ledger by
//! pairing records that describe the same financial event, even when ids
//! differ and dates, amounts or descriptions drift slightly.
//!
//! ## Features
//!
//! - **Exact matching**: amount within one cent, date inside the tolerance window, equal documents
//! - **Fuzzy matching**: weighted amount/date/description confidence with edit-distance similarity
//! - **Review queue**: ambiguous candidates are ranked and held for a human decision
//! - **Manual resolution**: confirm, reject or hand-pair transactions after a run
//! - **Ledger readers**: delimited bank statement and system ledger exports
//!
//! ## Quick Start
//!
//! ```rust
//! use conciliation_core::{ReconciliationEngine, Transaction, MatchType};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
//! let bank = vec![Transaction::bank(
//!     "B1".to_string(),
//!     date,
//!     "TED RECEBIDA EMPRESA XYZ".to_string(),
//!     BigDecimal::from(15000),
//! )];
//! let system = vec![Transaction::system(
//!     "S1".to_string(),
//!     date,
//!     "Recebimento Empresa XYZ".to_string(),
//!     BigDecimal::from(15000),
//! )];
//!
//! let report = ReconciliationEngine::default().reconcile(&bank, &system);
//! assert_eq!(report.matches[0].match_type, MatchType::Exact);
//! ```

pub mod ingest;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ingest::{BankStatementReader, ParseOutcome, SystemLedgerReader};
pub use reconciliation::{
    ConciliationConfig, ReconciliationEngine, ReconciliationReport, ReconciliationSummary,
};
pub use traits::*;
pub use types::*;
