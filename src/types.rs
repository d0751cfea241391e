//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Which ledger a transaction was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    /// Bank statement line
    Bank,
    /// Internal accounting system entry
    System,
}

impl TransactionSource {
    /// The source a transaction must come from to be a match candidate
    pub fn counterpart(&self) -> TransactionSource {
        match self {
            TransactionSource::Bank => TransactionSource::System,
            TransactionSource::System => TransactionSource::Bank,
        }
    }
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionSource::Bank => write!(f, "bank"),
            TransactionSource::System => write!(f, "system"),
        }
    }
}

/// A single ledger line, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier, unique within its source
    pub id: String,
    /// Booking date
    pub date: NaiveDate,
    /// Free-text description
    pub description: String,
    /// Signed amount
    pub amount: BigDecimal,
    /// Optional document reference (check number, transfer id, etc.)
    pub document: Option<String>,
    /// Ledger the transaction came from
    pub source: TransactionSource,
    /// Optional category assigned by the internal system
    pub category: Option<String>,
    /// Additional metadata
    pub metadata: HashMap<String, String>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        id: String,
        date: NaiveDate,
        description: String,
        amount: BigDecimal,
        source: TransactionSource,
    ) -> Self {
        Self {
            id,
            date,
            description,
            amount,
            document: None,
            source,
            category: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a bank statement transaction
    pub fn bank(id: String, date: NaiveDate, description: String, amount: BigDecimal) -> Self {
        Self::new(id, date, description, amount, TransactionSource::Bank)
    }

    /// Create an internal system transaction
    pub fn system(id: String, date: NaiveDate, description: String, amount: BigDecimal) -> Self {
        Self::new(id, date, description, amount, TransactionSource::System)
    }

    /// Set the document reference
    pub fn with_document(mut self, document: String) -> Self {
        self.document = Some(document);
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Document reference, treating blank strings as absent
    ///
    /// Non-blank values are returned as stored and compared verbatim.
    pub fn document_ref(&self) -> Option<&str> {
        self.document
            .as_deref()
            .filter(|doc| !doc.trim().is_empty())
    }

    /// Absolute difference in whole days between two transactions
    pub fn days_between(&self, other: &Transaction) -> i64 {
        (self.date - other.date).num_days().abs()
    }

    /// Absolute amount difference between two transactions
    pub fn amount_difference(&self, other: &Transaction) -> BigDecimal {
        (&self.amount - &other.amount).abs()
    }
}

/// How a match was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Strict amount/date/document rule
    Exact,
    /// Weighted confidence above the auto-accept threshold
    Fuzzy,
    /// Confirmed by a reviewer
    Manual,
}

/// A rule that independently held for a matched pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCriterion {
    Amount,
    Date,
    Document,
    Description,
}

impl MatchCriterion {
    /// Canonical reporting order
    pub const ALL: [MatchCriterion; 4] = [
        MatchCriterion::Amount,
        MatchCriterion::Date,
        MatchCriterion::Document,
        MatchCriterion::Description,
    ];
}

impl fmt::Display for MatchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchCriterion::Amount => "amount",
            MatchCriterion::Date => "date",
            MatchCriterion::Document => "document",
            MatchCriterion::Description => "description",
        };
        write!(f, "{name}")
    }
}

impl FromStr for MatchCriterion {
    type Err = ConciliationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amount" => Ok(MatchCriterion::Amount),
            "date" => Ok(MatchCriterion::Date),
            "document" => Ok(MatchCriterion::Document),
            "description" => Ok(MatchCriterion::Description),
            other => Err(ConciliationError::Config(format!(
                "Unknown match criterion: {other}"
            ))),
        }
    }
}

/// A bank transaction paired with exactly one system transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub bank_transaction: Transaction,
    pub system_transaction: Transaction,
    /// Confidence in [0, 1]; always 1.0 for exact matches
    pub confidence: f64,
    pub match_type: MatchType,
    /// Criteria that held for this pair, in priority order
    pub criteria: Vec<MatchCriterion>,
}

/// A scored system transaction proposed for a bank transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub transaction: Transaction,
    pub confidence: f64,
}

/// A bank transaction whose best candidate needs human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossibleMatch {
    pub bank_transaction: Transaction,
    /// Every surviving candidate, best first
    pub candidates: Vec<MatchCandidate>,
}

impl PossibleMatch {
    /// Highest-ranked candidate
    pub fn best(&self) -> Option<&MatchCandidate> {
        self.candidates.first()
    }
}

/// Errors that can occur while loading ledgers or reconciling them
#[derive(Debug, thiserror::Error)]
pub enum ConciliationError {
    #[error("Parse error at line {line}, field '{field}': {message}")]
    Parse {
        line: u64,
        field: String,
        message: String,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Transaction already matched: {0}")]
    AlreadyMatched(String),
    #[error("Deadline exceeded after {processed} of {total} bank transactions")]
    DeadlineExceeded { processed: usize, total: usize },
}

/// Result type for reconciliation operations
pub type ConciliationResult<T> = Result<T, ConciliationError>;
