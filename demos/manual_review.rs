//! Resolving the review queue after an automatic run

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use conciliation_core::{ReconciliationEngine, Transaction};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    println!("🧾 Conciliation Core - Manual Review Example\n");

    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 12, d).ok_or("invalid date");
    let amount = |v: &str| v.parse::<BigDecimal>();

    let bank = vec![
        Transaction::bank(
            "B1".to_string(),
            day(5)?,
            "SAQUE CAIXA ELETRONICO".to_string(),
            amount("-300.00")?,
        ),
        Transaction::bank(
            "B2".to_string(),
            day(6)?,
            "SAQUE CAIXA ELETRONICO".to_string(),
            amount("-300.00")?,
        ),
        Transaction::bank(
            "B3".to_string(),
            day(15)?,
            "ESTORNO COMPRA".to_string(),
            amount("42.00")?,
        ),
    ];
    let system = vec![
        Transaction::system(
            "S1".to_string(),
            day(5)?,
            "SAQUE PARA CAIXA".to_string(),
            amount("-300.10")?,
        ),
        Transaction::system(
            "S2".to_string(),
            day(6)?,
            "SAQUE PARA CAIXA".to_string(),
            amount("-300.10")?,
        ),
        Transaction::system(
            "S3".to_string(),
            day(1)?,
            "AJUSTE MANUAL".to_string(),
            amount("40.00")?,
        )
        .with_category("AJUSTE".to_string()),
    ];

    let engine = ReconciliationEngine::default();
    let mut report = engine.reconcile(&bank, &system);
    println!(
        "🔍 {} possible matches, {} unmatched bank transactions\n",
        report.possible_matches.len(),
        report.unmatched_bank.len()
    );

    // Reviewer accepts the suggested candidate for B1
    let confirmed = engine.confirm_possible_match(&mut report, "B1", "S1")?;
    println!(
        "  ✓ Confirmed {} ↔ {} (confidence {:.2})",
        confirmed.bank_transaction.id, confirmed.system_transaction.id, confirmed.confidence
    );

    // Reviewer rejects the suggestion for B2
    engine.reject_possible_match(&mut report, "B2")?;
    println!("  ✗ Rejected suggestion for B2");

    // Reviewer pairs the refund with a manual adjustment
    let manual = engine.manual_match(&mut report, "B3", "S3")?;
    println!(
        "  ✓ Manually matched {} ↔ {} (confidence {:.2})",
        manual.bank_transaction.id, manual.system_transaction.id, manual.confidence
    );

    let summary = report.summary();
    println!(
        "\n📊 {} matched, {} unmatched bank, {} unmatched system",
        summary.matched(),
        summary.unmatched_bank,
        summary.unmatched_system
    );

    Ok(())
}
