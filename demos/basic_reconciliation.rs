//! Basic reconciliation example

use conciliation_core::{
    BankStatementReader, ConciliationConfig, ReconciliationEngine, SystemLedgerReader,
    TransactionReader,
};
use tracing_subscriber::fmt::time::ChronoLocal;

const BANK_STATEMENT: &str = "Data,Descrição,Valor,Documento
2024-12-02,\"TED RECEBIDA EMPRESA XYZ LTDA\",15000.00,\"DOC000001\"
2024-12-03,\"PAGAMENTO FORNECEDOR DEF\",-2500.50,\"\"
2024-12-05,\"SAQUE CAIXA ELETRONICO\",-300.00,\"\"
2024-12-09,\"DEBITO AUTOMATICO ENERGIA\",-412.37,\"\"
2024-12-11,\"PIX ENVIADO JOAO SILVA\",\"1.234,56\",\"\"
";

const SYSTEM_LEDGER: &str = "ID,Data,Descrição,Valor,Categoria
\"SYS000001\",2024-12-03,\"RECEITA VENDA PRODUTO\",15000.00,\"RECEITA\"
\"SYS000002\",2024-12-03,\"PAGAMENTO FORNECEDOR DEF\",-2500.00,\"DESPESA\"
\"SYS000003\",2024-12-05,\"SAQUE PARA CAIXA\",-300.10,\"TRANSFERENCIA\"
\"SYS000004\",2024-12-20,\"COMPRA MATERIAL ESCRITORIO\",-880.00,\"DESPESA\"
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    println!("🏦 Conciliation Core - Basic Reconciliation Example\n");

    // 1. Load both ledgers
    println!("📥 Loading ledgers...");
    let bank = BankStatementReader::new().read_str(BANK_STATEMENT)?;
    let system = SystemLedgerReader::new().read_str(SYSTEM_LEDGER)?;
    println!(
        "  ✓ Bank statement: {} transactions ({} rows skipped)",
        bank.transactions.len(),
        bank.errors.len()
    );
    for error in &bank.errors {
        println!("    ⚠ {error}");
    }
    println!("  ✓ System ledger: {} transactions\n", system.transactions.len());

    // 2. Reconcile with configuration taken from the environment
    let config = ConciliationConfig::from_env()?;
    println!(
        "⚙️  Date tolerance: {} days, amount tolerance: {}%, similarity threshold: {}\n",
        config.date_tolerance_days,
        config.amount_tolerance_percent,
        config.description_similarity_threshold
    );
    let engine = ReconciliationEngine::new(config)?;
    let report = engine.reconcile(&bank.transactions, &system.transactions);

    // 3. Show the outcome
    println!("✅ Matches:");
    for result in &report.matches {
        let criteria: Vec<String> = result.criteria.iter().map(|c| c.to_string()).collect();
        println!(
            "  {} ↔ {} ({:?}, confidence {:.2}, criteria: {})",
            result.bank_transaction.id,
            result.system_transaction.id,
            result.match_type,
            result.confidence,
            criteria.join(", ")
        );
    }

    println!("\n🔍 Possible matches for review:");
    for possible in &report.possible_matches {
        println!(
            "  {} - {}",
            possible.bank_transaction.id, possible.bank_transaction.description
        );
        for candidate in &possible.candidates {
            println!(
                "    → {} {} (confidence {:.2})",
                candidate.transaction.id, candidate.transaction.description, candidate.confidence
            );
        }
    }

    println!("\n❌ Unmatched bank transactions:");
    for tx in &report.unmatched_bank {
        println!("  {} {} {}", tx.id, tx.date, tx.amount);
    }

    println!("\n❌ Unmatched system transactions:");
    for tx in &report.unmatched_system {
        println!("  {} {} {}", tx.id, tx.date, tx.amount);
    }

    let summary = report.summary();
    println!("\n📊 Summary:");
    println!("  Bank transactions: {}", summary.total_bank);
    println!(
        "  Matched: {} (exact {}, fuzzy {})",
        summary.matched(),
        summary.exact_matches,
        summary.fuzzy_matches
    );
    println!("  Match rate: {:.1}%", summary.match_rate);
    println!("  Matched amount: {}", summary.matched_amount);

    Ok(())
}
