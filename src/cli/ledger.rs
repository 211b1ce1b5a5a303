//! The `ledger` command.

use anyhow::Context;
use console::style;

use pinharvest::config::LedgerArgs;
use pinharvest::repository::SeenLedger;

/// Print the record count and the most recent imports.
pub fn cmd_ledger(args: &LedgerArgs, recent: usize) -> anyhow::Result<()> {
    let ledger = SeenLedger::open(&args.db_path)
        .with_context(|| format!("Failed to open ledger at {}", args.db_path.display()))?;

    println!(
        "{} {} ({} pins)",
        style("Ledger").bold(),
        ledger.path().display(),
        ledger.count()?
    );

    let records = ledger.recent(recent)?;
    if records.is_empty() {
        println!("{} Nothing imported yet", style("!").yellow());
        return Ok(());
    }

    println!("{}", "-".repeat(60));
    for record in records {
        let when = record
            .imported_at_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:<20} {}",
            style(when).dim(),
            record.item_id,
            record.keyword
        );
    }
    Ok(())
}
