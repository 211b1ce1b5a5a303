//! The `import-urls` command.

use std::path::Path;

use anyhow::Context;
use console::style;

use pinharvest::catalog::CatalogClient;
use pinharvest::config::{CatalogArgs, ImportConfig, LedgerArgs, PacingArgs};
use pinharvest::harvest::{PinPageResolver, UrlListImporter};
use pinharvest::pacing::Jitter;
use pinharvest::repository::SeenLedger;

/// Import pin page or image URLs given on the command line and/or in a file.
pub async fn cmd_import_urls(
    mut urls: Vec<String>,
    file: Option<&Path>,
    pacing: &PacingArgs,
    catalog: &CatalogArgs,
    ledger: &LedgerArgs,
) -> anyhow::Result<()> {
    let config = ImportConfig::from_args(catalog, pacing, ledger)?;

    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        urls.extend(content.lines().map(str::to_string));
    }
    if urls.iter().all(|u| u.trim().is_empty()) {
        println!("{} No URLs to import", style("!").yellow());
        return Ok(());
    }

    let seen = SeenLedger::open(&config.db_path)
        .with_context(|| format!("Failed to open ledger at {}", config.db_path.display()))?;
    let eagle = CatalogClient::new(&config.catalog)?;
    let http = reqwest::Client::builder()
        .timeout(config.catalog.timeout)
        .user_agent(pinharvest::browser::stealth::USER_AGENT)
        .build()?;
    let jitter = Jitter::with_tokio(config.pacing.sleep_min, config.pacing.sleep_max);

    let importer = UrlListImporter::new(eagle, PinPageResolver::new(http), seen, jitter);
    let report = importer.run(&urls).await?;

    println!(
        "\n{} ok={} {} skipped={}",
        style("✓").green(),
        style(report.imported).green(),
        if report.failed > 0 {
            style(format!("failed={}", report.failed)).red()
        } else {
            style(format!("failed={}", report.failed)).dim()
        },
        report.skipped
    );
    Ok(())
}
