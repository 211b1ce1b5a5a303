//! The `harvest` command.

use anyhow::Context;
use console::style;

use pinharvest::browser::BrowserSession;
use pinharvest::catalog::CatalogClient;
use pinharvest::config::{CatalogArgs, HarvestConfig, LedgerArgs, PacingArgs, SiteArgs};
use pinharvest::harvest::{HarvestSummary, Harvester};
use pinharvest::navigator::PinNavigator;
use pinharvest::pacing::Jitter;
use pinharvest::repository::SeenLedger;

/// Run one harvest pass over every configured keyword.
pub async fn cmd_harvest(
    site: &SiteArgs,
    pacing: &PacingArgs,
    catalog: &CatalogArgs,
    ledger: &LedgerArgs,
) -> anyhow::Result<()> {
    // Everything that can be checked without a browser is checked first
    let config = HarvestConfig::from_args(site, pacing, catalog, ledger)?;
    let seen = SeenLedger::open(&config.db_path)
        .with_context(|| format!("Failed to open ledger at {}", config.db_path.display()))?;
    let eagle = CatalogClient::new(&config.catalog)?;

    println!(
        "{} Harvesting {} keyword(s) into {}",
        style("→").cyan(),
        config.keywords.len(),
        style(eagle.endpoint()).dim()
    );

    let session = BrowserSession::start(config.browser.clone()).await?;
    let result = run_pass(&session, &config, seen, eagle).await;
    session.close().await;
    let summary = result?;

    print_summary(&summary);
    Ok(())
}

async fn run_pass(
    session: &BrowserSession,
    config: &HarvestConfig,
    seen: SeenLedger,
    eagle: CatalogClient,
) -> anyhow::Result<HarvestSummary> {
    let page = session.new_page().await?;
    let jitter = Jitter::with_tokio(config.pacing.sleep_min, config.pacing.sleep_max);

    let mut navigator = PinNavigator::new(
        page,
        config.site.clone(),
        config.pacing.clone(),
        jitter.clone(),
    )
    .context("Invalid site base URL")?;
    navigator.login().await;

    let harvester = Harvester::new(config.keywords.clone(), seen, eagle, jitter);
    let result = harvester.run(&mut navigator).await;
    navigator.into_port().close().await;
    result
}

fn print_summary(summary: &HarvestSummary) {
    for report in &summary.keywords {
        println!(
            "  {:<24} {} candidates, {} new, {} seen, {} failed",
            report.keyword,
            report.candidates,
            style(report.imported).green(),
            report.already_seen,
            if report.failed > 0 {
                style(report.failed).red()
            } else {
                style(report.failed).dim()
            }
        );
    }
    println!(
        "\n{} Imported new items: {}",
        style("✓").green(),
        style(summary.imported()).bold()
    );
}
