//! Bulk import of a pasted URL list.
//!
//! Each entry is either a pin page, resolved to its `og:image`, or a direct
//! image URL imported as-is.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use super::Importer;
use crate::navigator::{extract_item_id, to_original_size};
use crate::pacing::Jitter;
use crate::repository::SeenLedger;

/// Ledger keyword for items that came from a URL list.
pub const URL_IMPORT_KEYWORD: &str = "url-import";

/// Tag attached to every URL-list import.
pub const URL_IMPORT_TAG: &str = "pinterest";

static PIN_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pinterest\.[^/]+/pin/").expect("valid regex"));

static OG_IMAGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:image"]"#).expect("valid selector")
});

/// True if `url` points at a pin page rather than an image.
pub fn is_pin_url(url: &str) -> bool {
    PIN_PAGE.is_match(url)
}

/// Read the `og:image` content from a page.
pub fn parse_og_image(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&OG_IMAGE)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

/// Resolves a pin page to its image URL.
#[async_trait]
pub trait PinResolver: Send + Sync {
    async fn resolve(&self, page_url: &str) -> anyhow::Result<Option<String>>;
}

/// Fetches pin pages over plain HTTP.
pub struct PinPageResolver {
    client: Client,
}

impl PinPageResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PinResolver for PinPageResolver {
    async fn resolve(&self, page_url: &str) -> anyhow::Result<Option<String>> {
        let response = self.client.get(page_url).send().await?.error_for_status()?;
        let html = response.text().await?;
        Ok(parse_og_image(&html))
    }
}

/// Counts for one URL-list import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlImportReport {
    pub imported: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Imports a list of pin or image URLs one at a time.
pub struct UrlListImporter<I, R> {
    importer: I,
    resolver: R,
    ledger: SeenLedger,
    jitter: Jitter,
}

impl<I: Importer, R: PinResolver> UrlListImporter<I, R> {
    pub fn new(importer: I, resolver: R, ledger: SeenLedger, jitter: Jitter) -> Self {
        Self {
            importer,
            resolver,
            ledger,
            jitter,
        }
    }

    pub fn ledger(&self) -> &SeenLedger {
        &self.ledger
    }

    /// Import every non-blank entry. Only ledger errors abort the run.
    pub async fn run<S: AsRef<str>>(&self, urls: &[S]) -> anyhow::Result<UrlImportReport> {
        let mut report = UrlImportReport::default();
        let urls: Vec<&str> = urls
            .iter()
            .map(|u| u.as_ref().trim())
            .filter(|u| !u.is_empty())
            .collect();

        info!("Importing {} URLs", urls.len());

        for url in urls {
            let item_id = is_pin_url(url).then(|| extract_item_id(url)).flatten();
            if let Some(id) = &item_id {
                if self.ledger.has_seen(id)? {
                    debug!("Already imported {}", id);
                    report.skipped += 1;
                    continue;
                }
            }

            let Some(image_url) = self.image_url_for(url).await else {
                report.failed += 1;
                self.jitter.pause().await;
                continue;
            };

            let name = match &item_id {
                Some(id) => format!("pinterest_{}", id),
                None => format!("pinterest_{}", chrono::Utc::now().timestamp_millis()),
            };
            let tags = [URL_IMPORT_TAG.to_string()];
            let ok = self.importer.import_item(&image_url, &name, url, &tags).await;

            if ok {
                if let Some(id) = &item_id {
                    self.ledger.mark_seen(id, &image_url, URL_IMPORT_KEYWORD)?;
                }
                report.imported += 1;
                info!("Imported {}", url);
            } else {
                report.failed += 1;
            }

            self.jitter.pause().await;
        }

        Ok(report)
    }

    async fn image_url_for(&self, url: &str) -> Option<String> {
        if !is_pin_url(url) {
            return Some(url.to_string());
        }
        match self.resolver.resolve(url).await {
            Ok(Some(image)) => Some(to_original_size(&image)),
            Ok(None) => {
                warn!("No og:image on {}", url);
                None
            }
            Err(e) => {
                warn!("Failed to fetch {}: {:#}", url, e);
                None
            }
        }
    }
}
