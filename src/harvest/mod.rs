//! The harvest pass: candidates in, ledger-filtered imports out.

mod url_list;

pub use url_list::{
    is_pin_url, parse_og_image, PinPageResolver, PinResolver, UrlImportReport, UrlListImporter,
};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::models::HarvestedItem;
use crate::pacing::Jitter;
use crate::repository::SeenLedger;

/// Produces the candidate items for one keyword.
#[async_trait]
pub trait CandidateSource: Send {
    async fn candidates(&mut self, keyword: &str) -> anyhow::Result<Vec<HarvestedItem>>;
}

/// Imports one image into the catalog; `true` only on confirmed success.
#[async_trait]
pub trait Importer: Send + Sync {
    async fn import_item(
        &self,
        image_url: &str,
        display_name: &str,
        source_website: &str,
        extra_tags: &[String],
    ) -> bool;
}

/// Counts for one keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordReport {
    pub keyword: String,
    pub candidates: usize,
    pub already_seen: usize,
    pub imported: usize,
    pub failed: usize,
}

/// Counts for a whole pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub keywords: Vec<KeywordReport>,
}

impl HarvestSummary {
    /// Items newly confirmed imported during this pass.
    pub fn imported(&self) -> usize {
        self.keywords.iter().map(|k| k.imported).sum()
    }

    pub fn failed(&self) -> usize {
        self.keywords.iter().map(|k| k.failed).sum()
    }

    pub fn already_seen(&self) -> usize {
        self.keywords.iter().map(|k| k.already_seen).sum()
    }
}

/// Runs keywords in order, one item at a time.
pub struct Harvester<I> {
    keywords: Vec<String>,
    ledger: SeenLedger,
    importer: I,
    jitter: Jitter,
}

impl<I: Importer> Harvester<I> {
    pub fn new(keywords: Vec<String>, ledger: SeenLedger, importer: I, jitter: Jitter) -> Self {
        Self {
            keywords,
            ledger,
            importer,
            jitter,
        }
    }

    pub fn ledger(&self) -> &SeenLedger {
        &self.ledger
    }

    /// Harvest every configured keyword.
    ///
    /// Import failures are counted and skipped. Errors from the candidate
    /// source (navigation, browser transport) and from the ledger abort the
    /// pass.
    pub async fn run<S>(&self, source: &mut S) -> anyhow::Result<HarvestSummary>
    where
        S: CandidateSource + ?Sized,
    {
        let mut summary = HarvestSummary::default();

        for keyword in &self.keywords {
            info!("Collect keyword: {}", keyword);
            let items = source.candidates(keyword).await?;
            info!("Candidate pins: {}", items.len());

            let report = self.import_candidates(keyword, items).await?;
            info!(
                "Keyword '{}': {} imported, {} failed, {} already seen",
                keyword, report.imported, report.failed, report.already_seen
            );
            summary.keywords.push(report);
        }

        Ok(summary)
    }

    async fn import_candidates(
        &self,
        keyword: &str,
        items: Vec<HarvestedItem>,
    ) -> anyhow::Result<KeywordReport> {
        let mut report = KeywordReport {
            keyword: keyword.to_string(),
            candidates: items.len(),
            ..Default::default()
        };

        for item in items {
            if self.ledger.has_seen(&item.item_id)? {
                debug!("Already imported {}", item.item_id);
                report.already_seen += 1;
                continue;
            }

            let ok = self
                .importer
                .import_item(
                    &item.image_url,
                    &item.display_name(),
                    &item.source_url,
                    &[keyword.to_string()],
                )
                .await;

            if ok {
                self.ledger.mark_seen(&item.item_id, &item.image_url, keyword)?;
                report.imported += 1;
                info!("Imported {}", item.item_id);
            } else {
                report.failed += 1;
                warn!("Import failed for {}", item.item_id);
            }

            self.jitter.pause().await;
        }

        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Candidate source backed by a fixed map of keyword → items.
    #[derive(Default)]
    pub struct FixedCandidates {
        pub pages: HashMap<String, Vec<HarvestedItem>>,
        pub requested: Vec<String>,
    }

    #[async_trait]
    impl CandidateSource for FixedCandidates {
        async fn candidates(&mut self, keyword: &str) -> anyhow::Result<Vec<HarvestedItem>> {
            self.requested.push(keyword.to_string());
            Ok(self.pages.get(keyword).cloned().unwrap_or_default())
        }
    }

    /// One recorded import call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ImportCall {
        pub image_url: String,
        pub display_name: String,
        pub source_website: String,
        pub extra_tags: Vec<String>,
    }

    /// Importer that records calls and fails for selected image URLs.
    #[derive(Default)]
    pub struct RecordingImporter {
        pub calls: Mutex<Vec<ImportCall>>,
        pub failing: HashSet<String>,
    }

    #[async_trait]
    impl Importer for RecordingImporter {
        async fn import_item(
            &self,
            image_url: &str,
            display_name: &str,
            source_website: &str,
            extra_tags: &[String],
        ) -> bool {
            self.calls.lock().unwrap().push(ImportCall {
                image_url: image_url.to_string(),
                display_name: display_name.to_string(),
                source_website: source_website.to_string(),
                extra_tags: extra_tags.to_vec(),
            });
            !self.failing.contains(image_url)
        }
    }

    pub fn item(id: &str, keyword: &str) -> HarvestedItem {
        HarvestedItem {
            item_id: id.to_string(),
            source_url: format!("https://www.pinterest.com/pin/{id}/"),
            image_url: format!("https://i.pinimg.com/236x/{id}.jpg"),
            keyword: keyword.to_string(),
        }
    }
}
