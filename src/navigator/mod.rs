//! Pinterest page navigation: login, search, scroll and pin extraction.
//!
//! The navigator owns one page for the whole run and moves through
//! `Unauthenticated → Ready`, then per keyword
//! `Ready → Searching → Scrolling → Extracting → Ready`.

mod extract;
mod port;

pub use extract::{
    collapse_candidates, extract_item_id, resolve_href, to_original_size, AnchorOutcome,
    SkipReason,
};
pub use port::{ExtractionPort, ITEM_ANCHOR_SELECTOR};

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{PacingConfig, SiteConfig};
use crate::harvest::CandidateSource;
use crate::models::HarvestedItem;
use crate::pacing::{self, Jitter};

const LOGIN_PATH: &str = "/login/";
const EMAIL_FIELD: &str = "input[name='id']";
const PASSWORD_FIELD: &str = "input[name='password']";
const SUBMIT_BUTTON: &str = "button[type='submit']";

/// Fixed wait after submitting the login form.
const LOGIN_SETTLE: Duration = Duration::from_secs(4);

/// Wheel distance per scroll round, in pixels.
const SCROLL_DISTANCE: RangeInclusive<i64> = 1800..=2600;

/// Where the navigator is in its page protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorState {
    Unauthenticated,
    Ready,
    Searching,
    Scrolling,
    Extracting,
}

/// How the login step ended. Every variant leaves the navigator `Ready`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// No credentials configured; browsing anonymously.
    Skipped,
    /// Credentials were submitted.
    Attempted,
    /// The login sequence failed; browsing anonymously.
    Failed(String),
}

/// Drives one page through the Pinterest search protocol.
pub struct PinNavigator<P> {
    port: P,
    site: SiteConfig,
    base: Url,
    pacing: PacingConfig,
    jitter: Jitter,
    state: NavigatorState,
}

impl<P: ExtractionPort> PinNavigator<P> {
    pub fn new(
        port: P,
        site: SiteConfig,
        pacing: PacingConfig,
        jitter: Jitter,
    ) -> Result<Self, url::ParseError> {
        let base = Url::parse(&site.base_url)?;
        Ok(Self {
            port,
            site,
            base,
            pacing,
            jitter,
            state: NavigatorState::Unauthenticated,
        })
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    /// Give the page back, e.g. to close it.
    pub fn into_port(self) -> P {
        self.port
    }

    fn origin(&self) -> &str {
        self.site.base_url.trim_end_matches('/')
    }

    /// Best-effort login. Never fails the run.
    pub async fn login(&mut self) -> LoginOutcome {
        let Some((email, password)) = self
            .site
            .credentials()
            .map(|(e, p)| (e.to_string(), p.to_string()))
        else {
            warn!("PINTEREST_EMAIL/PASSWORD not set. Trying without login.");
            self.state = NavigatorState::Ready;
            return LoginOutcome::Skipped;
        };

        let outcome = match self.submit_login(&email, &password).await {
            Ok(()) => {
                info!("Pinterest login attempted");
                LoginOutcome::Attempted
            }
            Err(e) => {
                warn!("Login flow not completed: {:#}", e);
                LoginOutcome::Failed(format!("{:#}", e))
            }
        };
        self.state = NavigatorState::Ready;
        outcome
    }

    async fn submit_login(&mut self, email: &str, password: &str) -> anyhow::Result<()> {
        let login_url = format!("{}{}", self.origin(), LOGIN_PATH);
        self.port.goto(&login_url).await?;
        self.jitter.pause().await;

        self.port.fill(EMAIL_FIELD, email).await?;
        self.port.fill(PASSWORD_FIELD, password).await?;
        self.port.click(SUBMIT_BUTTON).await?;
        self.jitter.settle(LOGIN_SETTLE).await;
        Ok(())
    }

    /// Search URL for a keyword. Spaces become `%20`; nothing else is encoded.
    pub fn search_url(&self, keyword: &str) -> String {
        format!(
            "{}/search/pins/?q={}",
            self.origin(),
            keyword.replace(' ', "%20")
        )
    }

    /// Search, scroll and extract up to the per-keyword cap of unique pins.
    ///
    /// Navigation and transport errors propagate.
    pub async fn collect(&mut self, keyword: &str) -> anyhow::Result<Vec<HarvestedItem>> {
        self.state = NavigatorState::Searching;
        let url = self.search_url(keyword);
        debug!("Searching {}", url);
        self.port.goto(&url).await?;
        self.jitter.pause().await;

        self.state = NavigatorState::Scrolling;
        for round in 0..self.pacing.scroll_rounds {
            let delta = pacing::pick(SCROLL_DISTANCE);
            debug!("Scroll round {} by {}px", round + 1, delta);
            self.port.scroll_by(delta).await?;
            self.jitter.pause().await;
        }

        self.state = NavigatorState::Extracting;
        let outcomes = self.extract(keyword).await?;
        let items = collapse_candidates(outcomes, self.pacing.max_items_per_keyword);

        self.state = NavigatorState::Ready;
        Ok(items)
    }

    /// Inspect every pin anchor on the current page.
    pub async fn extract(&mut self, keyword: &str) -> anyhow::Result<Vec<AnchorOutcome>> {
        let anchors = self.port.find_item_anchors().await?;
        let mut outcomes = Vec::with_capacity(anchors.len());
        let mut skipped = 0usize;

        for anchor in &anchors {
            let outcome = self.read_anchor(anchor, keyword).await;
            if let AnchorOutcome::Skip(reason) = &outcome {
                skipped += 1;
                debug!("Skipping anchor: {:?}", reason);
            }
            outcomes.push(outcome);
        }

        debug!(
            "Extracted {} anchors for '{}' ({} skipped)",
            anchors.len(),
            keyword,
            skipped
        );
        Ok(outcomes)
    }

    async fn read_anchor(&self, anchor: &P::Anchor, keyword: &str) -> AnchorOutcome {
        let href = match self.port.read_href(anchor).await {
            Ok(Some(href)) if !href.trim().is_empty() => href,
            Ok(_) => return AnchorOutcome::Skip(SkipReason::MissingHref),
            Err(e) => return AnchorOutcome::Skip(SkipReason::ReadFailed(e.to_string())),
        };

        let Some(source_url) = resolve_href(&self.base, &href) else {
            return AnchorOutcome::Skip(SkipReason::UnresolvableHref(href));
        };

        let Some(item_id) = extract_item_id(&source_url) else {
            return AnchorOutcome::Skip(SkipReason::NoItemId(source_url));
        };

        let image_url = match self.port.read_nested_image_src(anchor).await {
            Ok(Some(src)) if !src.trim().is_empty() => src,
            Ok(_) => return AnchorOutcome::Skip(SkipReason::MissingImage { item_id }),
            Err(e) => return AnchorOutcome::Skip(SkipReason::ReadFailed(e.to_string())),
        };

        let image_url = if self.site.prefer_originals {
            to_original_size(&image_url)
        } else {
            image_url
        };

        AnchorOutcome::Item(HarvestedItem {
            item_id,
            source_url,
            image_url,
            keyword: keyword.to_string(),
        })
    }
}

#[async_trait]
impl<P: ExtractionPort> CandidateSource for PinNavigator<P> {
    async fn candidates(&mut self, keyword: &str) -> anyhow::Result<Vec<HarvestedItem>> {
        self.collect(keyword).await
    }
}
