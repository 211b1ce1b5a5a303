//! [`ExtractionPort`] backed by a chromiumoxide page.

use crate::navigator::ExtractionPort;
#[cfg(feature = "browser")]
use crate::navigator::ITEM_ANCHOR_SELECTOR;

use anyhow::Result;
use async_trait::async_trait;

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use anyhow::Context;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType,
};
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::element::Element;
#[cfg(feature = "browser")]
use chromiumoxide::Page;
#[cfg(feature = "browser")]
use tracing::debug;

#[cfg(feature = "browser")]
use super::{stealth, BrowserEngineConfig};

/// Resolves once the DOM is interactive, with an in-page fallback.
#[cfg(feature = "browser")]
const WAIT_FOR_READY: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// Wheel events are dispatched at this viewport point.
#[cfg(feature = "browser")]
const WHEEL_ORIGIN: (f64, f64) = (400.0, 400.0);

/// One browser tab driven by the navigator.
#[cfg(feature = "browser")]
pub struct ChromePage {
    page: Page,
    timeout: Duration,
    stealth_scripts: Vec<String>,
}

#[cfg(feature = "browser")]
impl ChromePage {
    pub(crate) async fn new(page: Page, config: &BrowserEngineConfig) -> Result<Self> {
        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(stealth::USER_AGENT)
            .accept_language(stealth::accept_language(&config.locale))
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid user agent override: {}", e))?;
        page.execute(user_agent)
            .await
            .context("Failed to set user agent")?;

        Ok(Self {
            page,
            timeout: Duration::from_secs(config.timeout),
            stealth_scripts: stealth::stealth_scripts(&config.locale),
        })
    }

    async fn apply_stealth(&self) {
        for script in &self.stealth_scripts {
            if let Err(e) = self.page.evaluate(script.clone()).await {
                debug!("Stealth script injection skipped: {}", e);
            }
        }
    }

    /// Close the tab.
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!("Page close failed: {}", e);
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl ExtractionPort for ChromePage {
    type Anchor = Element;

    async fn goto(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        tokio::time::timeout(self.timeout, self.page.goto(url))
            .await
            .map_err(|_| anyhow::anyhow!("Timed out after {:?} loading {}", self.timeout, url))?
            .with_context(|| format!("Navigation to {} failed", url))?;

        let ready = self.page.evaluate(WAIT_FOR_READY.to_string());
        match tokio::time::timeout(self.timeout, ready).await {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => debug!("Could not check ready state: {}", e),
            Err(_) => anyhow::bail!("Timed out waiting for {} to become ready", url),
        }

        self.apply_stealth().await;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("No element matches {}", selector))?;
        element.click().await?;
        element.type_str(value).await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("No element matches {}", selector))?
            .click()
            .await?;
        Ok(())
    }

    async fn scroll_by(&mut self, delta_y: i64) -> Result<()> {
        let (x, y) = WHEEL_ORIGIN;
        let wheel = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseWheel)
            .x(x)
            .y(y)
            .delta_x(0.0)
            .delta_y(delta_y as f64)
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid wheel event: {}", e))?;
        self.page.execute(wheel).await.context("Scroll failed")?;
        Ok(())
    }

    async fn find_item_anchors(&mut self) -> Result<Vec<Element>> {
        self.page
            .find_elements(ITEM_ANCHOR_SELECTOR)
            .await
            .context("Failed to query pin anchors")
    }

    async fn read_href(&self, anchor: &Element) -> Result<Option<String>> {
        Ok(anchor.attribute("href").await?)
    }

    async fn read_nested_image_src(&self, anchor: &Element) -> Result<Option<String>> {
        // A missing img is a normal skip, not a read failure
        let Ok(img) = anchor.find_element("img").await else {
            return Ok(None);
        };
        Ok(img.attribute("src").await?)
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct ChromePage;

#[cfg(not(feature = "browser"))]
impl ChromePage {
    pub async fn close(self) {}
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl ExtractionPort for ChromePage {
    type Anchor = ();

    async fn goto(&mut self, _url: &str) -> Result<()> {
        anyhow::bail!("Browser support not compiled")
    }

    async fn fill(&mut self, _selector: &str, _value: &str) -> Result<()> {
        anyhow::bail!("Browser support not compiled")
    }

    async fn click(&mut self, _selector: &str) -> Result<()> {
        anyhow::bail!("Browser support not compiled")
    }

    async fn scroll_by(&mut self, _delta_y: i64) -> Result<()> {
        anyhow::bail!("Browser support not compiled")
    }

    async fn find_item_anchors(&mut self) -> Result<Vec<()>> {
        anyhow::bail!("Browser support not compiled")
    }

    async fn read_href(&self, _anchor: &()) -> Result<Option<String>> {
        Ok(None)
    }

    async fn read_nested_image_src(&self, _anchor: &()) -> Result<Option<String>> {
        Ok(None)
    }
}
