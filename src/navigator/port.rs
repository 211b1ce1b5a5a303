//! The narrow page surface the navigator drives.

use async_trait::async_trait;

/// CSS selector for anchors linking to pin detail pages.
pub const ITEM_ANCHOR_SELECTOR: &str = "a[href*='/pin/']";

/// Page operations needed to log in, search, scroll and read pin anchors.
///
/// The browser implementation lives in [`crate::browser::ChromePage`]; tests
/// use in-memory fakes. Navigation and transport errors are returned as-is
/// and are fatal to the run. Anchor reads may fail per anchor; the
/// navigator turns those into skips.
#[async_trait]
pub trait ExtractionPort: Send + Sync {
    /// Handle to one anchor element on the current page.
    type Anchor: Send + Sync;

    /// Navigate and wait for the initial DOM to settle.
    async fn goto(&mut self, url: &str) -> anyhow::Result<()>;

    /// Type `value` into the element matching `selector`.
    async fn fill(&mut self, selector: &str, value: &str) -> anyhow::Result<()>;

    /// Click the element matching `selector`.
    async fn click(&mut self, selector: &str) -> anyhow::Result<()>;

    /// Wheel-scroll vertically by `delta_y` pixels.
    async fn scroll_by(&mut self, delta_y: i64) -> anyhow::Result<()>;

    /// All anchors matching [`ITEM_ANCHOR_SELECTOR`], in document order.
    async fn find_item_anchors(&mut self) -> anyhow::Result<Vec<Self::Anchor>>;

    /// Raw `href` attribute of the anchor.
    async fn read_href(&self, anchor: &Self::Anchor) -> anyhow::Result<Option<String>>;

    /// `src` of the first `img` nested inside the anchor.
    async fn read_nested_image_src(&self, anchor: &Self::Anchor)
        -> anyhow::Result<Option<String>>;
}
