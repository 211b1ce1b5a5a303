//! Turning raw anchor data into candidate items.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::models::HarvestedItem;

static PIN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/pin/(\d+)").expect("pin id regex should compile"));

static SIZED_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+x/").expect("size segment regex should compile"));

/// Why an anchor did not produce a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No `href` attribute, or an empty one.
    MissingHref,
    /// `href` could not be resolved against the site origin.
    UnresolvableHref(String),
    /// The resolved URL has no `/pin/<digits>` segment.
    NoItemId(String),
    /// The anchor has no nested image, or the image has no `src`.
    MissingImage { item_id: String },
    /// Reading an attribute from the element failed.
    ReadFailed(String),
}

/// Result of inspecting one anchor on the results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorOutcome {
    Item(HarvestedItem),
    Skip(SkipReason),
}

/// Numeric pin id from a URL path, e.g. `.../pin/12345/` → `12345`.
pub fn extract_item_id(url: &str) -> Option<String> {
    PIN_ID.captures(url).map(|c| c[1].to_string())
}

/// Resolve a possibly-relative `href` against the site origin.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}

/// Rewrite a sized thumbnail URL (`/236x/`) to the original asset (`/originals/`).
pub fn to_original_size(image_url: &str) -> String {
    SIZED_SEGMENT
        .replacen(image_url, 1, "/originals/")
        .into_owned()
}

/// Collapse anchor outcomes into the candidate list for one keyword.
///
/// Duplicated ids keep the position of their first appearance and the
/// attributes of their last one. The result is truncated to `cap`.
pub fn collapse_candidates(outcomes: Vec<AnchorOutcome>, cap: usize) -> Vec<HarvestedItem> {
    let mut items: Vec<HarvestedItem> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for outcome in outcomes {
        let AnchorOutcome::Item(item) = outcome else {
            continue;
        };
        match positions.get(&item.item_id) {
            Some(&idx) => items[idx] = item,
            None => {
                positions.insert(item.item_id.clone(), items.len());
                items.push(item);
            }
        }
    }

    items.truncate(cap);
    items
}
