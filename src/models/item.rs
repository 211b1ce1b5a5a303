//! Candidate items extracted from a search results page.

/// One image post found on the source site for a keyword.
///
/// Lives only for the duration of a single keyword step: the navigator
/// produces it, the harvester consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedItem {
    /// Numeric pin id taken from the canonical URL.
    pub item_id: String,
    /// Absolute link to the pin page.
    pub source_url: String,
    /// Direct image URL. Never empty.
    pub image_url: String,
    /// Search term that produced this item.
    pub keyword: String,
}

impl HarvestedItem {
    /// Display name sent to the catalog, e.g. `pinterest_cats_12345`.
    pub fn display_name(&self) -> String {
        format!("pinterest_{}_{}", self.keyword, self.item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_encodes_keyword_and_id() {
        let item = HarvestedItem {
            item_id: "98765".to_string(),
            source_url: "https://www.pinterest.com/pin/98765/".to_string(),
            image_url: "https://i.pinimg.com/236x/aa/bb.jpg".to_string(),
            keyword: "desk setup".to_string(),
        };
        assert_eq!(item.display_name(), "pinterest_desk setup_98765");
    }
}
