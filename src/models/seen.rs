//! Ledger rows for items that were imported at least once.

use chrono::{DateTime, Utc};

/// A pin that the catalog confirmed as imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRecord {
    pub item_id: String,
    pub image_url: String,
    pub keyword: String,
    /// Unix seconds of the first successful import.
    pub imported_at: i64,
}

impl SeenRecord {
    /// Import time as a UTC datetime, if the stored value is in range.
    pub fn imported_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.imported_at, 0)
    }
}
