//! Append-only record of pins already imported into the catalog.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::debug;

use super::{LedgerError, Result};
use crate::models::SeenRecord;

/// SQLite-backed ledger of imported pins.
///
/// Rows are only ever inserted. There is no update, delete or eviction.
#[derive(Debug, Clone)]
pub struct SeenLedger {
    db_path: PathBuf,
}

impl SeenLedger {
    /// Open the ledger, creating the parent directory and schema if needed.
    ///
    /// Fails if the location is not writable; callers treat that as fatal.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LedgerError::Directory {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let ledger = Self {
            db_path: db_path.to_path_buf(),
        };
        ledger.init_schema()?;
        debug!("Opened seen ledger at {}", db_path.display());
        Ok(ledger)
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS seen_pins (
                pin_id TEXT PRIMARY KEY,
                image_url TEXT,
                keyword TEXT,
                imported_at INTEGER
            );
        "#,
        )?;
        Ok(())
    }

    /// Whether the pin was imported in this or any earlier run.
    pub fn has_seen(&self, item_id: &str) -> Result<bool> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT 1 FROM seen_pins WHERE pin_id = ?")?;
        let row = super::to_option(stmt.query_row(params![item_id], |row| row.get::<_, i64>(0)))?;
        Ok(row.is_some())
    }

    /// Record a confirmed import. Does nothing if the pin is already present.
    pub fn mark_seen(&self, item_id: &str, image_url: &str, keyword: &str) -> Result<()> {
        let conn = self.connect()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO seen_pins (pin_id, image_url, keyword, imported_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![item_id, image_url, keyword, Utc::now().timestamp()],
        )?;
        if inserted == 0 {
            debug!("Pin {} already in ledger", item_id);
        }
        Ok(())
    }

    /// Fetch a single record.
    pub fn get(&self, item_id: &str) -> Result<Option<SeenRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT pin_id, image_url, keyword, imported_at FROM seen_pins WHERE pin_id = ?",
        )?;
        super::to_option(stmt.query_row(params![item_id], Self::row_to_record))
    }

    /// Total number of recorded pins.
    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM seen_pins", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Most recently imported pins, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<SeenRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT pin_id, image_url, keyword, imported_at FROM seen_pins
             ORDER BY imported_at DESC, rowid DESC LIMIT ?",
        )?;
        let records = stmt
            .query_map(params![limit as i64], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SeenRecord> {
        Ok(SeenRecord {
            item_id: row.get(0)?,
            image_url: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            keyword: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            imported_at: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_mark_seen_is_idempotent() {
        let dir = tempdir().unwrap();
        let ledger = SeenLedger::open(&dir.path().join("state.db")).unwrap();

        assert!(!ledger.has_seen("111").unwrap());

        ledger.mark_seen("111", "https://i.pinimg.com/a.jpg", "cats").unwrap();
        assert!(ledger.has_seen("111").unwrap());

        ledger.mark_seen("111", "https://i.pinimg.com/other.jpg", "dogs").unwrap();
        assert!(ledger.has_seen("111").unwrap());
        assert_eq!(ledger.count().unwrap(), 1);

        // First insert wins; the second call must not overwrite it
        let record = ledger.get("111").unwrap().unwrap();
        assert_eq!(record.image_url, "https://i.pinimg.com/a.jpg");
        assert_eq!(record.keyword, "cats");
        assert!(record.imported_at > 0);
    }

    #[test]
    fn test_ledger_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.db");

        {
            let ledger = SeenLedger::open(&path).unwrap();
            ledger.mark_seen("222", "https://i.pinimg.com/b.jpg", "dogs").unwrap();
        }

        let reopened = SeenLedger::open(&path).unwrap();
        assert!(reopened.has_seen("222").unwrap());
        assert!(!reopened.has_seen("333").unwrap());
    }

    #[test]
    fn test_open_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("state.db");

        let ledger = SeenLedger::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(ledger.count().unwrap(), 0);
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let result = SeenLedger::open(&blocker.join("state.db"));
        assert!(matches!(result, Err(LedgerError::Directory { .. })));
    }

    #[test]
    fn test_recent_returns_newest_first() {
        let dir = tempdir().unwrap();
        let ledger = SeenLedger::open(&dir.path().join("state.db")).unwrap();

        ledger.mark_seen("1", "https://i.pinimg.com/1.jpg", "cats").unwrap();
        ledger.mark_seen("2", "https://i.pinimg.com/2.jpg", "cats").unwrap();
        ledger.mark_seen("3", "https://i.pinimg.com/3.jpg", "dogs").unwrap();

        let recent = ledger.recent(2).unwrap();
        let ids: Vec<_> = recent.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }
}
