use crate::model::{AnalysisRecord, StorageError};
use rusqlite::{Connection, params};

/// Short-lived cache for assembled analyses plus a per-product score log.
///
/// This sits outside the analysis core: the watch loop consults it before
/// fetching anything, and records are evicted purely by TTL on read.
pub struct SqliteStorage {
    conn: Connection,
    ttl_ms: i64,
}

impl SqliteStorage {
    pub fn new(db_path: &str, ttl_ms: i64) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::bootstrap(conn, ttl_ms)
    }

    /// In-memory variant, used by tests.
    pub fn open_in_memory(ttl_ms: i64) -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn, ttl_ms)
    }

    fn bootstrap(conn: Connection, ttl_ms: i64) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS analysis_cache (
                asin TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                cached_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meter_scores (
                asin TEXT PRIMARY KEY,
                score INTEGER NOT NULL,
                checked_at INTEGER NOT NULL
            );
            ",
        )?;

        Ok(Self { conn, ttl_ms })
    }

    /// Returns the cached analysis for `asin` if one exists and is still
    /// inside the TTL at `now_ms`.
    pub fn get_cached(
        &self,
        asin: &str,
        now_ms: i64,
    ) -> Result<Option<AnalysisRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload, cached_at FROM analysis_cache WHERE asin = ?1")?;
        let mut rows = stmt.query(params![asin])?;

        if let Some(row) = rows.next()? {
            let payload: String = row.get(0)?;
            let cached_at: i64 = row.get(1)?;
            if now_ms - cached_at <= self.ttl_ms {
                return Ok(Some(serde_json::from_str(&payload)?));
            }
        }

        Ok(None)
    }

    /// Stores (inserts or replaces) the analysis for `asin`, stamped at
    /// `now_ms`.
    pub fn put_cached(
        &self,
        asin: &str,
        record: &AnalysisRecord,
        now_ms: i64,
    ) -> Result<(), StorageError> {
        let payload = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO analysis_cache (asin, payload, cached_at)
             VALUES (?1, ?2, ?3)",
            params![asin, payload, now_ms],
        )?;
        Ok(())
    }

    /// Last recorded meter score for `asin`, if any.
    pub fn last_score(&self, asin: &str) -> Result<Option<u8>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT score FROM meter_scores WHERE asin = ?1")?;
        let mut rows = stmt.query(params![asin])?;

        if let Some(row) = rows.next()? {
            let score: i64 = row.get(0)?;
            Ok(Some(score as u8))
        } else {
            Ok(None)
        }
    }

    /// Records the latest meter score for `asin`.
    pub fn update_score(&self, asin: &str, score: u8, now_ms: i64) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meter_scores (asin, score, checked_at)
             VALUES (?1, ?2, ?3)",
            params![asin, score as i64, now_ms],
        )?;
        Ok(())
    }
}
