//! SQLite snapshot store.
//!
//! Snapshots land in `ticker_mentions`, one row per ticker per run, with the
//! run time as integer Unix seconds. `store_meta` records the normalization
//! policy of the first batch written; later batches under another policy are
//! refused so that one history never mixes scales.

use crate::{
    NormalizationPolicy, Result, ScoredSnapshot, SentimentError, SentimentLabel,
    traits::SnapshotSink,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS ticker_mentions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker TEXT NOT NULL,
        mention_count INTEGER NOT NULL,
        sentiment_score REAL NOT NULL,
        sentiment_label TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_ticker_mentions_ticker_timestamp
        ON ticker_mentions (ticker, timestamp);
    CREATE TABLE IF NOT EXISTS store_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

const POLICY_KEY: &str = "normalization_policy";

/// One point of a ticker's score history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Run timestamp
    pub timestamp: DateTime<Utc>,
    /// Normalized score of that run
    pub sentiment_score: f64,
}

/// Snapshot sink and reader backed by a SQLite database.
#[derive(Debug)]
pub struct SqliteSnapshotStore {
    conn: Connection,
    policy: NormalizationPolicy,
}

impl SqliteSnapshotStore {
    /// Open (creating if needed) the database at `path`.
    ///
    /// `policy` is the policy of the snapshots this handle will append.
    pub fn open(path: impl AsRef<Path>, policy: NormalizationPolicy) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self::with_connection(conn, policy)?;
        tracing::debug!(path = %path.as_ref().display(), %policy, "opened snapshot store");
        Ok(store)
    }

    /// Private in-memory database.
    pub fn open_in_memory(policy: NormalizationPolicy) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, policy)
    }

    fn with_connection(conn: Connection, policy: NormalizationPolicy) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, policy })
    }

    /// Policy of the snapshots this handle appends.
    pub const fn policy(&self) -> NormalizationPolicy {
        self.policy
    }

    /// Policy recorded by the first batch ever written, if any.
    pub fn stored_policy(&self) -> Result<Option<NormalizationPolicy>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = ?1",
                params![POLICY_KEY],
                |row| row.get(0),
            )
            .optional()?;

        value
            .map(|v| {
                v.parse().map_err(|e: String| {
                    SentimentError::Config(format!("store metadata is corrupt: {}", e))
                })
            })
            .transpose()
    }

    /// Every snapshot of the most recent run, in insertion order.
    ///
    /// Empty when nothing has been written yet.
    pub fn latest(&self) -> Result<Vec<ScoredSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT ticker, mention_count, sentiment_score, sentiment_label, timestamp
             FROM ticker_mentions
             WHERE timestamp = (SELECT MAX(timestamp) FROM ticker_mentions)
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], snapshot_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Score series of `ticker` in ascending time order.
    ///
    /// The ticker is matched case-insensitively by uppercasing it.
    pub fn history(&self, ticker: &str) -> Result<Vec<HistoryPoint>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, sentiment_score
             FROM ticker_mentions
             WHERE ticker = ?1
             ORDER BY timestamp ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![ticker.to_uppercase()], |row| {
            Ok(HistoryPoint {
                timestamp: timestamp_from_row(row, 0)?,
                sentiment_score: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Total stored snapshots.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ticker_mentions", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl SnapshotSink for SqliteSnapshotStore {
    fn append(&mut self, snapshots: &[ScoredSnapshot]) -> Result<()> {
        if snapshots.is_empty() {
            return Ok(());
        }

        match self.stored_policy()? {
            Some(stored) if stored != self.policy => {
                return Err(SentimentError::PolicyConflict {
                    stored: stored.to_string(),
                    requested: self.policy.to_string(),
                });
            }
            _ => {}
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO store_meta (key, value) VALUES (?1, ?2)",
            params![POLICY_KEY, self.policy.as_str()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO ticker_mentions
                 (ticker, mention_count, sentiment_score, sentiment_label, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for snapshot in snapshots {
                stmt.execute(params![
                    snapshot.ticker,
                    snapshot.mention_count as i64,
                    snapshot.sentiment_score,
                    snapshot.sentiment_label.as_str(),
                    snapshot.timestamp.timestamp(),
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(rows = snapshots.len(), "stored snapshots");
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "sqlite"
    }
}

fn timestamp_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(idx)?;
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, secs))
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<ScoredSnapshot> {
    let count: i64 = row.get(1)?;
    let label: String = row.get(3)?;
    Ok(ScoredSnapshot {
        ticker: row.get(0)?,
        mention_count: usize::try_from(count)
            .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(1, count))?,
        sentiment_score: row.get(2)?,
        sentiment_label: label
            .parse::<SentimentLabel>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?,
        timestamp: timestamp_from_row(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ticker: &str, score: f64, secs: i64) -> ScoredSnapshot {
        let policy = NormalizationPolicy::Rescaled;
        ScoredSnapshot {
            ticker: ticker.to_string(),
            mention_count: 3,
            sentiment_score: score,
            sentiment_label: policy.label(score),
            timestamp: DateTime::from_timestamp(secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_store() {
        let store = SqliteSnapshotStore::open_in_memory(NormalizationPolicy::Rescaled).unwrap();
        assert!(store.latest().unwrap().is_empty());
        assert!(store.history("AAPL").unwrap().is_empty());
        assert_eq!(store.stored_policy().unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_latest_returns_most_recent_run() {
        let mut store = SqliteSnapshotStore::open_in_memory(NormalizationPolicy::Rescaled).unwrap();
        store
            .append(&[snapshot("AAPL", 0.2, 1_000), snapshot("TSLA", 0.7, 1_000)])
            .unwrap();
        store
            .append(&[snapshot("TSLA", 0.5, 2_000), snapshot("GME", 0.97, 2_000)])
            .unwrap();

        let latest = store.latest().unwrap();
        let tickers: Vec<&str> = latest.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["TSLA", "GME"]);
        assert_eq!(latest[1].sentiment_label, SentimentLabel::Buy);
        assert_eq!(latest[1].mention_count, 3);
        assert_eq!(latest[0].timestamp.timestamp(), 2_000);
        assert_eq!(store.len().unwrap(), 4);
    }

    #[test]
    fn test_history_ascending_and_case_insensitive() {
        let mut store = SqliteSnapshotStore::open_in_memory(NormalizationPolicy::Rescaled).unwrap();
        store.append(&[snapshot("TSLA", 0.5, 3_000)]).unwrap();
        store.append(&[snapshot("TSLA", 0.2, 1_000)]).unwrap();
        store.append(&[snapshot("AAPL", 0.9, 2_000)]).unwrap();

        let history = store.history("tsla").unwrap();
        let series: Vec<(i64, f64)> = history
            .iter()
            .map(|p| (p.timestamp.timestamp(), p.sentiment_score))
            .collect();
        assert_eq!(series, vec![(1_000, 0.2), (3_000, 0.5)]);
    }

    #[test]
    fn test_policy_pinned_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        let mut store = SqliteSnapshotStore::open(&path, NormalizationPolicy::Rescaled).unwrap();
        store.append(&[snapshot("AAPL", 0.5, 1_000)]).unwrap();
        assert_eq!(store.stored_policy().unwrap(), Some(NormalizationPolicy::Rescaled));
        drop(store);

        let mut direct = SqliteSnapshotStore::open(&path, NormalizationPolicy::Direct).unwrap();
        let err = direct.append(&[snapshot("AAPL", 0.5, 2_000)]).unwrap_err();
        assert!(matches!(
            err,
            SentimentError::PolicyConflict { ref stored, ref requested }
                if stored == "rescaled" && requested == "direct"
        ));

        // reads still work and the refused batch left nothing behind
        assert_eq!(direct.len().unwrap(), 1);
        assert_eq!(direct.latest().unwrap()[0].timestamp.timestamp(), 1_000);
    }

    #[test]
    fn test_same_policy_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        for secs in [1_000, 2_000] {
            let mut store = SqliteSnapshotStore::open(&path, NormalizationPolicy::Direct).unwrap();
            store.append(&[snapshot("BTC", 0.45, secs)]).unwrap();
        }

        let store = SqliteSnapshotStore::open(&path, NormalizationPolicy::Direct).unwrap();
        assert_eq!(store.history("BTC").unwrap().len(), 2);
    }

    #[test]
    fn test_empty_batch_does_not_pin() {
        let mut store = SqliteSnapshotStore::open_in_memory(NormalizationPolicy::Direct).unwrap();
        store.append(&[]).unwrap();
        assert_eq!(store.stored_policy().unwrap(), None);
    }
}
