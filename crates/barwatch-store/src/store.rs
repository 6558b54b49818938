//! The shared rolling-window store.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use barwatch_indicators::{WINDOW_LEN, WindowPolicy, compute_indicators};
use barwatch_types::{Bar, IndicatorRow, MinuteOfDay, Symbol, WindowPoint};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::StoreError;
use crate::schema;

/// Result of an insert-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written.
    Inserted,
    /// A row with the same `(ticker, timestamp)` already existed; nothing changed.
    Duplicate,
}

/// Result of recording a bar through the atomic read-compute-write path.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// The bar was stored with the indicators computed for it.
    Inserted(IndicatorRow),
    /// The minute was already stored for this ticker; the existing row is kept.
    Duplicate,
}

/// Shared handle to the `stock_prices` table.
///
/// Cloning the handle shares the same connection. Every operation takes the
/// store-wide lock, and [`RollingWindowStore::record_bar`] holds it across the
/// history queries and the insert so that a row's indicators are computed
/// against a stable view of the rows before it.
#[derive(Debug, Clone)]
pub struct RollingWindowStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl RollingWindowStore {
    /// Opens (or creates) a file-backed store.
    ///
    /// The schema is not touched; call [`Self::init_schema`] to start fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(30))?;
        // Best-effort: some filesystems do not support WAL.
        let _ = conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
        tracing::debug!(path = %path.display(), "Opened store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens a private in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Returns the database file path, or `None` for an in-memory store.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Drops and recreates the `stock_prices` table.
    ///
    /// Destructive: any rows stored under the same table name are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Schema`] if the table cannot be recreated.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(schema::DROP_TABLE, [])
            .map_err(StoreError::Schema)?;
        conn.execute(schema::CREATE_TABLE, [])
            .map_err(StoreError::Schema)?;
        tracing::info!(table = schema::TABLE, "Database setup complete");
        Ok(())
    }

    /// Inserts one row unless its `(ticker, timestamp)` key already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn insert_if_absent(&self, row: &IndicatorRow) -> Result<InsertOutcome, StoreError> {
        let conn = self.lock()?;
        insert_row(&conn, row)
    }

    /// Inserts many rows in one transaction, skipping existing keys.
    ///
    /// Returns the number of rows actually written.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; no rows are written in that case.
    pub fn insert_batch(&self, rows: &[IndicatorRow]) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        for row in rows {
            if insert_row(&tx, row)? == InsertOutcome::Inserted {
                written += 1;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Closes for `ticker` at or before `timestamp`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent_closes(
        &self,
        ticker: &Symbol,
        timestamp: MinuteOfDay,
        limit: usize,
    ) -> Result<Vec<f64>, StoreError> {
        let conn = self.lock()?;
        query_recent_closes(&conn, ticker, timestamp, limit)
    }

    /// High/low points for `ticker` at or before `timestamp`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent_high_low(
        &self,
        ticker: &Symbol,
        timestamp: MinuteOfDay,
        limit: usize,
    ) -> Result<Vec<WindowPoint>, StoreError> {
        let conn = self.lock()?;
        query_recent_high_low(&conn, ticker, timestamp, limit)
    }

    /// Computes and stores the indicator row for a bar as one atomic unit.
    ///
    /// Under the store lock and inside one transaction: checks the key, reads
    /// the ticker's 21 most recent rows at or before the bar's minute,
    /// computes the indicators with `policy`, and inserts the row.
    ///
    /// # Errors
    ///
    /// Returns an error if any query or the insert fails; nothing is written then.
    pub fn record_bar(&self, bar: &Bar, policy: WindowPolicy) -> Result<RecordOutcome, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if select_row(&tx, &bar.ticker, bar.timestamp)?.is_some() {
            return Ok(RecordOutcome::Duplicate);
        }

        let closes = query_recent_closes(&tx, &bar.ticker, bar.timestamp, WINDOW_LEN)?;
        let window = query_recent_high_low(&tx, &bar.ticker, bar.timestamp, WINDOW_LEN)?;
        let indicators = compute_indicators(bar, &closes, &window, policy);
        let row = IndicatorRow::new(bar.clone(), indicators.sma_21, indicators.range_ratio);

        let outcome = insert_row(&tx, &row)?;
        tx.commit()?;

        Ok(match outcome {
            InsertOutcome::Inserted => RecordOutcome::Inserted(row),
            InsertOutcome::Duplicate => RecordOutcome::Duplicate,
        })
    }

    /// Looks up the row stored for one key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(
        &self,
        ticker: &Symbol,
        timestamp: MinuteOfDay,
    ) -> Result<Option<IndicatorRow>, StoreError> {
        let conn = self.lock()?;
        select_row(&conn, ticker, timestamp)
    }

    /// Returns every row ordered by ticker then timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn export_all(&self) -> Result<Vec<IndicatorRow>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(schema::SELECT_ALL)?;
        let rows = stmt
            .query_map([], indicator_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Returns the `limit` most recent rows across all tickers.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent_rows(&self, limit: usize) -> Result<Vec<IndicatorRow>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(schema::SELECT_LATEST)?;
        let rows = stmt
            .query_map(params![sql_limit(limit)], indicator_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Returns the number of stored rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn row_count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM stock_prices", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn insert_row(conn: &Connection, row: &IndicatorRow) -> Result<InsertOutcome, StoreError> {
    let bar = &row.bar;
    let changed = conn.execute(
        schema::INSERT_OR_IGNORE,
        params![
            bar.ticker.as_str(),
            bar.timestamp.as_u16(),
            bar.open,
            bar.close,
            bar.high,
            bar.low,
            bar.volume,
            row.sma_21,
            row.range_ratio,
        ],
    )?;
    Ok(if changed == 0 {
        InsertOutcome::Duplicate
    } else {
        InsertOutcome::Inserted
    })
}

fn query_recent_closes(
    conn: &Connection,
    ticker: &Symbol,
    timestamp: MinuteOfDay,
    limit: usize,
) -> Result<Vec<f64>, StoreError> {
    let mut stmt = conn.prepare_cached(schema::RECENT_CLOSES)?;
    let closes = stmt
        .query_map(
            params![ticker.as_str(), timestamp.as_u16(), sql_limit(limit)],
            |row| row.get(0),
        )?
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(closes)
}

fn query_recent_high_low(
    conn: &Connection,
    ticker: &Symbol,
    timestamp: MinuteOfDay,
    limit: usize,
) -> Result<Vec<WindowPoint>, StoreError> {
    let mut stmt = conn.prepare_cached(schema::RECENT_HIGH_LOW)?;
    let points = stmt
        .query_map(
            params![ticker.as_str(), timestamp.as_u16(), sql_limit(limit)],
            |row| Ok(WindowPoint::new(row.get(0)?, row.get(1)?, minute(row, 2)?)),
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(points)
}

fn select_row(
    conn: &Connection,
    ticker: &Symbol,
    timestamp: MinuteOfDay,
) -> Result<Option<IndicatorRow>, StoreError> {
    let mut stmt = conn.prepare_cached(schema::SELECT_ROW)?;
    let row = stmt
        .query_row(params![ticker.as_str(), timestamp.as_u16()], indicator_row)
        .optional()?;
    Ok(row)
}

fn indicator_row(row: &Row<'_>) -> rusqlite::Result<IndicatorRow> {
    let bar = Bar::new(
        Symbol::new(row.get::<_, String>(0)?),
        minute(row, 1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    );
    Ok(IndicatorRow::new(bar, row.get(7)?, row.get(8)?))
}

fn minute(row: &Row<'_>, idx: usize) -> rusqlite::Result<MinuteOfDay> {
    let raw: i64 = row.get(idx)?;
    u16::try_from(raw)
        .ok()
        .and_then(MinuteOfDay::new)
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Integer,
                format!("invalid minute of day {raw}").into(),
            )
        })
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::thread;

    fn fresh_store() -> RollingWindowStore {
        let store = RollingWindowStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    fn bar(ticker: &str, hhmm: u16, close: f64, high: f64, low: f64) -> Bar {
        Bar::new(
            Symbol::from(ticker),
            MinuteOfDay::new(hhmm).unwrap(),
            close,
            close,
            high,
            low,
            1_000.0,
        )
    }

    fn row(ticker: &str, hhmm: u16, close: f64) -> IndicatorRow {
        IndicatorRow::new(bar(ticker, hhmm, close, close + 1.0, close - 1.0), None, None)
    }

    #[test]
    fn test_insert_if_absent_is_first_write_wins() {
        let store = fresh_store();
        let first = row("AAA", 930, 10.0);
        let second = row("AAA", 930, 99.0);

        assert_eq!(store.insert_if_absent(&first).unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.insert_if_absent(&second).unwrap(), InsertOutcome::Duplicate);
        assert_eq!(store.row_count().unwrap(), 1);

        let stored = store
            .get(&Symbol::from("AAA"), MinuteOfDay::new(930).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(stored, first);
    }

    #[test]
    fn test_init_schema_discards_rows() {
        let store = fresh_store();
        store.insert_if_absent(&row("AAA", 930, 10.0)).unwrap();
        store.init_schema().unwrap();
        assert_eq!(store.row_count().unwrap(), 0);
    }

    #[test]
    fn test_recent_closes_ordering_and_bounds() {
        let store = fresh_store();
        for minute in 0..30u16 {
            store
                .insert_if_absent(&row("AAA", 930 + minute, f64::from(minute)))
                .unwrap();
        }
        store.insert_if_absent(&row("BBB", 940, 500.0)).unwrap();

        let ticker = Symbol::from("AAA");
        let closes = store
            .recent_closes(&ticker, MinuteOfDay::new(940).unwrap(), 21)
            .unwrap();
        let expected: Vec<f64> = (0..=10).rev().map(f64::from).collect();
        assert_eq!(closes, expected);

        let closes = store
            .recent_closes(&ticker, MinuteOfDay::new(959).unwrap(), 21)
            .unwrap();
        assert_eq!(closes.len(), 21);
        assert_relative_eq!(closes[0], 29.0);
        assert_relative_eq!(closes[20], 9.0);
    }

    #[test]
    fn test_recent_high_low_includes_exact_minute() {
        let store = fresh_store();
        store.insert_if_absent(&row("AAA", 930, 10.0)).unwrap();
        store.insert_if_absent(&row("AAA", 931, 20.0)).unwrap();

        let points = store
            .recent_high_low(&Symbol::from("AAA"), MinuteOfDay::new(931).unwrap(), 21)
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp.as_u16(), 931);
        assert_relative_eq!(points[0].high, 21.0);
        assert_relative_eq!(points[1].low, 9.0);
    }

    #[test]
    fn test_record_bar_first_observation() {
        let store = fresh_store();
        let outcome = store
            .record_bar(&bar("AAA", 930, 10.5, 11.0, 10.0), WindowPolicy::Inclusive)
            .unwrap();

        let RecordOutcome::Inserted(row) = outcome else {
            panic!("expected insert");
        };
        assert_eq!(row.sma_21, Some(10.5));
        assert!(row.range_ratio.is_none());
    }

    #[test]
    fn test_record_bar_uses_prior_rows() {
        let store = fresh_store();
        store
            .record_bar(&bar("AAA", 930, 10.0, 12.0, 4.0), WindowPolicy::Inclusive)
            .unwrap();
        let outcome = store
            .record_bar(&bar("AAA", 931, 12.0, 11.0, 6.0), WindowPolicy::Inclusive)
            .unwrap();

        let RecordOutcome::Inserted(row) = outcome else {
            panic!("expected insert");
        };
        assert_eq!(row.sma_21, Some(11.0));
        // (11 - 6) / (12 - 4)
        assert_eq!(row.range_ratio, Some(0.625));
    }

    #[test]
    fn test_record_bar_duplicate_leaves_row_unchanged() {
        let store = fresh_store();
        store
            .record_bar(&bar("AAA", 930, 10.0, 11.0, 9.0), WindowPolicy::Inclusive)
            .unwrap();
        let outcome = store
            .record_bar(&bar("AAA", 930, 50.0, 51.0, 49.0), WindowPolicy::Inclusive)
            .unwrap();

        assert_eq!(outcome, RecordOutcome::Duplicate);
        let stored = store
            .get(&Symbol::from("AAA"), MinuteOfDay::new(930).unwrap())
            .unwrap()
            .unwrap();
        assert_relative_eq!(stored.bar.close, 10.0);
    }

    #[test]
    fn test_insert_batch_counts_new_rows() {
        let store = fresh_store();
        store.insert_if_absent(&row("AAA", 930, 1.0)).unwrap();
        let written = store
            .insert_batch(&[row("AAA", 930, 2.0), row("AAA", 931, 3.0), row("BBB", 930, 4.0)])
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.row_count().unwrap(), 3);
    }

    #[test]
    fn test_export_and_recent_rows_ordering() {
        let store = fresh_store();
        store.insert_if_absent(&row("BBB", 931, 1.0)).unwrap();
        store.insert_if_absent(&row("AAA", 932, 1.0)).unwrap();
        store.insert_if_absent(&row("AAA", 930, 1.0)).unwrap();

        let keys: Vec<(String, u16)> = store
            .export_all()
            .unwrap()
            .iter()
            .map(|r| (r.ticker().to_string(), r.timestamp().as_u16()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("AAA".to_string(), 930),
                ("AAA".to_string(), 932),
                ("BBB".to_string(), 931)
            ]
        );

        let latest = store.recent_rows(2).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].timestamp().as_u16(), 932);
    }

    #[test]
    fn test_concurrent_disjoint_writers() {
        const WORKERS: usize = 16;
        const MINUTES: u16 = 30;

        for _ in 0..5 {
            let store = fresh_store();
            let handles: Vec<_> = (0..WORKERS)
                .map(|w| {
                    let store = store.clone();
                    thread::spawn(move || {
                        let ticker = format!("T{w:02}");
                        for m in 0..MINUTES {
                            let close = 100.0 + f64::from(m);
                            store
                                .record_bar(
                                    &bar(&ticker, 930 + m, close, close + 1.0, close - 1.0),
                                    WindowPolicy::Inclusive,
                                )
                                .unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let rows = store.export_all().unwrap();
            assert_eq!(rows.len(), WORKERS * usize::from(MINUTES));
            // Every ticker's last row saw a full, consistent window of its own history.
            for w in 0..WORKERS {
                let last = store
                    .get(&Symbol::new(format!("T{w:02}")), MinuteOfDay::new(959).unwrap())
                    .unwrap()
                    .unwrap();
                let expected = (109..=129).map(f64::from).sum::<f64>() / 21.0;
                assert_relative_eq!(last.sma_21.unwrap(), (expected * 100.0).round() / 100.0);
            }
        }
    }

    #[test]
    fn test_file_backed_store_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock_prices.db");
        {
            let store = RollingWindowStore::open(&path).unwrap();
            store.init_schema().unwrap();
            store.insert_if_absent(&row("AAA", 930, 1.0)).unwrap();
        }
        let store = RollingWindowStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.row_count().unwrap(), 1);
    }
}
