// SQLite persistence layer for sentence records.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

/// A storage-layer failure, naming the operation that failed and carrying
/// the underlying SQLite error. Every write is a single statement, so a
/// failed operation leaves no partial row behind.
#[derive(Debug, Error)]
#[error("storage failure during {op}: {source}")]
pub struct StorageError {
    pub op: &'static str,
    #[source]
    pub source: rusqlite::Error,
}

impl StorageError {
    fn new(op: &'static str, source: rusqlite::Error) -> Self {
        StorageError { op, source }
    }

    /// True when SQLite reports the database file as busy or locked by
    /// another handle. Callers use this to pick a friendlier message; the
    /// operation itself is not retried.
    pub fn is_locked(&self) -> bool {
        matches!(
            &self.source,
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
        )
    }
}

/// One sentence record as stored.
///
/// `rewrite` and `updated_at` are absent until the user first acts on the
/// record. `original`, `id`, and `created_at` never change after insert.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub id: i64,
    pub original: String,
    pub rewrite: Option<String>,
    pub seen: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// SQLite-backed persistence for the sentence pool.
pub struct Store {
    conn: Mutex<Connection>,
}

/// Current UTC time as the timestamp text stored in the database.
fn now_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

impl Store {
    /// Open (or create) a database at `path` and ensure the schema exists.
    /// Pass `":memory:"` for an ephemeral in-memory store (useful for tests).
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::new("open", e))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| StorageError::new("open", e))?;

        let store = Store {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Idempotently create the `sentences` table. Safe to call on a database
    /// that already has it.
    ///
    /// `AUTOINCREMENT` keeps ids monotonic: a rowid is never handed out
    /// twice, even after rows are removed out-of-band.
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS sentences (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                original   TEXT NOT NULL,
                rewrite    TEXT,
                seen       INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT
            );
            ",
        )
        .map_err(|e| StorageError::new("ensure_schema", e))
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Insert a sentence unless an identical `original` already exists.
    /// The text is trimmed of surrounding whitespace first; the duplicate
    /// check is a case-sensitive exact match. Returns whether a row was
    /// actually inserted. Blank-after-trim input inserts nothing.
    pub fn insert(&self, original: &str) -> Result<bool, StorageError> {
        let text = original.trim();
        if text.is_empty() {
            return Ok(false);
        }

        let conn = self.conn();
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sentences WHERE original = ?1)",
                params![text],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::new("insert", e))?;
        if exists {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO sentences (original, created_at) VALUES (?1, ?2)",
            params![text, now_utc()],
        )
        .map_err(|e| StorageError::new("insert", e))?;
        Ok(true)
    }

    /// Pick one unseen sentence uniformly at random, or `None` when every
    /// record has been seen (or the store is empty).
    pub fn pick_random_unseen(&self) -> Result<Option<Sentence>, StorageError> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, original, rewrite, seen, created_at, updated_at
             FROM sentences WHERE seen = 0 ORDER BY RANDOM() LIMIT 1",
            [],
            row_to_sentence,
        )
        .optional()
        .map_err(|e| StorageError::new("pick_random_unseen", e))
    }

    /// Store (or overwrite) the user's rewrite for a sentence and stamp
    /// `updated_at`.
    pub fn update_rewrite(&self, id: i64, text: &str) -> Result<(), StorageError> {
        let conn = self.conn();
        conn.execute(
            "UPDATE sentences SET rewrite = ?1, updated_at = ?2 WHERE id = ?3",
            params![text, now_utc(), id],
        )
        .map_err(|e| StorageError::new("update_rewrite", e))?;
        Ok(())
    }

    /// Mark a sentence as seen and stamp `updated_at`.
    pub fn mark_seen(&self, id: i64) -> Result<(), StorageError> {
        let conn = self.conn();
        conn.execute(
            "UPDATE sentences SET seen = 1, updated_at = ?1 WHERE id = ?2",
            params![now_utc(), id],
        )
        .map_err(|e| StorageError::new("mark_seen", e))?;
        Ok(())
    }

    /// Total number of sentence records.
    pub fn count_total(&self) -> Result<usize, StorageError> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sentences", [], |row| row.get(0))
            .map_err(|e| StorageError::new("count_total", e))?;
        Ok(count as usize)
    }

    /// Number of completed records (those with a rewrite attached).
    pub fn count_completed(&self) -> Result<usize, StorageError> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sentences WHERE rewrite IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::new("count_completed", e))?;
        Ok(count as usize)
    }

    /// All completed records in natural (id) order, for export.
    pub fn completed(&self) -> Result<Vec<Sentence>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, original, rewrite, seen, created_at, updated_at
                 FROM sentences WHERE rewrite IS NOT NULL ORDER BY id",
            )
            .map_err(|e| StorageError::new("completed", e))?;

        let rows = stmt
            .query_map([], row_to_sentence)
            .map_err(|e| StorageError::new("completed", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::new("completed", e))?;
        Ok(rows)
    }

    /// Fetch a single record by id. Returns `None` for an unknown id.
    pub fn fetch(&self, id: i64) -> Result<Option<Sentence>, StorageError> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, original, rewrite, seen, created_at, updated_at
             FROM sentences WHERE id = ?1",
            params![id],
            row_to_sentence,
        )
        .optional()
        .map_err(|e| StorageError::new("fetch", e))
    }

    /// Return every record to the unseen state: `seen` cleared, `rewrite`
    /// and `updated_at` removed. `original`, `id`, and `created_at` are
    /// untouched and no record is deleted.
    pub fn reset_all(&self) -> Result<(), StorageError> {
        let conn = self.conn();
        conn.execute(
            "UPDATE sentences SET seen = 0, rewrite = NULL, updated_at = NULL",
            [],
        )
        .map_err(|e| StorageError::new("reset_all", e))?;
        Ok(())
    }
}

fn row_to_sentence(row: &rusqlite::Row) -> rusqlite::Result<Sentence> {
    Ok(Sentence {
        id: row.get(0)?,
        original: row.get(1)?,
        rewrite: row.get(2)?,
        seen: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
