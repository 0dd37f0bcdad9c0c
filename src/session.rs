// Practice-session semantics layered on the sentence store: CSV import and
// export, random sentence selection, rewrite submission, progress, reset.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{Sentence, StorageError, Store};

/// Name of the required import column. Matched case-sensitively against the
/// CSV header row.
pub const SENTENCE_COLUMN: &str = "sentence";

/// Export header, one row per completed record.
const EXPORT_HEADER: [&str; 5] = ["id", "original", "rewrite", "created_at", "updated_at"];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("import file is missing the required '{column}' column")]
    ImportFormat { column: &'static str },

    #[error("rewrite is empty")]
    EmptyRewrite,

    #[error("cannot access {path}: {source}")]
    FileAccess {
        path: String,
        source: std::io::Error,
    },
}

/// Map a csv-layer error to a `SessionError` for the given file.
///
/// I/O faults keep their original cause; anything else (UTF-8, quoting)
/// is reported as unreadable data at the same path.
fn csv_to_session(path: &str, err: csv::Error) -> SessionError {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => SessionError::FileAccess {
            path: path.to_string(),
            source,
        },
        kind => SessionError::FileAccess {
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{kind:?}")),
        },
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Practice progress: how many records carry a rewrite out of how many exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Sentence-practice session over a store handle.
///
/// The store is passed in at construction so callers (and tests) decide
/// where state lives — a real database file or `":memory:"`.
pub struct Session {
    store: Store,
}

impl Session {
    pub fn new(store: Store) -> Self {
        Session { store }
    }

    /// Direct access to the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Import sentences from a CSV file with a header row.
    ///
    /// The file must contain a column named `sentence` (case-sensitive);
    /// values are trimmed, blank rows are skipped, and duplicates of
    /// already-stored sentences are skipped. Returns the number of rows
    /// actually inserted.
    ///
    /// Import is not all-or-nothing: each row commits on its own, so rows
    /// inserted before a mid-file failure remain in the store when the
    /// error is reported.
    pub fn import_sentences(&self, path: &Path) -> Result<usize, SessionError> {
        let source = path.display().to_string();
        let file = File::open(path).map_err(|e| SessionError::FileAccess {
            path: source.clone(),
            source: e,
        })?;
        let count = self.import_from_reader(file, &source)?;
        info!("imported {count} new sentences from {source}");
        Ok(count)
    }

    fn import_from_reader<R: Read>(&self, rdr: R, source: &str) -> Result<usize, SessionError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);

        let column = reader
            .headers()
            .map_err(|e| csv_to_session(source, e))?
            .iter()
            .position(|h| h == SENTENCE_COLUMN)
            .ok_or(SessionError::ImportFormat {
                column: SENTENCE_COLUMN,
            })?;

        let mut count = 0;
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    // An I/O fault is fatal (rows already inserted stay
                    // committed); a malformed record is not.
                    if matches!(err.kind(), csv::ErrorKind::Io(_)) {
                        return Err(csv_to_session(source, err));
                    }
                    warn!("skipping malformed row in {source}: {err}");
                    continue;
                }
            };

            // Rows too short to reach the sentence column count as blank.
            let Some(value) = record.get(column) else {
                continue;
            };
            let text = value.trim();
            if text.is_empty() {
                continue;
            }
            if self.store.insert(text)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Next sentence to practice: one unseen record chosen uniformly at
    /// random, as `(id, original)`. `None` when the pool is exhausted.
    pub fn next_sentence(&self) -> Result<Option<(i64, String)>, SessionError> {
        let picked = self.store.pick_random_unseen()?;
        Ok(picked.map(|s| (s.id, s.original)))
    }

    /// Save the user's rewrite for a sentence and mark it seen.
    ///
    /// Fails with `EmptyRewrite` (record untouched) when the text is blank
    /// after trimming. The rewrite is written before the seen flag so a
    /// failure between the two never discards saved text.
    pub fn submit_rewrite(&self, id: i64, text: &str) -> Result<(), SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyRewrite);
        }
        self.store.update_rewrite(id, text)?;
        self.store.mark_seen(id)?;
        Ok(())
    }

    /// Mark a sentence as seen without attaching a rewrite.
    pub fn skip_current(&self, id: i64) -> Result<(), SessionError> {
        self.store.mark_seen(id)?;
        Ok(())
    }

    pub fn progress(&self) -> Result<Progress, SessionError> {
        Ok(Progress {
            completed: self.store.count_completed()?,
            total: self.store.count_total()?,
        })
    }

    /// Export every completed record to a CSV file with the header
    /// `id,original,rewrite,created_at,updated_at`, in natural (id) order.
    /// Returns the number of exported rows. The header is written even when
    /// there is nothing to export.
    pub fn export_completed(&self, path: &Path) -> Result<usize, SessionError> {
        let dest = path.display().to_string();
        let file = File::create(path).map_err(|e| SessionError::FileAccess {
            path: dest.clone(),
            source: e,
        })?;
        let count = self.export_to_writer(file, &dest)?;
        info!("exported {count} rewrites to {dest}");
        Ok(count)
    }

    fn export_to_writer<W: Write>(&self, w: W, dest: &str) -> Result<usize, SessionError> {
        let rows = self.store.completed()?;
        let mut writer = csv::Writer::from_writer(w);

        writer
            .write_record(EXPORT_HEADER)
            .map_err(|e| csv_to_session(dest, e))?;
        for sentence in &rows {
            writer
                .write_record(export_record(sentence))
                .map_err(|e| csv_to_session(dest, e))?;
        }
        writer.flush().map_err(|e| SessionError::FileAccess {
            path: dest.to_string(),
            source: e,
        })?;
        Ok(rows.len())
    }

    /// Return every record to the practice pool. Rewrites are cleared;
    /// originals stay.
    pub fn reset(&self) -> Result<(), SessionError> {
        self.store.reset_all()?;
        info!("session reset: all sentences returned to the practice pool");
        Ok(())
    }
}

fn export_record(sentence: &Sentence) -> [String; 5] {
    [
        sentence.id.to_string(),
        sentence.original.clone(),
        sentence.rewrite.clone().unwrap_or_default(),
        sentence.created_at.clone(),
        sentence.updated_at.clone().unwrap_or_default(),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
