// Copyright (c) The qadash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The append-only history store.
//!
//! One delimited log file per source type, each with a fixed header
//! (`timestamp` plus that source's canonical fields). A log is a ledger, not
//! a sorted index: rows are kept in append order and never rewritten or
//! reordered. Appends go through an exclusive advisory lock so two
//! overlapping invocations cannot interleave partial rows.

use crate::{errors::HistoryStoreError, source::SourceKind, table};
use camino::{Utf8Path, Utf8PathBuf};
use fs4::fs_std::FileExt;
use indexmap::IndexMap;
use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
};

static HISTORY_LOCK_FILE_NAME: &str = "history.lock";

/// One row of a history log: the run timestamp plus the fields copied out of
/// that run's summary, in header order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryRecord {
    /// When the pipeline run happened, RFC 3339.
    pub timestamp: String,
    /// Field name to value, in canonical header order.
    pub fields: IndexMap<String, String>,
}

impl HistoryRecord {
    /// Creates an empty record for the given run timestamp.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds a field. Order of calls is the header order.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    fn header(&self) -> Vec<String> {
        std::iter::once("timestamp".to_owned())
            .chain(self.fields.keys().cloned())
            .collect()
    }

    fn row(&self) -> Vec<&str> {
        std::iter::once(self.timestamp.as_str())
            .chain(self.fields.values().map(String::as_str))
            .collect()
    }
}

/// Manages the per-source history logs under one directory.
#[derive(Debug)]
pub struct HistoryStore {
    dir: Utf8PathBuf,
}

impl HistoryStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Result<Self, HistoryStoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|error| HistoryStoreError::DirCreate {
            dir: dir.clone(),
            error,
        })?;
        Ok(Self { dir })
    }

    /// Appends one record to the source's log.
    ///
    /// On first append the record's field names establish the log's fixed
    /// header. Every later append must produce the same field set; a
    /// mismatch is a configuration error, not something the store adapts to.
    /// The row is written with a single buffered write so a reader never
    /// observes a partial row. Sources without a history log (the cloud
    /// metric) are a no-op.
    pub fn append(
        &self,
        kind: SourceKind,
        record: &HistoryRecord,
    ) -> Result<(), HistoryStoreError> {
        let Some(file_name) = kind.history_file_name() else {
            return Ok(());
        };
        let path = self.dir.join(file_name);

        // Held for the duration of the append only.
        let _lock = self.lock_exclusive()?;

        let incoming_header = record.header();
        let existing_header = read_header(&path)?;
        match existing_header {
            Some(existing) if existing != incoming_header => {
                return Err(HistoryStoreError::HeaderMismatch {
                    path,
                    existing,
                    incoming: incoming_header,
                });
            }
            Some(_) => {
                append_text(&path, &table::format_row(record.row()))?;
            }
            None => {
                // First append: establish the header contract and write the
                // first row together.
                let mut contents = table::format_row(&incoming_header);
                contents.push('\n');
                contents.push_str(&table::format_row(record.row()));
                append_text(&path, &contents)?;
            }
        }
        Ok(())
    }

    /// Reads a source's full log, in append order. A missing log file reads
    /// as empty history.
    pub fn read_all(&self, kind: SourceKind) -> Result<Vec<HistoryRecord>, HistoryStoreError> {
        let Some(file_name) = kind.history_file_name() else {
            return Ok(Vec::new());
        };
        let path = self.dir.join(file_name);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(HistoryStoreError::Io { path, error }),
        };

        let parsed = table::parse(&contents).map_err(|err| HistoryStoreError::Malformed {
            path: path.clone(),
            detail: err.to_string(),
        })?;
        if parsed.headers.first().map(String::as_str) != Some("timestamp") {
            return Err(HistoryStoreError::Malformed {
                path,
                detail: format!("first column is {:?}, expected `timestamp`", parsed.headers),
            });
        }

        let mut records = Vec::with_capacity(parsed.rows.len());
        for (index, row) in parsed.rows.into_iter().enumerate() {
            if row.len() != parsed.headers.len() {
                return Err(HistoryStoreError::Malformed {
                    path,
                    detail: format!(
                        "row {} has {} cells, header has {}",
                        index + 1,
                        row.len(),
                        parsed.headers.len()
                    ),
                });
            }
            let mut cells = row.into_iter();
            let timestamp = cells.next().unwrap_or_default();
            let fields = parsed.headers[1..]
                .iter()
                .cloned()
                .zip(cells)
                .collect::<IndexMap<_, _>>();
            records.push(HistoryRecord { timestamp, fields });
        }
        Ok(records)
    }

    fn lock_exclusive(&self) -> Result<File, HistoryStoreError> {
        let lock_path = self.dir.join(HISTORY_LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|error| HistoryStoreError::Lock {
                path: lock_path.clone(),
                error,
            })?;
        // Appends are tiny, so blocking here is fine.
        file.lock_exclusive()
            .map_err(|error| HistoryStoreError::Lock {
                path: lock_path,
                error,
            })?;
        Ok(file)
    }
}

fn read_header(path: &Utf8Path) -> Result<Option<Vec<String>>, HistoryStoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(HistoryStoreError::Io {
                path: path.to_owned(),
                error,
            });
        }
    };
    if contents.trim().is_empty() {
        return Ok(None);
    }
    let parsed = table::parse(&contents).map_err(|err| HistoryStoreError::Malformed {
        path: path.to_owned(),
        detail: err.to_string(),
    })?;
    Ok(Some(parsed.headers))
}

/// Appends `contents` plus a trailing newline in one write call, so a
/// concurrent reader never sees a partial row.
fn append_text(path: &Utf8Path, contents: &str) -> Result<(), HistoryStoreError> {
    let io_err = |error| HistoryStoreError::Io {
        path: path.to_owned(),
        error,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    let mut line = String::with_capacity(contents.len() + 1);
    line.push_str(contents);
    line.push('\n');
    file.write_all(line.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use pretty_assertions::assert_eq;

    fn record(ts: &str, failures: u64) -> HistoryRecord {
        HistoryRecord::new(ts)
            .field("tests", "12")
            .field("failures", failures.to_string())
            .field("errors", "0")
            .field("skipped", "2")
    }

    #[test]
    fn append_then_read_all_round_trips() {
        let dir = Utf8TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path()).unwrap();

        assert_eq!(store.read_all(SourceKind::UnitTest).unwrap(), vec![]);

        let first = record("2026-08-01T00:00:00Z", 1);
        store.append(SourceKind::UnitTest, &first).unwrap();
        assert_eq!(store.read_all(SourceKind::UnitTest).unwrap(), vec![first]);
    }

    #[test]
    fn n_appends_read_back_in_append_order() {
        let dir = Utf8TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path()).unwrap();

        let records: Vec<_> = (0..5)
            .map(|i| record(&format!("2026-08-0{}T00:00:00Z", i + 1), i))
            .collect();
        for r in &records {
            store.append(SourceKind::UnitTest, r).unwrap();
        }
        assert_eq!(store.read_all(SourceKind::UnitTest).unwrap(), records);
    }

    #[test]
    fn header_contract_is_enforced() {
        let dir = Utf8TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path()).unwrap();

        store
            .append(SourceKind::UnitTest, &record("2026-08-01T00:00:00Z", 0))
            .unwrap();
        let drifted = HistoryRecord::new("2026-08-02T00:00:00Z").field("totals", "12");
        let err = store.append(SourceKind::UnitTest, &drifted).unwrap_err();
        assert!(matches!(err, HistoryStoreError::HeaderMismatch { .. }));

        // The failed append must not have touched the log.
        assert_eq!(store.read_all(SourceKind::UnitTest).unwrap().len(), 1);
    }

    #[test]
    fn logs_are_separated_by_source() {
        let dir = Utf8TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path()).unwrap();

        store
            .append(SourceKind::UnitTest, &record("2026-08-01T00:00:00Z", 0))
            .unwrap();
        let load = HistoryRecord::new("2026-08-01T00:00:00Z")
            .field("requests", "150")
            .field("failures", "2")
            .field("avg_response_time_ms", "37.5");
        store.append(SourceKind::LoadTest, &load).unwrap();

        assert_eq!(store.read_all(SourceKind::UnitTest).unwrap().len(), 1);
        assert_eq!(store.read_all(SourceKind::LoadTest).unwrap(), vec![load]);
    }

    #[test]
    fn cloud_metric_has_no_log() {
        let dir = Utf8TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path()).unwrap();
        let rec = HistoryRecord::new("2026-08-01T00:00:00Z");
        store.append(SourceKind::CloudMetric, &rec).unwrap();
        assert_eq!(store.read_all(SourceKind::CloudMetric).unwrap(), vec![]);
    }

    #[test]
    fn values_with_commas_and_quotes_survive() {
        let dir = Utf8TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path()).unwrap();
        let rec = HistoryRecord::new("2026-08-01T00:00:00Z")
            .field("requests", "1")
            .field("failures", "0")
            .field("avg_response_time_ms", "a,b \"c\"");
        store.append(SourceKind::LoadTest, &rec).unwrap();
        assert_eq!(store.read_all(SourceKind::LoadTest).unwrap(), vec![rec]);
    }
}
