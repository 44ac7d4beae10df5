//! Flat JSON record store: one document per submission, no index, no
//! locking. Listing is a linear scan of the directory sorted by file
//! modification time.

pub mod media;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::StoreConfig;
use crate::error::{GriotError, Result};
use crate::record::Record;

pub struct RecordStore {
    data_dir: PathBuf,
}

/// A record file that could not be parsed during a listing.
#[derive(Debug)]
pub struct ListError {
    pub path: PathBuf,
    pub message: String,
}

/// Parsed records plus per-file errors from one directory scan.
#[derive(Debug, Default)]
pub struct ListOutcome {
    pub records: Vec<Record>,
    pub errors: Vec<ListError>,
}

impl RecordStore {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let data_dir = crate::config::Config::expand_path(&config.directory);
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Write a new record as `<data-dir>/<id>.json`. Records are
    /// write-once: an existing file under the same id is refused, never
    /// overwritten.
    pub fn save(&self, record: &Record) -> Result<PathBuf> {
        let path = self.record_path(&record.id.to_string());
        if path.exists() {
            return Err(GriotError::Store(format!(
                "record {} already exists",
                record.id
            )));
        }

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| GriotError::Store(format!("failed to serialize record: {e}")))?;

        fs::write(&path, json).map_err(|e| {
            GriotError::Store(format!("failed to write {}: {e}", path.display()))
        })?;

        tracing::debug!("wrote record to {}", path.display());
        Ok(path)
    }

    /// Read one record by its full identifier.
    pub fn load(&self, id: &str) -> Result<Record> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(GriotError::NotFound(id.to_string()));
        }
        read_record(&path)
    }

    /// Exact identifier first, then a unique short-id prefix.
    pub fn find(&self, id_or_prefix: &str) -> Result<Record> {
        if self.record_path(id_or_prefix).exists() {
            return self.load(id_or_prefix);
        }

        let outcome = self.list()?;
        let mut matches = outcome
            .records
            .into_iter()
            .filter(|r| r.id.to_string().starts_with(id_or_prefix));

        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record),
            (Some(_), Some(_)) => Err(GriotError::Store(format!(
                "id prefix '{id_or_prefix}' matches more than one record"
            ))),
            _ => Err(GriotError::NotFound(id_or_prefix.to_string())),
        }
    }

    /// Scan the data directory, newest first. Malformed files are collected
    /// as per-file errors without aborting the rest of the listing.
    pub fn list(&self) -> Result<ListOutcome> {
        let mut parsed: Vec<(SystemTime, Record)> = Vec::new();
        let mut errors = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match read_record(&path) {
                Ok(record) => {
                    let modified = entry
                        .metadata()
                        .and_then(|m| m.modified())
                        .unwrap_or(SystemTime::UNIX_EPOCH);
                    parsed.push((modified, record));
                }
                Err(e) => errors.push(ListError {
                    path,
                    message: e.to_string(),
                }),
            }
        }

        parsed.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(ListOutcome {
            records: parsed.into_iter().map(|(_, record)| record).collect(),
            errors,
        })
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{id}.json"))
    }
}

fn read_record(path: &Path) -> Result<Record> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| GriotError::Store(format!("failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Coordinates, MediaRefs, Summary};
    use chrono::Utc;
    use uuid::Uuid;

    fn test_store(dir: &Path) -> RecordStore {
        RecordStore::open(&StoreConfig {
            directory: dir.to_string_lossy().to_string(),
        })
        .unwrap_or_else(|e| panic!("{e}"))
    }

    fn sample_record(submitter: &str) -> Record {
        Record {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            submitter: submitter.to_string(),
            coordinates: Coordinates::default(),
            category: "Story".to_string(),
            language: "Telugu".to_string(),
            transcript: "అనగనగా ఒక ఊరిలో".to_string(),
            translation: "Once upon a time in a village".to_string(),
            summary: Some(Summary::Text {
                title: "A village story".to_string(),
                category: "General Summary".to_string(),
                summary_text: "A short folk tale.".to_string(),
            }),
            prompt: "Transcribe the attached audio...".to_string(),
            media: MediaRefs::default(),
        }
    }

    #[test]
    fn saved_record_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let store = test_store(dir.path());

        let record = sample_record("Lakshmi");
        let path = store.save(&record).unwrap_or_else(|e| panic!("{e}"));
        assert!(path.exists());

        let loaded = store
            .load(&record.id.to_string())
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(record, loaded);
    }

    #[test]
    fn records_are_write_once() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let store = test_store(dir.path());

        let record = sample_record("Lakshmi");
        store.save(&record).unwrap_or_else(|e| panic!("{e}"));
        let second = store.save(&record);
        assert!(second.is_err());
    }

    #[test]
    fn loading_a_missing_record_is_not_found() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let store = test_store(dir.path());

        let result = store.load("no-such-id");
        assert!(matches!(result, Err(GriotError::NotFound(_))));
    }

    #[test]
    fn listing_skips_malformed_files_and_reports_them() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let store = test_store(dir.path());

        for name in ["Asha", "Bhavani", "Chandra"] {
            store
                .save(&sample_record(name))
                .unwrap_or_else(|e| panic!("{e}"));
        }
        fs::write(dir.path().join("broken.json"), "{ not json")
            .unwrap_or_else(|e| panic!("{e}"));
        fs::write(dir.path().join("truncated.json"), r#"{"id": "x"}"#)
            .unwrap_or_else(|e| panic!("{e}"));

        let outcome = store.list().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.errors.len(), 2);
    }

    #[test]
    fn listing_ignores_non_json_files() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let store = test_store(dir.path());

        store
            .save(&sample_record("Asha"))
            .unwrap_or_else(|e| panic!("{e}"));
        fs::write(dir.path().join("notes.txt"), "not a record")
            .unwrap_or_else(|e| panic!("{e}"));
        fs::create_dir_all(dir.path().join("uploads/audio")).unwrap_or_else(|e| panic!("{e}"));

        let outcome = store.list().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn listing_is_newest_first() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let store = test_store(dir.path());

        let older = sample_record("Asha");
        let newer = sample_record("Bhavani");
        let older_path = store.save(&older).unwrap_or_else(|e| panic!("{e}"));
        store.save(&newer).unwrap_or_else(|e| panic!("{e}"));

        // Push the first file's mtime firmly into the past; directory scans
        // order by modification time, not by embedded timestamp.
        let past = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        let file = fs::File::options()
            .append(true)
            .open(&older_path)
            .unwrap_or_else(|e| panic!("{e}"));
        file.set_modified(past).unwrap_or_else(|e| panic!("{e}"));

        let outcome = store.list().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(outcome.records[0].id, newer.id);
        assert_eq!(outcome.records[1].id, older.id);
    }

    #[test]
    fn find_resolves_a_unique_prefix() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let store = test_store(dir.path());

        let record = sample_record("Asha");
        store.save(&record).unwrap_or_else(|e| panic!("{e}"));

        let prefix: String = record.id.to_string().chars().take(8).collect();
        let found = store.find(&prefix).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(found.id, record.id);

        assert!(store.find("ffffffff").is_err());
    }
}
