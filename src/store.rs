use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::error::{CorruptStateError, PersistenceError, StorageError};
use crate::models::FeedbackRecord;

pub const DEFAULT_KEY: &str = "teacherFeedbacks";

pub trait BlobStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl BlobStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let target = self.path_for(key);
        let staging = self.root.join(format!(".{key}.json.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            blobs: HashMap::new(),
            quota: Some(limit),
        }
    }

    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.blobs.insert(key.into(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }
}

impl BlobStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            let others: usize = self
                .blobs
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(_, blob)| blob.len())
                .sum();
            let requested = others + value.len();
            if requested > limit {
                return Err(StorageError::QuotaExceeded { requested, limit });
            }
        }
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn decode_records(blob: &str) -> Result<Vec<FeedbackRecord>, CorruptStateError> {
    Ok(serde_json::from_str(blob)?)
}

pub fn load_records<S: BlobStorage + ?Sized>(storage: &S, key: &str) -> Vec<FeedbackRecord> {
    let blob = match storage.get(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            debug!(key, "no persisted feedback, starting empty");
            return Vec::new();
        }
        Err(err) => {
            warn!(key, error = %err, "could not read persisted feedback, starting empty");
            return Vec::new();
        }
    };

    match decode_records(&blob) {
        Ok(records) => {
            debug!(key, count = records.len(), "loaded persisted feedback");
            records
        }
        Err(err) => {
            error!(key, error = %err, "discarding corrupt feedback blob");
            Vec::new()
        }
    }
}

#[derive(Debug)]
pub struct RecordStore<S> {
    storage: S,
    key: String,
    records: Vec<FeedbackRecord>,
}

impl<S: BlobStorage> RecordStore<S> {
    pub fn load(storage: S) -> Self {
        Self::load_with_key(storage, DEFAULT_KEY)
    }

    pub fn load_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let records = load_records(&storage, &key);
        Self {
            storage,
            key,
            records,
        }
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn append(&mut self, record: FeedbackRecord) -> Result<(), PersistenceError> {
        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.extend_from_slice(&self.records);
        next.push(record);

        if let Err(err) = self.persist(&next) {
            warn!(key = %self.key, error = %err, "feedback not saved");
            return Err(err);
        }
        self.records = next;
        info!(key = %self.key, count = self.records.len(), "feedback appended");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        if let Err(err) = self.persist(&[]) {
            warn!(key = %self.key, error = %err, "feedback not cleared");
            return Err(err);
        }
        self.records.clear();
        info!(key = %self.key, "all feedback cleared");
        Ok(())
    }

    fn persist(&mut self, records: &[FeedbackRecord]) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(records).map_err(PersistenceError::Encode)?;
        self.storage.set(&self.key, &blob)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RatingField, RawSubmission};
    use crate::validate::Validator;

    fn record(validator: &mut Validator, teacher: &str, satisfaction: &str) -> FeedbackRecord {
        let mut payload = RawSubmission::new()
            .with_teacher_name(teacher)
            .with_subject("Chemistry")
            .select_all("3")
            .with_comments("Labs are well organised.");
        payload
            .selections
            .insert(RatingField::Satisfaction, vec![satisfaction.to_string()]);
        validator.validate(&payload).unwrap()
    }

    #[test]
    fn missing_blob_loads_empty() {
        let store = RecordStore::load(MemoryStorage::new());
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_blob_degrades_to_empty() {
        let mut storage = MemoryStorage::new();
        storage.insert_raw(DEFAULT_KEY, "{not json");
        assert!(RecordStore::load(storage).is_empty());

        let mut storage = MemoryStorage::new();
        storage.insert_raw(DEFAULT_KEY, r#"[{"id": 1, "teacherName": "Ravi"}]"#);
        assert!(RecordStore::load(storage).is_empty());
    }

    #[test]
    fn append_persists_and_round_trips_in_order() {
        let mut validator = Validator::new();
        let mut store = RecordStore::load(MemoryStorage::new());
        let first = record(&mut validator, "Asha Rao", "4");
        let second = record(&mut validator, "Ravi", "2");
        store.append(first.clone()).unwrap();
        store.append(second.clone()).unwrap();

        let reloaded = RecordStore::load(store.into_storage());
        assert_eq!(reloaded.records(), &[first, second]);
    }

    #[test]
    fn failed_append_leaves_memory_unchanged() {
        let mut validator = Validator::new();
        let first = record(&mut validator, "Asha Rao", "4");
        let one_record = serde_json::to_string(&[first.clone()]).unwrap().len();
        let mut store = RecordStore::load(MemoryStorage::with_quota(one_record + 8));
        store.append(first).unwrap();

        let err = store
            .append(record(&mut validator, "Asha Rao", "5"))
            .unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(load_records(store.storage(), DEFAULT_KEY).len(), 1);
    }

    #[test]
    fn clear_then_load_is_empty() {
        let mut validator = Validator::new();
        let mut store = RecordStore::load(MemoryStorage::new());
        store.append(record(&mut validator, "Ravi", "5")).unwrap();
        store.clear().unwrap();

        assert!(store.is_empty());
        assert_eq!(store.storage().raw(DEFAULT_KEY), Some("[]"));
        assert!(RecordStore::load(store.into_storage()).is_empty());
    }

    #[test]
    fn accepts_blobs_written_by_the_browser_widget() {
        let blob = r#"[{
            "id": 1767600000000,
            "teacherName": "Asha Rao",
            "subject": "Mathematics",
            "effectiveness": "5", "communication": "4", "knowledge": "5",
            "management": "3", "punctuality": "4", "support": "4", "aids": "2",
            "satisfaction": "4",
            "comments": "Great classes",
            "date": "5/1/2026",
            "time": "12:00 pm",
            "timestamp": "2026-01-05T06:30:00.000Z"
        }]"#;
        let records = decode_records(blob).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].satisfaction.value(), 4);
        assert_eq!(records[0].aids.value(), 2);
    }

    #[test]
    fn out_of_range_rating_makes_blob_corrupt() {
        let blob = r#"[{
            "id": 1, "teacherName": "Ravi", "subject": "Physics",
            "effectiveness": 9, "communication": 4, "knowledge": 5,
            "management": 3, "punctuality": 4, "support": 4, "aids": 2,
            "satisfaction": 4, "comments": "x", "date": "", "time": "",
            "timestamp": "2026-01-05T06:30:00Z"
        }]"#;
        assert!(decode_records(blob).is_err());
    }

    #[test]
    fn unreadable_storage_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        fs::create_dir_all(storage.path_for(DEFAULT_KEY)).unwrap();

        assert!(storage.get(DEFAULT_KEY).is_err());
        assert!(load_records(&storage, DEFAULT_KEY).is_empty());
        assert!(RecordStore::load(storage).is_empty());
    }

    #[test]
    fn file_storage_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut validator = Validator::new();
        let mut store = RecordStore::load(FileStorage::new(dir.path()));
        let saved = record(&mut validator, "Ravi", "4");
        store.append(saved.clone()).unwrap();

        assert!(dir.path().join("teacherFeedbacks.json").exists());
        let reloaded = RecordStore::load(FileStorage::new(dir.path()));
        assert_eq!(reloaded.records(), &[saved]);
    }
}
