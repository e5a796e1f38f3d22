//! File-backed availability store: one JSON file per user.

use crate::availability::collection::{SortOrder, UserAvailabilityCollection, sort_records};
use crate::availability::record::AvailabilityRecord;
use crate::config::StorageConfig;
use crate::error::{Result, RollcallError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// A user file that `list()` could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of enumerating the store.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityListing {
    /// Latest record (by insertion order) of every readable user file.
    pub records: Vec<AvailabilityRecord>,
    pub skipped: Vec<SkippedFile>,
}

/// Persists each user's bounded record collection under `<dir>/<user_id>.json`.
#[derive(Debug)]
pub struct AvailabilityStore {
    dir: PathBuf,
    max_per_user: usize,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AvailabilityStore {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>, max_per_user: usize) -> Self {
        Self {
            dir: dir.into(),
            max_per_user: max_per_user.max(1),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.availabilities_dir.clone(),
            config.max_availabilities_per_user,
        )
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn max_per_user(&self) -> usize {
        self.max_per_user
    }

    /// Append a record to the user's collection and persist it.
    ///
    /// The load-push-write sequence runs under a per-user lock; the oldest
    /// record is evicted when the collection is full.
    pub fn append(
        &self,
        user_id: &str,
        user_name: &str,
        is_available: bool,
        availability_time: DateTime<Utc>,
    ) -> Result<AvailabilityRecord> {
        let path = self.user_path(user_id)?;
        let user_lock = self.user_lock(user_id);
        let _guard = lock(&user_lock);

        let mut collection = self.read_collection(&path)?;
        let record = AvailabilityRecord::new(user_id, user_name, is_available, availability_time);
        if let Some(evicted) = collection.push(record.clone()) {
            debug!(
                user_id,
                evicted = evicted.timestamp_key(),
                "evicted oldest availability"
            );
        }

        let json = serde_json::to_string_pretty(&collection.to_vec())
            .map_err(|e| RollcallError::StorageWrite(format!("serialize {user_id}: {e}")))?;
        write_atomic(&path, &json)
            .map_err(|e| RollcallError::StorageWrite(format!("{}: {e}", path.display())))?;

        info!(
            user_id,
            is_available,
            time = %availability_time,
            stored = collection.len(),
            "availability committed"
        );
        Ok(record)
    }

    /// The user's full collection; empty if they have no file.
    pub fn load_user(&self, user_id: &str) -> Result<UserAvailabilityCollection> {
        let path = self.user_path(user_id)?;
        self.read_collection(&path)
    }

    /// A user is subscribed once at least one record is stored for them.
    pub fn is_subscribed(&self, user_id: &str) -> Result<bool> {
        Ok(!self.load_user(user_id)?.is_empty())
    }

    /// Latest record of every user. Unreadable files are skipped and reported.
    pub fn list(&self) -> Result<AvailabilityListing> {
        let mut listing = AvailabilityListing::default();
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(listing),
            Err(e) => {
                return Err(RollcallError::StorageRead(format!(
                    "{}: {e}",
                    self.dir.display()
                )));
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            match self.read_collection(&path) {
                Ok(collection) => {
                    if let Some(latest) = collection.latest() {
                        listing.records.push(latest.clone());
                    }
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping unreadable availability file"
                    );
                    listing.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(listing)
    }

    /// [`AvailabilityStore::list`] with records ordered by time.
    pub fn list_sorted(&self, order: SortOrder) -> Result<AvailabilityListing> {
        let mut listing = self.list()?;
        sort_records(&mut listing.records, order);
        Ok(listing)
    }

    fn user_path(&self, user_id: &str) -> Result<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{user_id}.json")))
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = lock(&self.locks);
        Arc::clone(locks.entry(user_id.to_owned()).or_default())
    }

    fn read_collection(&self, path: &Path) -> Result<UserAvailabilityCollection> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UserAvailabilityCollection::new(self.max_per_user));
            }
            Err(e) => {
                return Err(RollcallError::StorageRead(format!("{}: {e}", path.display())));
            }
        };
        let records = parse_records(&content)
            .map_err(|e| RollcallError::StorageRead(format!("{}: {e}", path.display())))?;
        Ok(UserAvailabilityCollection::from_records(
            records,
            self.max_per_user,
        ))
    }
}

/// Accepts the array layout and the legacy single-object layout.
fn parse_records(content: &str) -> serde_json::Result<Vec<AvailabilityRecord>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|record| vec![record])
    }
}

fn validate_user_id(user_id: &str) -> Result<()> {
    let valid = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RollcallError::InvalidUserId(user_id.to_owned()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_name = format!(
        ".{}.tmp-{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("user"),
        std::process::id()
    );
    let tmp_path = path
        .parent()
        .map(|p| p.join(&tmp_name))
        .unwrap_or_else(|| PathBuf::from(&tmp_name));

    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)
}
