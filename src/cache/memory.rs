//! In-memory cache with lazy expiry

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde_json::Value;

use super::CacheBackend;
use crate::observability::{log_event_with_fields, Event};
use crate::storage::{StorageError, StorageResult};

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

/// Cache held in process memory. Expired keys are invisible and removed
/// when next touched.
#[derive(Debug, Default)]
pub struct MemoryCache {
    prefix: String,
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::backend("memory cache lock poisoned"))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Live entry for `key`, reaping it if expired
    fn live<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Option<&'a mut Entry> {
        if entries.get(key).map_or(false, |entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }
}

impl CacheBackend for MemoryCache {
    fn initialize_schema(&self, _dry_run: bool) -> StorageResult<()> {
        Ok(())
    }

    fn flush(&self) -> StorageResult<()> {
        self.lock()?.clear();
        log_event_with_fields(Event::CacheFlushed, &[("prefix", self.prefix.as_str())]);
        Ok(())
    }

    fn ttl(&self, key: &str) -> StorageResult<Option<Duration>> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        Ok(Self::live(&mut entries, &self.full_key(key), now)
            .and_then(|entry| entry.expires_at)
            .map(|deadline| deadline.saturating_duration_since(now)))
    }

    fn expire(&self, key: &str, ttl: Duration) -> StorageResult<()> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        if let Some(entry) = Self::live(&mut entries, &self.full_key(key), now) {
            entry.expires_at = now.checked_add(ttl);
        }
        Ok(())
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> StorageResult<()> {
        let now = Instant::now();
        let entry = Entry {
            value,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
        };
        self.lock()?.insert(self.full_key(key), entry);
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        Ok(Self::live(&mut entries, &self.full_key(key), now).map(|entry| entry.value.clone()))
    }

    fn delete(&self, key: &str) -> StorageResult<Option<Value>> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        Ok(entries
            .remove(&self.full_key(key))
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value))
    }
}
