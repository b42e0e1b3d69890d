//! Store interface consumed by the validator, plus an in-memory backend.

use crate::error::{StoreError, StoreResult};
use crate::key::{ActivationFields, ActivationKey, KeyActivation, UsageRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Query interface over keys, activations and user levels.
///
/// Implementations are shared across concurrent requests.
///
/// The validator runs [`find_other_device_activation`](Self::find_other_device_activation)
/// and [`upsert_activation`](Self::upsert_activation) as two separate calls.
/// Two devices validating the same unbound key at the same instant can both
/// pass the first call and end up bound together.
pub trait KeyStore: Send + Sync {
    /// Finds a key that is neither used nor expired.
    fn find_active_key(&self, key: &str) -> StoreResult<Option<ActivationKey>>;

    /// Sets `expired = true` on the key.
    fn mark_expired(&self, key: &str) -> StoreResult<()>;

    /// Finds an activation of `key` held by any device other than `hwid`.
    fn find_other_device_activation(
        &self,
        key: &str,
        hwid: &str,
    ) -> StoreResult<Option<KeyActivation>>;

    /// Inserts or replaces the activation row for `(key, hwid)`.
    fn upsert_activation(&self, key: &str, hwid: &str, fields: ActivationFields) -> StoreResult<()>;

    /// Returns the level of a user, if one is recorded.
    fn find_user_level(&self, user_id: &str) -> StoreResult<Option<i64>>;
}

/// Append-only sink for usage records.
pub trait UsageLog: Send + Sync {
    fn record_usage(&self, record: &UsageRecord) -> StoreResult<()>;
}

#[derive(Debug, Default)]
struct Tables {
    keys: HashMap<String, ActivationKey>,
    activations: HashMap<(String, String), KeyActivation>,
    levels: HashMap<String, i64>,
    usage: Vec<UsageRecord>,
}

/// In-memory [`KeyStore`] for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    fail_level_lookups: AtomicBool,
}

impl MemoryKeyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a key row.
    pub fn insert_key(&self, key: ActivationKey) -> StoreResult<()> {
        self.lock()?.keys.insert(key.key.clone(), key);
        Ok(())
    }

    /// Records a user's level.
    pub fn set_user_level(&self, user_id: &str, level: i64) -> StoreResult<()> {
        self.lock()?.levels.insert(user_id.to_string(), level);
        Ok(())
    }

    /// Makes every subsequent write fail with [`StoreError::Write`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent [`KeyStore`] lookup fail with [`StoreError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes only [`KeyStore::find_user_level`] fail with [`StoreError::Unavailable`].
    pub fn fail_level_lookups(&self, fail: bool) {
        self.fail_level_lookups.store(fail, Ordering::SeqCst);
    }

    /// Returns the key row regardless of its state.
    #[must_use]
    pub fn key(&self, key: &str) -> Option<ActivationKey> {
        self.tables.lock().ok()?.keys.get(key).cloned()
    }

    /// Returns every activation row for a key, sorted by hwid.
    #[must_use]
    pub fn activations_for(&self, key: &str) -> Vec<KeyActivation> {
        let Ok(t) = self.tables.lock() else {
            return Vec::new();
        };
        let mut rows: Vec<_> = t
            .activations
            .values()
            .filter(|a| a.key == key)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.hwid.cmp(&b.hwid));
        rows
    }

    /// Returns every usage record, oldest first.
    #[must_use]
    pub fn usage(&self) -> Vec<UsageRecord> {
        self.tables
            .lock()
            .map(|t| t.usage.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("writes disabled".to_string()));
        }
        Ok(())
    }

    fn check_readable(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }
}

impl KeyStore for MemoryKeyStore {
    fn find_active_key(&self, key: &str) -> StoreResult<Option<ActivationKey>> {
        self.check_readable()?;
        Ok(self
            .lock()?
            .keys
            .get(key)
            .filter(|k| k.is_active())
            .cloned())
    }

    fn mark_expired(&self, key: &str) -> StoreResult<()> {
        self.check_writable()?;
        if let Some(row) = self.lock()?.keys.get_mut(key) {
            row.expired = true;
        }
        Ok(())
    }

    fn find_other_device_activation(
        &self,
        key: &str,
        hwid: &str,
    ) -> StoreResult<Option<KeyActivation>> {
        self.check_readable()?;
        Ok(self
            .lock()?
            .activations
            .values()
            .find(|a| a.key == key && a.hwid != hwid)
            .cloned())
    }

    fn upsert_activation(&self, key: &str, hwid: &str, fields: ActivationFields) -> StoreResult<()> {
        self.check_writable()?;
        self.lock()?.activations.insert(
            (key.to_string(), hwid.to_string()),
            KeyActivation::from_fields(key, hwid, fields),
        );
        Ok(())
    }

    fn find_user_level(&self, user_id: &str) -> StoreResult<Option<i64>> {
        self.check_readable()?;
        if self.fail_level_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("level lookups disabled".to_string()));
        }
        Ok(self.lock()?.levels.get(user_id).copied())
    }
}

impl UsageLog for MemoryKeyStore {
    fn record_usage(&self, record: &UsageRecord) -> StoreResult<()> {
        self.check_writable()?;
        self.lock()?.usage.push(record.clone());
        Ok(())
    }
}
