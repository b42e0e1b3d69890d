//! Shared test helpers for validation tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use keygate_license::{ActivationKey, MemoryKeyStore, Validator};
use std::sync::Arc;

/// Fixed clock so day arithmetic is deterministic.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// A store seeded with one unlimited key owned by `owner-1`.
pub fn seeded_store() -> Arc<MemoryKeyStore> {
    let store = Arc::new(MemoryKeyStore::new());
    store.insert_key(ActivationKey::new("UNLIMITED", "owner-1", None)).unwrap();
    store
}

/// A key expiring `days` days after [`fixed_now`].
pub fn key_expiring_in(key: &str, owner: &str, days: i64) -> ActivationKey {
    ActivationKey::new(key, owner, Some(fixed_now() + Duration::days(days)))
}

pub fn validator_for(store: &Arc<MemoryKeyStore>) -> Validator<MemoryKeyStore> {
    Validator::new(Arc::clone(store))
}
