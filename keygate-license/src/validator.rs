//! Key validation and device binding.

use crate::error::{LicenseError, LicenseResult};
use crate::key::{ActivationFields, DaysLeft, DEV_LEVEL};
use crate::store::KeyStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    /// Remaining validity.
    pub days_left: DaysLeft,
    /// True if the key's creator holds the developer level.
    pub is_dev: bool,
}

/// Validates keys against a [`KeyStore`].
///
/// Holds no state of its own; cloning shares the store.
pub struct Validator<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for Validator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyStore + ?Sized> Validator<S> {
    /// Creates a validator over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validates `key` for `hwid` at the current time.
    ///
    /// # Errors
    ///
    /// See [`validate_at`](Self::validate_at).
    pub fn validate(
        &self,
        key: &str,
        hwid: &str,
        first_val: f64,
        second_val: f64,
    ) -> LicenseResult<Validation> {
        self.validate_at(key, hwid, first_val, second_val, Utc::now())
    }

    /// Validates `key` for `hwid` as of `now`, binding the key to the device
    /// on first use and refreshing the activation row on every success.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::InvalidKey`] if no unused, unexpired key matches.
    /// - [`LicenseError::KeyExpired`] if the key's expiration has passed.
    /// - [`LicenseError::DeviceMismatch`] if another device holds the key.
    /// - [`LicenseError::ActivationPersist`] if the activation cannot be saved.
    /// - [`LicenseError::StoreUnavailable`] on any other store failure.
    pub fn validate_at(
        &self,
        key: &str,
        hwid: &str,
        first_val: f64,
        second_val: f64,
        now: DateTime<Utc>,
    ) -> LicenseResult<Validation> {
        let masked = mask_key(key);

        let Some(record) = self.store.find_active_key(key)? else {
            warn!(key = %masked, "rejected unknown or inactive key");
            return Err(LicenseError::InvalidKey);
        };

        if record.is_past_expiry(now) {
            // The rejection stands whether or not the flag is persisted.
            if let Err(e) = self.store.mark_expired(key) {
                warn!(key = %masked, error = %e, "failed to mark key expired");
            }
            warn!(key = %masked, "key expired");
            return Err(LicenseError::KeyExpired);
        }

        if let Some(other) = self.store.find_other_device_activation(key, hwid)? {
            warn!(key = %masked, bound_to = %other.hwid, "device mismatch");
            return Err(LicenseError::DeviceMismatch);
        }

        let fields = ActivationFields {
            activated_at: now,
            last_check: now,
            first_val,
            second_val,
        };
        self.store
            .upsert_activation(key, hwid, fields)
            .map_err(|e| LicenseError::ActivationPersist(e.to_string()))?;

        let days_left = DaysLeft::until(record.expires_at, now);
        let is_dev = self.store.find_user_level(&record.created_by)? == Some(DEV_LEVEL);
        debug!(key = %masked, ?days_left, is_dev, "validation passed");
        info!(key = %masked, hwid, "key validated");

        Ok(Validation { days_left, is_dev })
    }
}

/// Shortens a key for log output.
pub(crate) fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}***")
}
