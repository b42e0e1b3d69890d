//! Error types for key validation.

use thiserror::Error;

/// Validation errors surfaced to the caller.
///
/// Every variant is terminal for the request. `InvalidKey` deliberately
/// covers unknown, used and already-expired keys alike.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// One or more required request fields were absent.
    #[error("missing required fields: {0}")]
    MissingFields(String),

    /// Key does not exist, is used, or was already marked expired.
    #[error("invalid key")]
    InvalidKey,

    /// Key passed its expiration date on this check.
    #[error("key expired")]
    KeyExpired,

    /// Key is already bound to another device.
    #[error("key is bound to another device")]
    DeviceMismatch,

    /// The activation record could not be written.
    #[error("failed to record activation: {0}")]
    ActivationPersist(String),

    /// The backing store failed unexpectedly.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Catch-all for unanticipated faults.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LicenseError {
    /// Stable snake_case identifier for wire responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "missing_fields",
            Self::InvalidKey => "invalid_key",
            Self::KeyExpired => "key_expired",
            Self::DeviceMismatch => "device_mismatch",
            Self::ActivationPersist(_) => "activation_persist_error",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns true if the caller may retry the same request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ActivationPersist(_) | Self::StoreUnavailable(_) | Self::Internal(_)
        )
    }
}

/// Result type for validation operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

/// Errors raised by a [`KeyStore`](crate::KeyStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the query failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected.
    #[error("write failed: {0}")]
    Write(String),

    /// A stored row could not be decoded.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for LicenseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) | StoreError::Write(msg) => Self::StoreUnavailable(msg),
            StoreError::Corrupt(msg) => Self::Internal(msg),
        }
    }
}
