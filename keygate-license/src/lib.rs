//! Key validation and device binding for Keygate.
//!
//! This crate handles:
//! - Looking up license keys and rejecting unknown, used or expired ones
//! - Binding each key to the first device that activates it
//! - Computing the remaining days and the developer flag
//! - The challenge-response transform returned with every "allow" reply
//!
//! # Design Principles
//!
//! - **Stateless**: all durable state lives behind the [`KeyStore`] trait
//! - **Opaque rejections**: unknown, used and expired keys all look like [`LicenseError::InvalidKey`]
//! - **Recorded or refused**: a check that cannot be persisted is never allowed

mod challenge;
mod check;
mod error;
mod key;
mod store;
mod usage;
mod validator;

pub use challenge::{respond, transform_first, transform_second, ChallengeResponse, Numeric};
pub use check::{check, check_at, CheckRequest, CheckResponse, ValidatedRequest, STATUS_ALLOW};
pub use error::{LicenseError, LicenseResult, StoreError, StoreResult};
pub use key::{
    ActivationFields, ActivationKey, DaysLeft, KeyActivation, UsageRecord, DEV_LEVEL,
};
pub use store::{KeyStore, MemoryKeyStore, UsageLog};
pub use usage::{log_usage, usage_record, UNKNOWN};
pub use validator::{Validation, Validator};
