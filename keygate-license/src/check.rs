//! Request-level orchestration: presence checks, validation, challenge.

use crate::challenge::{self, Numeric};
use crate::error::{LicenseError, LicenseResult};
use crate::key::DaysLeft;
use crate::store::KeyStore;
use crate::validator::Validator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status literal of a successful check.
pub const STATUS_ALLOW: &str = "allow";

/// A key check as received from the client.
///
/// Every field is optional so that absence can be told apart from zero.
/// A field sent as JSON `null` deserializes to `None` and is therefore
/// reported as missing, the same as an absent field; `0` is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub hwid: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub first_val: Option<f64>,
    #[serde(default)]
    pub second_val: Option<f64>,
}

/// A check whose required fields are all present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest<'a> {
    pub hwid: &'a str,
    pub key: &'a str,
    pub first_val: f64,
    pub second_val: f64,
}

impl CheckRequest {
    /// Creates a request with every field present.
    pub fn new(hwid: impl Into<String>, key: impl Into<String>, first_val: f64, second_val: f64) -> Self {
        Self {
            hwid: Some(hwid.into()),
            key: Some(key.into()),
            first_val: Some(first_val),
            second_val: Some(second_val),
        }
    }

    /// Checks that `hwid` and `key` are non-empty and both values are present.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MissingFields`] naming every absent field.
    pub fn require(&self) -> LicenseResult<ValidatedRequest<'_>> {
        let hwid = self.hwid.as_deref().filter(|s| !s.is_empty());
        let key = self.key.as_deref().filter(|s| !s.is_empty());

        match (hwid, key, self.first_val, self.second_val) {
            (Some(hwid), Some(key), Some(first_val), Some(second_val)) => Ok(ValidatedRequest {
                hwid,
                key,
                first_val,
                second_val,
            }),
            _ => {
                let missing: Vec<&str> = [
                    ("hwid", hwid.is_none()),
                    ("key", key.is_none()),
                    ("first_val", self.first_val.is_none()),
                    ("second_val", self.second_val.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(LicenseError::MissingFields(missing.join(", ")))
            }
        }
    }
}

/// The combined "allow" reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub status: String,
    pub newfirst_val: Numeric,
    pub newsecond_val: Numeric,
    pub days: DaysLeft,
    pub is_dev: bool,
}

/// Runs a full key check at the current time.
///
/// # Errors
///
/// See [`check_at`].
pub fn check<S: KeyStore + ?Sized>(
    validator: &Validator<S>,
    request: &CheckRequest,
) -> LicenseResult<CheckResponse> {
    check_at(validator, request, Utc::now())
}

/// Runs a full key check as of `now`.
///
/// The challenge is only computed once validation has succeeded.
///
/// # Errors
///
/// Returns [`LicenseError::MissingFields`] before touching the store, or any
/// error from [`Validator::validate_at`].
pub fn check_at<S: KeyStore + ?Sized>(
    validator: &Validator<S>,
    request: &CheckRequest,
    now: DateTime<Utc>,
) -> LicenseResult<CheckResponse> {
    let req = request.require()?;
    let validation =
        validator.validate_at(req.key, req.hwid, req.first_val, req.second_val, now)?;
    let answer = challenge::respond(req.first_val, req.second_val);

    Ok(CheckResponse {
        status: STATUS_ALLOW.to_string(),
        newfirst_val: answer.new_first,
        newsecond_val: answer.new_second,
        days: validation.days_left,
        is_dev: validation.is_dev,
    })
}
