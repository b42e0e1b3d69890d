//! Stored key, activation and usage records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// User level that marks a key owner as a developer.
pub const DEV_LEVEL: i64 = 3;

/// A license key row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationKey {
    /// The key string.
    pub key: String,
    /// Whether the key has been consumed.
    pub is_used: bool,
    /// Whether the key has been marked expired.
    pub expired: bool,
    /// Expiration timestamp, or None for unlimited keys.
    pub expires_at: Option<DateTime<Utc>>,
    /// Identifier of the user who created the key.
    pub created_by: String,
}

impl ActivationKey {
    /// Creates an unused, unexpired key.
    pub fn new(
        key: impl Into<String>,
        created_by: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            key: key.into(),
            is_used: false,
            expired: false,
            expires_at,
            created_by: created_by.into(),
        }
    }

    /// Returns true if the key can still be validated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_used && !self.expired
    }

    /// Returns true if `expires_at` lies strictly before `now`.
    #[must_use]
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }
}

/// Fields written on every successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationFields {
    pub activated_at: DateTime<Utc>,
    pub last_check: DateTime<Utc>,
    pub first_val: f64,
    pub second_val: f64,
}

/// Binding of a key to one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyActivation {
    pub key: String,
    pub hwid: String,
    pub activated_at: DateTime<Utc>,
    pub last_check: DateTime<Utc>,
    pub first_val: f64,
    pub second_val: f64,
}

impl KeyActivation {
    /// Builds the row for `(key, hwid)` from the written fields.
    pub fn from_fields(key: impl Into<String>, hwid: impl Into<String>, fields: ActivationFields) -> Self {
        Self {
            key: key.into(),
            hwid: hwid.into(),
            activated_at: fields.activated_at,
            last_check: fields.last_check,
            first_val: fields.first_val,
            second_val: fields.second_val,
        }
    }
}

/// One entry of the usage log side channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub key: String,
    pub place_name: String,
    pub ip_address: String,
    pub used_at: DateTime<Utc>,
}

/// Remaining validity of a key.
///
/// Serializes as a JSON number of days, or the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysLeft {
    /// The key never expires.
    Unlimited,
    /// Whole days left, rounded up.
    Days(u32),
}

impl DaysLeft {
    /// Computes the remaining days for an optional expiration at `now`.
    ///
    /// Partial days round up; past expirations clamp to zero.
    #[must_use]
    pub fn until(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(expires_at) = expires_at else {
            return Self::Unlimited;
        };

        let remaining = expires_at - now;
        if remaining <= Duration::zero() {
            return Self::Days(0);
        }

        // Compare at full precision so any sub-day remainder rounds up.
        let whole = remaining.num_days();
        let days = if remaining > Duration::days(whole) { whole + 1 } else { whole };
        Self::Days(u32::try_from(days).unwrap_or(u32::MAX))
    }

    /// Returns the day count, or None for unlimited keys.
    #[must_use]
    pub fn days(&self) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::Days(d) => Some(*d),
        }
    }
}

impl Serialize for DaysLeft {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unlimited => serializer.serialize_str("unlimited"),
            Self::Days(d) => serializer.serialize_u32(*d),
        }
    }
}

impl<'de> Deserialize<'de> for DaysLeft {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Days(u32),
            Label(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Days(d) => Ok(Self::Days(d)),
            Raw::Label(s) if s == "unlimited" => Ok(Self::Unlimited),
            Raw::Label(s) => Err(serde::de::Error::custom(format!(
                "expected day count or \"unlimited\", got {s:?}"
            ))),
        }
    }
}
