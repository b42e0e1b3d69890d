//! Challenge-response transform.
//!
//! The client sends two numbers with every check and applies the same
//! polynomials locally. A matching answer shows the "allow" reply went
//! through the server rather than being replayed or forged. This is an
//! obfuscation check, not a cryptographic one.

use serde::{Deserialize, Serialize, Serializer};

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A number as carried on the wire.
///
/// Integral values within the exact f64 range serialize as JSON integers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct Numeric(pub f64);

impl Numeric {
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Self(v)
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Self(v as f64)
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT_INT {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

/// The transformed pair returned to the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub new_first: Numeric,
    pub new_second: Numeric,
}

/// `3x² + 7x − 19`
#[must_use]
pub fn transform_first(x: f64) -> f64 {
    3.0 * x * x + 7.0 * x - 19.0
}

/// `5y³ − 11y + 42`
#[must_use]
pub fn transform_second(y: f64) -> f64 {
    5.0 * y * y * y - 11.0 * y + 42.0
}

/// Applies both transforms.
#[must_use]
pub fn respond(first_val: f64, second_val: f64) -> ChallengeResponse {
    ChallengeResponse {
        new_first: Numeric(transform_first(first_val)),
        new_second: Numeric(transform_second(second_val)),
    }
}
