//! Fire-and-forget usage logging.

use crate::key::UsageRecord;
use crate::store::UsageLog;
use chrono::Utc;
use tracing::{debug, warn};

/// Placeholder for absent place names and addresses.
pub const UNKNOWN: &str = "Unknown";

/// Builds a usage record stamped with the current time.
#[must_use]
pub fn usage_record(key: &str, place_name: Option<&str>, ip: Option<&str>) -> UsageRecord {
    UsageRecord {
        key: key.to_string(),
        place_name: place_name.filter(|s| !s.is_empty()).unwrap_or(UNKNOWN).to_string(),
        ip_address: ip.filter(|s| !s.is_empty()).unwrap_or(UNKNOWN).to_string(),
        used_at: Utc::now(),
    }
}

/// Records a usage entry. Failures are logged and never reach the caller.
pub fn log_usage<L: UsageLog + ?Sized>(sink: &L, key: &str, place_name: Option<&str>, ip: Option<&str>) {
    let record = usage_record(key, place_name, ip);
    match sink.record_usage(&record) {
        Ok(()) => debug!(place = %record.place_name, "usage recorded"),
        Err(e) => warn!(error = %e, "failed to record usage"),
    }
}
