//! Validator behavior against the SQLite store.

use chrono::{Duration, Utc};
use keygate_db::SqliteKeyStore;
use keygate_license::{check, ActivationKey, CheckRequest, DaysLeft, LicenseError, Numeric, Validator};
use std::sync::Arc;

fn setup() -> (Arc<SqliteKeyStore>, Validator<SqliteKeyStore>) {
    let store = Arc::new(SqliteKeyStore::open_in_memory().unwrap());
    let validator = Validator::new(Arc::clone(&store));
    (store, validator)
}

#[test]
fn developer_key_scenario() {
    let (store, validator) = setup();
    let exp = Utc::now() + Duration::days(10);
    store.insert_key(&ActivationKey::new("ABC123", "dev", Some(exp))).unwrap();
    store.set_user_level("dev", 3).unwrap();

    let resp = check(&validator, &CheckRequest::new("DEV1", "ABC123", 1.0, 1.0)).unwrap();
    assert_eq!(resp.newfirst_val, Numeric(-9.0));
    assert_eq!(resp.newsecond_val, Numeric(36.0));
    assert_eq!(resp.days, DaysLeft::Days(10));
    assert!(resp.is_dev);

    let rows = store.activations_for("ABC123").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].hwid, "DEV1");
}

#[test]
fn binding_holds_across_checks() {
    let (store, validator) = setup();
    store.insert_key(&ActivationKey::new("K", "o", None)).unwrap();

    validator.validate("K", "H1", 0.0, 0.0).unwrap();
    let first = store.activations_for("K").unwrap()[0].last_check;
    validator.validate("K", "H1", 0.0, 0.0).unwrap();
    let second = store.activations_for("K").unwrap()[0].last_check;
    assert!(second >= first);

    let err = validator.validate("K", "H2", 0.0, 0.0).unwrap_err();
    assert!(matches!(err, LicenseError::DeviceMismatch));
    assert_eq!(store.activations_for("K").unwrap().len(), 1);
}

#[test]
fn expired_key_is_flagged() {
    let (store, validator) = setup();
    let exp = Utc::now() - Duration::days(1);
    store.insert_key(&ActivationKey::new("K", "o", Some(exp))).unwrap();

    let err = validator.validate("K", "H1", 1.0, 1.0).unwrap_err();
    assert!(matches!(err, LicenseError::KeyExpired));
    assert!(store.find_key("K").unwrap().unwrap().expired);

    let err = validator.validate("K", "H1", 1.0, 1.0).unwrap_err();
    assert!(matches!(err, LicenseError::InvalidKey));
}

#[test]
fn corrupt_row_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.db");
    let store = Arc::new(SqliteKeyStore::open(&path).unwrap());
    store.insert_key(&ActivationKey::new("K", "o", None)).unwrap();

    let raw = rusqlite::Connection::open(&path).unwrap();
    raw.execute(
        "UPDATE activation_keys SET expires_at = 'not-a-date' WHERE key = 'K'",
        [],
    )
    .unwrap();
    drop(raw);

    let err = Validator::new(Arc::clone(&store))
        .validate("K", "H1", 1.0, 1.0)
        .unwrap_err();
    assert!(matches!(err, LicenseError::Internal(_)));
    assert!(err.is_retryable());
    assert!(store.activations_for("K").unwrap().is_empty());
}
