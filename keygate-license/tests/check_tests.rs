mod common;

use common::{fixed_now, key_expiring_in, seeded_store, validator_for};
use keygate_license::{check_at, CheckRequest, DaysLeft, LicenseError, Numeric, STATUS_ALLOW};
use pretty_assertions::assert_eq;

// ── Presence checks ──────────────────────────────────────────────

#[test]
fn zero_values_are_present() {
    let req = CheckRequest::new("H1", "K", 0.0, 0.0);
    let validated = req.require().unwrap();
    assert_eq!(validated.first_val, 0.0);
    assert_eq!(validated.second_val, 0.0);
}

#[test]
fn absent_values_are_missing() {
    let req: CheckRequest = serde_json::from_str(r#"{"hwid":"H1","key":"K"}"#).unwrap();
    match req.require().unwrap_err() {
        LicenseError::MissingFields(fields) => assert_eq!(fields, "first_val, second_val"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_strings_are_missing() {
    let req = CheckRequest::new("", "", 1.0, 1.0);
    match req.require().unwrap_err() {
        LicenseError::MissingFields(fields) => assert_eq!(fields, "hwid, key"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn null_fields_are_missing() {
    let req: CheckRequest =
        serde_json::from_str(r#"{"hwid":"H1","key":"K","first_val":null,"second_val":0}"#)
            .unwrap();
    assert!(matches!(req.require(), Err(LicenseError::MissingFields(_))));
}

#[test]
fn missing_fields_never_touch_store() {
    let store = seeded_store();
    store.fail_writes(true);
    let req = CheckRequest {
        key: Some("UNLIMITED".into()),
        ..CheckRequest::default()
    };
    let err = check_at(&validator_for(&store), &req, fixed_now()).unwrap_err();
    assert!(matches!(err, LicenseError::MissingFields(_)));
    assert!(store.activations_for("UNLIMITED").is_empty());
}

// ── Combined response ────────────────────────────────────────────

#[test]
fn developer_key_end_to_end() {
    let store = seeded_store();
    store.insert_key(key_expiring_in("ABC123", "dev-user", 10)).unwrap();
    store.set_user_level("dev-user", 3).unwrap();

    let req = CheckRequest::new("DEV1", "ABC123", 1.0, 1.0);
    let resp = check_at(&validator_for(&store), &req, fixed_now()).unwrap();

    assert_eq!(resp.status, STATUS_ALLOW);
    assert_eq!(resp.newfirst_val, Numeric(-9.0));
    assert_eq!(resp.newsecond_val, Numeric(36.0));
    assert_eq!(resp.days, DaysLeft::Days(10));
    assert!(resp.is_dev);
}

#[test]
fn response_json_shape() {
    let store = seeded_store();
    let req = CheckRequest::new("H1", "UNLIMITED", 2.0, 2.0);
    let resp = check_at(&validator_for(&store), &req, fixed_now()).unwrap();

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "status": "allow",
            "newfirst_val": 7,
            "newsecond_val": 60,
            "days": "unlimited",
            "is_dev": false
        })
    );
}

#[test]
fn failure_has_no_challenge() {
    let store = seeded_store();
    let v = validator_for(&store);
    check_at(&v, &CheckRequest::new("H1", "UNLIMITED", 1.0, 1.0), fixed_now()).unwrap();

    let result = check_at(&v, &CheckRequest::new("H2", "UNLIMITED", 1.0, 1.0), fixed_now());
    assert!(matches!(result, Err(LicenseError::DeviceMismatch)));
}

#[test]
fn unreadable_store_has_no_challenge() {
    let store = seeded_store();
    store.fail_reads(true);

    let result = check_at(
        &validator_for(&store),
        &CheckRequest::new("H1", "UNLIMITED", 1.0, 1.0),
        fixed_now(),
    );
    assert!(matches!(result, Err(LicenseError::StoreUnavailable(_))));
}
