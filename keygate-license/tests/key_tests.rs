mod common;

use chrono::Duration;
use common::fixed_now;
use keygate_license::{ActivationKey, DaysLeft};

// ── DaysLeft ─────────────────────────────────────────────────────

#[test]
fn no_expiry_is_unlimited() {
    assert_eq!(DaysLeft::until(None, fixed_now()), DaysLeft::Unlimited);
    assert_eq!(DaysLeft::Unlimited.days(), None);
}

#[test]
fn whole_days() {
    let exp = fixed_now() + Duration::days(10);
    assert_eq!(DaysLeft::until(Some(exp), fixed_now()), DaysLeft::Days(10));
}

#[test]
fn partial_day_rounds_up() {
    let exp = fixed_now() + Duration::seconds(1);
    assert_eq!(DaysLeft::until(Some(exp), fixed_now()), DaysLeft::Days(1));

    let exp = fixed_now() + Duration::days(9) + Duration::hours(23);
    assert_eq!(DaysLeft::until(Some(exp), fixed_now()), DaysLeft::Days(10));
}

#[test]
fn sub_millisecond_remainder_rounds_up() {
    let exp = fixed_now() + Duration::days(1) + Duration::microseconds(500);
    assert_eq!(DaysLeft::until(Some(exp), fixed_now()), DaysLeft::Days(2));

    let exp = fixed_now() + Duration::nanoseconds(500);
    assert_eq!(DaysLeft::until(Some(exp), fixed_now()), DaysLeft::Days(1));
}

#[test]
fn past_expiry_floors_at_zero() {
    let exp = fixed_now() - Duration::days(4);
    assert_eq!(DaysLeft::until(Some(exp), fixed_now()), DaysLeft::Days(0));
}

#[test]
fn days_left_serde() {
    assert_eq!(serde_json::to_string(&DaysLeft::Unlimited).unwrap(), r#""unlimited""#);
    assert_eq!(serde_json::to_string(&DaysLeft::Days(12)).unwrap(), "12");

    let parsed: DaysLeft = serde_json::from_str(r#""unlimited""#).unwrap();
    assert_eq!(parsed, DaysLeft::Unlimited);
    let parsed: DaysLeft = serde_json::from_str("7").unwrap();
    assert_eq!(parsed, DaysLeft::Days(7));
    assert!(serde_json::from_str::<DaysLeft>(r#""forever""#).is_err());
}

// ── ActivationKey ────────────────────────────────────────────────

#[test]
fn new_key_is_active() {
    let key = ActivationKey::new("K", "u", None);
    assert!(key.is_active());
    assert!(!key.is_past_expiry(fixed_now()));
}

#[test]
fn used_or_expired_key_is_inactive() {
    let mut key = ActivationKey::new("K", "u", None);
    key.is_used = true;
    assert!(!key.is_active());

    let mut key = ActivationKey::new("K", "u", None);
    key.expired = true;
    assert!(!key.is_active());
}

#[test]
fn past_expiry_is_strict() {
    let key = ActivationKey::new("K", "u", Some(fixed_now()));
    assert!(!key.is_past_expiry(fixed_now()));
    assert!(key.is_past_expiry(fixed_now() + Duration::milliseconds(1)));
}
