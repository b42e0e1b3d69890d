use axum::{http::StatusCode, response::IntoResponse};
use keygate_license::LicenseError;
use keygate_server::ApiError;

fn status_of(err: LicenseError) -> StatusCode {
    ApiError::from(err).status()
}

#[test]
fn rejection_statuses() {
    assert_eq!(status_of(LicenseError::MissingFields("key".into())), StatusCode::BAD_REQUEST);
    assert_eq!(status_of(LicenseError::InvalidKey), StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(LicenseError::KeyExpired), StatusCode::FORBIDDEN);
    assert_eq!(status_of(LicenseError::DeviceMismatch), StatusCode::FORBIDDEN);
}

#[test]
fn fault_statuses() {
    assert_eq!(
        status_of(LicenseError::StoreUnavailable("down".into())),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        status_of(LicenseError::ActivationPersist("locked".into())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_of(LicenseError::Internal("boom".into())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn bad_request_status() {
    let resp = ApiError::BadRequest("expected value".into()).into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
