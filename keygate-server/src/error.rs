//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use keygate_license::LicenseError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error body returned for every failed request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// Errors produced by the API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// A validation failure from the license core.
    License(LicenseError),
    /// The body was not valid JSON for the endpoint.
    BadRequest(String),
}

impl ApiError {
    /// Status code the error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::License(err) => match err {
                LicenseError::MissingFields(_) => StatusCode::BAD_REQUEST,
                LicenseError::InvalidKey => StatusCode::UNAUTHORIZED,
                LicenseError::KeyExpired | LicenseError::DeviceMismatch => StatusCode::FORBIDDEN,
                LicenseError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                LicenseError::ActivationPersist(_) | LicenseError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::BadRequest(msg) => ErrorBody {
                error: format!("invalid request body: {msg}"),
                code: "bad_request".to_string(),
            },
            Self::License(err) => {
                // Store details stay in the server log.
                let error = match err {
                    LicenseError::ActivationPersist(_) => "failed to record activation".to_string(),
                    LicenseError::StoreUnavailable(_) => "store unavailable".to_string(),
                    LicenseError::Internal(_) => "internal server error".to_string(),
                    other => other.to_string(),
                };
                ErrorBody {
                    error,
                    code: err.code().to_string(),
                }
            }
        }
    }
}

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        Self::License(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            if let Self::License(err) = &self {
                error!(error = %err, "request failed");
            }
        }
        (status, Json(self.body())).into_response()
    }
}
