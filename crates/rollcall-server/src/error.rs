//! HTTP mapping for domain errors.
//!
//! Handlers return [`ApiError`]; every error becomes a JSON body of the
//! form `{"error": "..."}`. Errors that could leak storage or crypto
//! internals are logged and replaced with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rollcall_auth::AuthError;
use rollcall_core::error::RollcallError;
use serde_json::json;
use tracing::error;

const REDACTED: &str = "internal server error";

#[derive(Debug)]
pub struct ApiError(pub RollcallError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RollcallError::Validation { .. } => StatusCode::BAD_REQUEST,
            RollcallError::Duplicate { .. } => StatusCode::CONFLICT,
            RollcallError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RollcallError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RollcallError::NotFound { .. } => StatusCode::NOT_FOUND,
            RollcallError::UpstreamUnavailable { .. }
            | RollcallError::Malformed { .. }
            | RollcallError::Database(_)
            | RollcallError::Crypto(_)
            | RollcallError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        if self.0.is_client_facing() {
            self.0.to_string()
        } else {
            REDACTED.to_string()
        }
    }
}

impl From<RollcallError> for ApiError {
    fn from(err: RollcallError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (RollcallError::validation("x"), StatusCode::BAD_REQUEST),
            (
                RollcallError::Duplicate {
                    fields: vec!["email".into()],
                },
                StatusCode::CONFLICT,
            ),
            (AuthError::TokenExpired.into(), StatusCode::UNAUTHORIZED),
            (
                AuthError::Forbidden("no".into()).into(),
                StatusCode::FORBIDDEN,
            ),
            (RollcallError::not_found("user", "1"), StatusCode::NOT_FOUND),
            (
                RollcallError::Database("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn internal_details_are_redacted() {
        let err = ApiError(RollcallError::Database("table user: connection reset".into()));
        assert_eq!(err.client_message(), "internal server error");

        let err = ApiError(RollcallError::UpstreamUnavailable {
            service: "roster".into(),
            reason: "status 503".into(),
        });
        assert!(err.client_message().contains("roster"));
    }
}
