//! Request extractors: bearer token claims and JSON bodies.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use rollcall_auth::{AuthError, ValidatedClaims};
use rollcall_core::error::RollcallError;
use rollcall_core::repository::UserRepository;

use crate::error::ApiError;
use crate::state::AppState;

/// Verified claims of the caller, taken from `Authorization: Bearer <token>`.
pub struct Caller(pub ValidatedClaims);

impl<R> FromRequestParts<AppState<R>> for Caller
where
    R: UserRepository + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = state.auth.verify_token(token)?;
        Ok(Caller(claims))
    }
}

/// JSON request body whose rejections use the `{"error": ...}` shape with
/// status 400.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError(RollcallError::validation(rejection.body_text()))),
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/users/profile");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn parses_bearer_scheme() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts(Some("bearer  abc "))), Some("abc"));
    }

    #[test]
    fn rejects_missing_or_foreign_schemes() {
        assert_eq!(bearer_token(&parts(None)), None);
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcg=="))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer   "))), None);
    }
}
