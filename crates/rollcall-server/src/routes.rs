//! HTTP routes.

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use rollcall_auth::policy;
use rollcall_auth::{LoginInput, RegisterInput};
use rollcall_core::models::user::UpdateUser;
use rollcall_core::repository::UserRepository;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiResult;
use crate::extract::{Caller, JsonBody};
use crate::state::AppState;

/// Build the application router over the given state.
pub fn router<R>(state: AppState<R>) -> Router
where
    R: UserRepository + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register::<R>))
        .route("/auth/login", post(login::<R>))
        .route("/users", get(list_users::<R>))
        .route("/users/profile", get(profile::<R>))
        .route("/users/sync", post(sync_roster::<R>))
        .route("/users/{id}", put(update_user::<R>).delete(delete_user::<R>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn register<R: UserRepository + 'static>(
    State(state): State<AppState<R>>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

async fn login<R: UserRepository + 'static>(
    State(state): State<AppState<R>>,
    JsonBody(input): JsonBody<LoginInput>,
) -> ApiResult<Json<Value>> {
    let output = state.auth.login(input).await?;
    Ok(Json(json!({
        "token": output.access_token,
        "expiresIn": output.expires_in,
        "user": output.user,
    })))
}

async fn profile<R: UserRepository + 'static>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
) -> ApiResult<Json<Value>> {
    let user = state.auth.profile(&caller).await?;
    Ok(Json(json!({ "role": user.role, "user": user })))
}

async fn list_users<R: UserRepository + 'static>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
) -> ApiResult<Json<Value>> {
    let users = state.auth.list_users(&caller).await?;
    Ok(Json(json!({ "users": users })))
}

async fn update_user<R: UserRepository + 'static>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<UpdateUser>,
) -> ApiResult<Json<Value>> {
    let user = state.auth.update_user(&caller, &id, update).await?;
    Ok(Json(json!({ "user": user })))
}

async fn delete_user<R: UserRepository + 'static>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = state.auth.delete_user(&caller, &id).await?;
    Ok(Json(json!({ "user": user })))
}

async fn sync_roster<R: UserRepository + 'static>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
) -> ApiResult<Json<Value>> {
    policy::require_staff(&caller)?;
    info!(actor = %caller.user_id(), "Roster sync requested");
    let summary = state.sync.run().await?;
    Ok(Json(json!({ "summary": summary })))
}
