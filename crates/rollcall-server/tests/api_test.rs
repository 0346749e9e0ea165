//! End-to-end tests of the HTTP surface over in-memory SurrealDB.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use rollcall_auth::{AuthConfig, AuthService};
use rollcall_db::SurrealUserRepository;
use rollcall_server::{AppState, router};
use rollcall_sync::{
    Notifier, RosterRecord, RosterSource, SyncConfig, SyncEngine, SyncError, WelcomeNotification,
};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tower::ServiceExt;
use url::Url;

#[derive(Default)]
struct FakeRoster {
    records: Mutex<Vec<RosterRecord>>,
    unavailable: Mutex<bool>,
}

#[async_trait]
impl RosterSource for FakeRoster {
    async fn fetch_roster(&self) -> Result<Vec<RosterRecord>, SyncError> {
        if *self.unavailable.lock() {
            return Err(SyncError::Transport {
                service: "roster",
                reason: "connection refused".into(),
            });
        }
        Ok(self.records.lock().clone())
    }
}

#[derive(Default)]
struct FakeNotifier {
    sent: Mutex<Vec<WelcomeNotification>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_welcome(&self, notification: &WelcomeNotification) -> Result<(), SyncError> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

struct TestApp {
    app: Router,
    roster: Arc<FakeRoster>,
    notifier: Arc<FakeNotifier>,
}

async fn test_app() -> TestApp {
    let db: Surreal<Db> = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    rollcall_db::run_migrations(&db).await.unwrap();
    let repo = SurrealUserRepository::new(db);

    let auth_config = AuthConfig {
        jwt_secret: "api-test-secret-that-is-long-enough!!".into(),
        ..AuthConfig::default()
    };
    let sync_config = SyncConfig::new(
        Url::parse("http://core.invalid").unwrap(),
        "key".into(),
        Url::parse("http://notify.invalid").unwrap(),
    );

    let roster = Arc::new(FakeRoster::default());
    let notifier = Arc::new(FakeNotifier::default());
    let sync = SyncEngine::new(
        repo.clone(),
        roster.clone(),
        notifier.clone(),
        &auth_config,
        &sync_config,
    );
    let auth = AuthService::new(repo, auth_config);

    TestApp {
        app: router(AppState::new(auth, sync)),
        roster,
        notifier,
    }
}

impl TestApp {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn register(&self, email: &str, role: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "name": "Test User",
                    "email": email,
                    "password": "correct-horse-battery",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["user"].clone()
    }

    async fn login(&self, key: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "credentialKey": key, "password": "correct-horse-battery" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_check() {
    let app = test_app().await;
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn register_returns_user_without_password_and_rejects_duplicates() {
    let app = test_app().await;
    let user = app.register("ana@example.com", "student").await;
    assert_eq!(user["email"], "ana@example.com");
    assert_eq!(user["role"], "student");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Other",
                "email": "ANA@example.com",
                "password": "another-long-password",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn malformed_bodies_are_json_bad_requests() {
    let app = test_app().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "name": "Eve",
                "email": "eve@example.com",
                "password": "correct-horse-battery",
                "role": "superuser",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("superuser"), "{body}");

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "eve@example.com", "password": "correct-horse-battery" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"), "{body}");

    // Missing content type is rejected the same way.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_failures_are_uniform() {
    let app = test_app().await;
    app.register("ana@example.com", "student").await;

    let (wrong_status, wrong) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "credentialKey": "ana@example.com", "password": "nope-nope-nope" })),
        )
        .await;
    let (unknown_status, unknown) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "credentialKey": "ghost@example.com", "password": "nope-nope-nope" })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn profile_requires_a_valid_token() {
    let app = test_app().await;
    app.register("ana@example.com", "student").await;

    let (status, body) = app.call(Method::GET, "/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("missing"));

    let (status, body) = app
        .call(Method::GET, "/users/profile", Some("not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("invalid token"));

    let token = app.login("ana@example.com").await;
    let (status, body) = app
        .call(Method::GET, "/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert_eq!(body["role"], "student");
}

#[tokio::test]
async fn students_manage_only_their_own_account() {
    let app = test_app().await;
    let ana = app.register("ana@example.com", "student").await;
    let bob = app.register("bob@example.com", "student").await;
    let token = app.login("ana@example.com").await;

    let bob_uri = format!("/users/{}", bob["id"].as_str().unwrap());
    let (status, _) = app
        .call(Method::PUT, &bob_uri, Some(&token), Some(json!({ "name": "Hacked" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let ana_uri = format!("/users/{}", ana["id"].as_str().unwrap());
    let (status, _) = app
        .call(Method::PUT, &ana_uri, Some(&token), Some(json!({ "role": "admin" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "students cannot promote themselves");

    let (status, body) = app
        .call(Method::PUT, &ana_uri, Some(&token), Some(json!({ "name": "Ana B." })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ana B.");

    let (status, _) = app.call(Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_lists_and_soft_deletes() {
    let app = test_app().await;
    let ana = app.register("ana@example.com", "student").await;
    app.register("root@example.com", "admin").await;
    let admin = app.login("root@example.com").await;

    let (status, body) = app.call(Method::GET, "/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let ana_uri = format!("/users/{}", ana["id"].as_str().unwrap());
    let (status, body) = app.call(Method::DELETE, &ana_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["lifecycleState"], "inactive");

    // Already inactive: looks absent.
    let (status, _) = app.call(Method::DELETE, &ana_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "credentialKey": "ana@example.com", "password": "correct-horse-battery" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sync_is_staff_only_and_returns_summary() {
    let app = test_app().await;
    app.register("ana@example.com", "student").await;
    app.register("sec@example.com", "secretary").await;
    *app.roster.records.lock() = vec![RosterRecord {
        full_name: Some("Luis Gómez".into()),
        email: Some("luis@example.com".into()),
        national_id: Some("200".into()),
        external_id: Some("c-200".into()),
        role: None,
    }];

    let student = app.login("ana@example.com").await;
    let (status, _) = app.call(Method::POST, "/users/sync", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.notifier.sent.lock().is_empty());

    let secretary = app.login("sec@example.com").await;
    let (status, body) = app
        .call(Method::POST, "/users/sync", Some(&secretary), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["summary"]["created"], 1);
    assert_eq!(body["summary"]["total"], 1);
    assert_eq!(app.notifier.sent.lock().len(), 1);

    // The synced student can log in with the mailed password.
    let temp = app.notifier.sent.lock()[0].temporary_password.clone();
    let (status, _) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "credentialKey": "200", "password": temp })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn sync_with_unreachable_roster_is_a_server_error() {
    let app = test_app().await;
    app.register("root@example.com", "admin").await;
    *app.roster.unavailable.lock() = true;
    let admin = app.login("root@example.com").await;

    let (status, body) = app.call(Method::POST, "/users/sync", Some(&admin), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("roster"));
}
