use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use estate_portal::{
    AppConfig, AppState, DemoAccountDirectory, DirectoryState, KeyValueState, MemoryKeyValueStore,
    SessionStore, UserRoster, create_router,
    models::{ErrorBody, Identity, NavLink, UserProfile},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    fn spawn() -> Self {
        let session = Arc::new(SessionStore::new(
            Arc::new(MemoryKeyValueStore::new()) as KeyValueState,
            Arc::new(DemoAccountDirectory::without_latency()) as DirectoryState,
        ));
        let state = AppState::new(session, Arc::new(UserRoster::seeded()), AppConfig::default());

        TestApp {
            router: create_router(state),
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json_body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json_body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, T) {
        let (status, bytes) = self.send(method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn login(&self, email: &str) {
        let (status, _) = self
            .send(
                Method::POST,
                "/session/login",
                Some(json!({ "email": email, "password": "demo123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::spawn();

    let (status, body) = app.send(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::spawn();

    let (status, doc) = app
        .send_json::<Value>(Method::GET, "/api-docs/openapi.json", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/session/login"].is_object());
    assert!(doc["paths"]["/super-admin/users/{id}/role"].is_object());
}

#[tokio::test]
async fn test_session_lifecycle_over_http() {
    let app = TestApp::spawn();

    let (_, session) = app
        .send_json::<Option<Identity>>(Method::GET, "/session", None)
        .await;
    assert_eq!(session, None);

    app.login("visitor@demo.com").await;
    let (status, profile) = app.send_json::<UserProfile>(Method::GET, "/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile.name, "Demo Visitor");
    assert_eq!(profile.initials, "DV");

    let (status, _) = app.send(Method::POST, "/session/logout", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.send_json::<ErrorBody>(Method::GET, "/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.error, "authentication_required");
}

#[tokio::test]
async fn test_failed_login_over_http() {
    let app = TestApp::spawn();

    let (status, body) = app
        .send_json::<ErrorBody>(
            Method::POST,
            "/session/login",
            Some(json!({ "email": "Admin@Demo.com", "password": "demo123" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.error, "authentication_failed");
}

#[tokio::test]
async fn test_admin_routes_enforce_allow_lists() {
    let app = TestApp::spawn();

    let (status, _) = app.send(Method::GET, "/admin", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.login("agent@demo.com").await;
    let (status, body) = app.send_json::<ErrorBody>(Method::GET, "/admin", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body.current_role.map(|role| role.to_string()).as_deref(), Some("agent"));

    app.login("admin@demo.com").await;
    let (status, _) = app.send(Method::GET, "/admin", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::GET, "/super-admin/users", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.login("superadmin@demo.com").await;
    let (status, _) = app.send(Method::GET, "/super-admin/users", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_self_demotion_locks_super_admin_out() {
    let app = TestApp::spawn();
    app.login("superadmin@demo.com").await;

    let (status, response) = app
        .send_json::<Value>(
            Method::PUT,
            "/super-admin/users/4/role",
            Some(json!({ "role": "agent" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["applied_to_session"], json!(true));
    assert_eq!(response["user"]["role"], json!("agent"));

    let (status, _) = app.send(Method::GET, "/super-admin", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, links) = app.send_json::<Vec<NavLink>>(Method::GET, "/navigation", None).await;
    assert_eq!(links.len(), 5);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = TestApp::spawn();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}
