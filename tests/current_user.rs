use std::collections::HashMap;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use bearer_auth::{
    app::build_router,
    config::Config,
    db::Database,
    services::auth::{Claims, build_token_codec},
    state::AppState,
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

fn test_config() -> Config {
    // Nothing listens on port 1, so any request that gets as far as the
    // database fails to acquire a session.
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SECRET_KEY", SECRET),
        ("ALGORITHM", "HS256"),
        ("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
        ("DATABASE_HOSTNAME", "127.0.0.1"),
        ("DATABASE_PORT", "1"),
        ("DATABASE_USERNAME", "api"),
        ("DATABASE_PASSWORD", "secret"),
        ("DATABASE_NAME", "api"),
        ("DATABASE_MAX_CONNECTIONS", "1"),
        ("DATABASE_ACQUIRE_TIMEOUT_SECONDS", "1"),
    ]);
    Config::from_lookup(&|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

fn test_app() -> (Router, AppState) {
    let config = test_config();
    let state = AppState::new(
        Database::connect_lazy(&config.database),
        build_token_codec(&config).unwrap(),
    );
    (build_router(state.clone(), &config), state)
}

async fn get(app: Router, uri: &str, authorization: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(value) = authorization {
        request = request.header(header::AUTHORIZATION, value);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_bearer_challenge(response: &Response) {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn health_needs_no_credentials() {
    let (app, _) = test_app();

    let response = get(app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn missing_authorization_is_not_authenticated() {
    let (app, _) = test_app();

    let response = get(app, "/api/v1/users/me", None).await;

    assert_bearer_challenge(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_AUTHENTICATED");
    assert_eq!(body["error"]["message"], "Not authenticated");
}

#[tokio::test]
async fn non_bearer_scheme_is_not_authenticated() {
    let (app, _) = test_app();

    let response = get(app, "/api/v1/users/me", Some("Basic dXNlcjpwYXNz")).await;

    assert_bearer_challenge(&response);
    assert_eq!(body_json(response).await["error"]["code"], "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn malformed_token_is_invalid() {
    let (app, _) = test_app();

    let response = get(app, "/api/v1/users/me", Some("Bearer not.a.jwt")).await;

    assert_bearer_challenge(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid token:")
    );
}

#[tokio::test]
async fn expired_token_says_when_it_expired() {
    let (app, state) = test_app();
    let token = state
        .tokens()
        .issue_at(&Claims::for_user(1), Utc::now() - Duration::hours(3))
        .unwrap();

    let response = get(app, "/api/v1/users/me", Some(&format!("Bearer {token}"))).await;

    assert_bearer_challenge(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "TOKEN_EXPIRED");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Token expired at ")
    );
}

#[tokio::test]
async fn token_without_user_id_is_invalid() {
    let (app, state) = test_app();
    let token = state.tokens().issue(&json!({"scope": "read"})).unwrap();

    let response = get(app, "/api/v1/users/me", Some(&format!("Bearer {token}"))).await;

    assert_bearer_challenge(&response);
    assert_eq!(body_json(response).await["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn unreachable_database_is_an_internal_error() {
    let (app, state) = test_app();
    let token = state.tokens().issue_for_user(1).unwrap();

    let response = get(app, "/api/v1/users/me", Some(&format!("Bearer {token}"))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    assert_eq!(body_json(response).await["error"]["code"], "INTERNAL");
}

#[tokio::test]
async fn readiness_reports_database_down() {
    let (app, _) = test_app();

    let response = get(app, "/health/ready", None).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["database"], "down");
}
