#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use edunexia::cli::seeder::seed_access_control;
use edunexia::router::init_router;
use edunexia::state::AppState;
use edunexia_models::{RoleId, RoleScope, UserId};

pub const TEST_PASSWORD: &str = "testpass123";

pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub password: String,
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(AppState::for_tests(pool))
}

/// Catalog and system roles.
pub async fn seed(pool: &PgPool) {
    seed_access_control(pool).await.unwrap();
}

pub fn generate_unique_email() -> String {
    format!("test-{}@edunexia.test", Uuid::new_v4())
}

pub fn generate_unique_role_name() -> String {
    format!("Perfil {}", Uuid::new_v4())
}

pub async fn create_test_user(pool: &PgPool, role_id: Option<RoleId>) -> TestUser {
    let email = generate_unique_email();
    // Low cost keeps the suite fast
    let hashed = bcrypt::hash(TEST_PASSWORD, 4).unwrap();

    let id: UserId = sqlx::query_scalar(
        "INSERT INTO users (full_name, email, password, role_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Test User")
    .bind(&email)
    .bind(hashed)
    .bind(role_id)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        password: TEST_PASSWORD.to_string(),
    }
}

/// Inserts a custom role linked to the named permissions.
pub async fn create_custom_role(pool: &PgPool, name: &str, permissions: &[&str]) -> RoleId {
    let role_id: RoleId = sqlx::query_scalar(
        "INSERT INTO roles (name, description, scope, is_system) VALUES ($1, $2, $3, false) RETURNING id",
    )
    .bind(name)
    .bind("Perfil criado em teste")
    .bind(RoleScope::Institution)
    .fetch_one(pool)
    .await
    .unwrap();

    for permission in permissions {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) SELECT $1, id FROM permissions WHERE name = $2",
        )
        .bind(role_id)
        .bind(*permission)
        .execute(pool)
        .await
        .unwrap();
    }

    role_id
}

pub async fn get_permission_id(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar("SELECT id FROM permissions WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "Non-JSON response. Status: {}, Body: {:?}",
                status,
                String::from_utf8_lossy(&bytes)
            )
        })
    };

    (status, body)
}

pub async fn get_auth_token(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;

    body["accessToken"]
        .as_str()
        .unwrap_or_else(|| panic!("No accessToken in response. Status: {}, Body: {}", status, body))
        .to_string()
}

/// Logs in a fresh user holding `role_id`.
pub async fn login_as(app: &Router, pool: &PgPool, role_id: RoleId) -> String {
    let user = create_test_user(pool, Some(role_id)).await;
    get_auth_token(app, &user.email, &user.password).await
}
