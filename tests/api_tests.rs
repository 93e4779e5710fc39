use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use deskarr::api::AppState;
use deskarr::config::Config;
use deskarr::db::Store;
use deskarr::state::SharedState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Default admin account seeded by migration (must match m20260801_initial.rs)
const ADMIN_EMAIL: &str = "admin@deskarr.local";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to create store");
    let state = SharedState::with_store(config, store);

    deskarr::api::router(Arc::new(AppState {
        shared: Arc::new(state),
    }))
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn body_json(response: Response<axum::body::Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn register(app: &Router, email: &str, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "email": email, "name": name, "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/api/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/requests", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get("/api/requests", Some("not-a-real-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_seeded_admin_login_and_me() {
    let app = spawn_app().await;

    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(get("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["email"], json!(ADMIN_EMAIL));
    assert_eq!(body["data"]["role"], json!("admin"));
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_register_new_accounts_are_requestors() {
    let app = spawn_app().await;

    let token = register(&app, "alice@example.com", "Alice").await;

    let response = app
        .clone()
        .oneshot(get("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], json!("requestor"));

    // Same email again is a conflict
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "email": "alice@example.com", "name": "Alice Again", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_master_data_writes_require_admin() {
    let app = spawn_app().await;

    let requestor = register(&app, "bob@example.com", "Bob").await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let payload = json!({ "name": "IT Support" });

    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/departments", Some(&requestor), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/departments", Some(&admin), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Reads stay open to everyone authenticated
    let response = app
        .clone()
        .oneshot(get("/api/departments", Some(&requestor)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"][0]["name"], json!("IT Support"));
}

/// Seeds a department, service type, and request type as admin; returns
/// the request type id.
async fn seed_request_type(app: &Router, admin: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/departments",
            Some(admin),
            &json!({ "name": "Facilities" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let department_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/service-types",
            Some(admin),
            &json!({ "name": "General", "sequence": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let service_type_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/request-types",
            Some(admin),
            &json!({
                "name": "Repair",
                "sequence": 1,
                "service_type_id": service_type_id,
                "department_id": department_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_request_lifecycle_over_http() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let requestor = register(&app, "carol@example.com", "Carol").await;
    let request_type_id = seed_request_type(&app, &admin).await;

    // Create
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/requests",
            Some(&requestor),
            &json!({
                "request_type_id": request_type_id,
                "title": "Broken chair",
                "description": "The chair in room 4 lost a wheel.",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let request_id = body["data"]["id"].as_i64().unwrap();
    let request_no = body["data"]["request_no"].as_str().unwrap();
    assert!(request_no.starts_with("REQ-"));
    assert!(request_no.ends_with("-001"));
    assert_eq!(body["data"]["status_name"], json!("Open"));
    assert_eq!(body["data"]["priority"], json!("Medium"));

    // Reply
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/api/requests/{request_id}/replies"),
            Some(&requestor),
            &json!({ "body": "Any update on this?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Assignment is hod/admin only
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/api/requests/{request_id}/assign"),
            Some(&requestor),
            &json!({ "technician_id": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/api/requests/{request_id}/assign"),
            Some(&admin),
            &json!({ "technician_id": 1, "note": "Take a look today" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["assignee"]["id"], json!(1));
    assert_eq!(body["data"]["assigned_note"], json!("Take a look today"));

    // Status change as admin
    let response = app
        .clone()
        .oneshot(get("/api/statuses", Some(&admin)))
        .await
        .unwrap();
    let statuses = body_json(response).await;
    let resolved_id = statuses["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["system_name"] == json!("resolved"))
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/requests/{request_id}/status"),
            Some(&admin),
            &json!({ "status_id": resolved_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["status_name"], json!("Resolved"));

    // Detail now shows the whole thread
    let response = app
        .clone()
        .oneshot(get(&format!("/api/requests/{request_id}"), Some(&requestor)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let replies = body["data"]["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 3);
}

/// Resolves the calling user's id via /auth/me.
async fn user_id(app: &Router, token: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(get("/api/auth/me", Some(token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_approval_decisions_over_http() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let requestor = register(&app, "erin@example.com", "Erin").await;
    let request_type_id = seed_request_type(&app, &admin).await;

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/requests",
            Some(&requestor),
            &json!({
                "request_type_id": request_type_id,
                "title": "New monitor",
                "description": "Second screen for the finance desk.",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Deciding is hod/admin only
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/requests/{request_id}/approval"),
            Some(&requestor),
            &json!({ "decision": "Approved" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/requests/{request_id}/approval"),
            Some(&admin),
            &json!({ "decision": "Approved", "note": "Within budget" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["approval_status"], json!("Approved"));
    assert_eq!(body["data"]["approval_by"]["id"], json!(1));
    assert_eq!(body["data"]["approval_note"], json!("Within budget"));
    assert!(body["data"]["approval_at"].is_string());
}

#[tokio::test]
async fn test_admin_assigns_roles() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let frank = register(&app, "frank@example.com", "Frank").await;
    let frank_id = user_id(&app, &frank).await;

    // Only admins may change roles
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/profiles/{frank_id}/role"),
            Some(&frank),
            &json!({ "role": "admin" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/profiles/{frank_id}/role"),
            Some(&admin),
            &json!({ "role": "technician" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The new role takes effect on the next authenticated call
    let response = app
        .clone()
        .oneshot(get("/api/auth/me", Some(&frank)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], json!("technician"));

    // Unknown users are a 404, not a silent insert
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/profiles/9999/role",
            Some(&admin),
            &json!({ "role": "hod" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_staffing_rows_can_be_edited() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let grace = register(&app, "grace@example.com", "Grace").await;
    let grace_id = user_id(&app, &grace).await;
    let request_type_id = seed_request_type(&app, &admin).await;

    let response = app
        .clone()
        .oneshot(get("/api/departments", Some(&admin)))
        .await
        .unwrap();
    let department_id = body_json(response).await["data"][0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/department-persons",
            Some(&admin),
            &json!({
                "department_id": department_id,
                "user_id": grace_id,
                "from_date": "2026-01-01T00:00:00Z",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let person_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["is_hod"], json!(false));

    // Promote the row in place instead of delete-and-recreate
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/department-persons/{person_id}"),
            Some(&admin),
            &json!({
                "department_id": department_id,
                "user_id": grace_id,
                "is_hod": true,
                "from_date": "2026-01-01T00:00:00Z",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_hod"], json!(true));

    // Mutations stay admin-gated
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/department-persons/{person_id}"),
            Some(&grace),
            &json!({
                "department_id": department_id,
                "user_id": grace_id,
                "from_date": "2026-01-01T00:00:00Z",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Roster rows for a request type are editable the same way
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/type-persons",
            Some(&admin),
            &json!({ "request_type_id": request_type_id, "user_id": grace_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let roster_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/type-persons/{roster_id}"),
            Some(&admin),
            &json!({
                "request_type_id": request_type_id,
                "user_id": grace_id,
                "description": "Primary contact",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["description"], json!("Primary contact"));

    // Editing a missing row is a 404
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/type-persons/9999",
            Some(&admin),
            &json!({ "request_type_id": request_type_id, "user_id": grace_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_request_is_404() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(get("/api/requests/9999", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analytics_gate_and_export() {
    let app = spawn_app().await;

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let requestor = register(&app, "dave@example.com", "Dave").await;

    let response = app
        .clone()
        .oneshot(get("/api/analytics/stats", Some(&requestor)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get("/api/analytics/stats", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["total_requests"], json!(0));
    assert_eq!(body["data"]["avg_resolution_hours"], json!(0.0));

    let response = app
        .clone()
        .oneshot(get("/api/analytics/export", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("Request No,Title,Date,Status,Priority,Department,Requester"));
}

#[tokio::test]
async fn test_analytics_rejects_malformed_range() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(get("/api/analytics/stats?from=yesterday", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
