//! Black-box API tests: the full router over the in-memory store, driven with `oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use school_registry::{app, AppState, JwtIssuer, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn router() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(JwtIssuer::new("test-secret", 1)))
        .expect("standard gateway registers");
    app(state, 64 * 1024)
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_school(router: &Router, name: &str) -> String {
    let (status, body) = call(
        router,
        Method::POST,
        "/api/schools",
        Some(json!({"name": name, "address": "1 Main St"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["school"]["id"].as_str().unwrap().to_string()
}

async fn create_classroom(router: &Router, school_id: &str) -> String {
    let (status, body) = call(
        router,
        Method::POST,
        "/api/classrooms",
        Some(json!({"name": "Room A", "capacity": 25, "school": school_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["classroom"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = call(&router(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn ready_reports_store() {
    let (status, body) = call(&router(), Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], json!("ok"));
}

#[tokio::test]
async fn create_school_returns_created_envelope() {
    let router = router();
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/schools",
        Some(json!({"name": "Lincoln High", "address": "1 Main St"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["code"], json!(201));
    assert_eq!(body["data"]["school"]["name"], json!("Lincoln High"));
    assert!(body["data"]["school"]["id"].is_string());
    assert!(body.get("errors").is_none());

    let (status, body) = call(&router, Method::GET, "/api/schools", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["schools"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_school_name_is_rejected() {
    let router = router();
    create_school(&router, "Lincoln High").await;
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/schools",
        Some(json!({"name": "Lincoln High", "address": "elsewhere"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn invalid_school_payload_is_400_with_errors() {
    let (status, body) = call(&router(), Method::POST, "/api/schools", Some(json!({"address": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
    assert!(!body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_enveloped() {
    let router = router();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/schools")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["code"], json!(400));
}

#[tokio::test]
async fn update_classroom_capacity_preserves_name() {
    let router = router();
    let school_id = create_school(&router, "Lincoln High").await;
    let room_id = create_classroom(&router, &school_id).await;

    let (status, body) = call(
        &router,
        Method::PUT,
        &format!("/api/classrooms/{room_id}"),
        Some(json!({"capacity": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["classroom"]["name"], json!("Room A"));
    assert_eq!(body["data"]["classroom"]["capacity"], json!(30));
    assert_eq!(body["data"]["classroom"]["schoolId"], json!(school_id));

    let (_, body) = call(&router, Method::GET, &format!("/api/classrooms/school/{school_id}"), None).await;
    assert_eq!(body["data"]["classrooms"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn student_lifecycle() {
    let router = router();
    let school_id = create_school(&router, "Lincoln High").await;
    let room_id = create_classroom(&router, &school_id).await;

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/students",
        Some(json!({"name": "Ann", "age": 9, "classroom": room_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let student_id = body["data"]["student"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["student"]["classroomId"], json!(room_id));

    let (_, body) = call(&router, Method::GET, &format!("/api/students/classroom/{room_id}"), None).await;
    assert_eq!(body["data"]["students"].as_array().unwrap().len(), 1);

    // classroom with students cannot be removed
    let (status, _) = call(&router, Method::DELETE, &format!("/api/classrooms/{room_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&router, Method::DELETE, &format!("/api/students/{student_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Student successfully deleted."));

    let (status, _) = call(&router, Method::DELETE, &format!("/api/classrooms/{room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_unknown_student_is_not_found_message() {
    let (status, body) = call(&router(), Method::DELETE, "/api/students/unknown-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["errors"], json!(["Student not found."]));
}

#[tokio::test]
async fn register_then_login() {
    let router = router();
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/register",
        Some(json!({"username": "testuser", "email": "test@example.com", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["role"], json!("superadmin"));
    assert!(body["data"]["longToken"].is_string());
    assert!(body["data"]["user"].get("password").is_none());

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/login",
        Some(json!({"email": "test@example.com", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], json!("testuser"));

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/login",
        Some(json!({"email": "nobody@example.com", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["Invalid email or password"]));
}

#[tokio::test]
async fn dispatch_runs_exposed_function() {
    let (status, body) = call(
        &router(),
        Method::POST,
        "/api/user/createUser",
        Some(json!({"username": "dynamic", "email": "dyn@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["username"], json!("dynamic"));
}

#[tokio::test]
async fn dispatch_rejects_unexposed_function() {
    let router = router();
    let (status, body) = call(&router, Method::POST, "/api/user/login", Some(json!({"email": "a@b.co"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn dispatch_unknown_module_is_404() {
    let (status, body) = call(&router(), Method::GET, "/api/nope/anything", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn unmatched_route_is_enveloped_404() {
    let (status, body) = call(&router(), Method::GET, "/nowhere/at/all", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"], json!(["route not found"]));
}

#[tokio::test]
async fn unserved_method_on_known_path_is_enveloped_405() {
    let router = router();
    for (method, uri) in [
        (Method::GET, "/api/classrooms"),
        (Method::PATCH, "/api/schools/abc"),
        (Method::GET, "/api/students/abc"),
        (Method::GET, "/api/auth/register"),
        (Method::POST, "/health"),
    ] {
        let (status, body) = call(&router, method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(body["ok"], json!(false), "{method} {uri}");
        assert_eq!(body["code"], json!(405));
        assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()), "{method} {uri}");
    }
}

#[tokio::test]
async fn entity_reads_are_not_reachable_through_dispatch() {
    let (status, body) = call(&router(), Method::GET, "/api/school/getAllSchools", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn register_accepts_form_body() {
    let router = router();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("username=formuser&email=form%40example.com&role=schooladmin"))
        .unwrap();
    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["data"]["user"]["username"], json!("formuser"));
    assert_eq!(body["data"]["user"]["email"], json!("form@example.com"));
    assert_eq!(body["data"]["user"]["role"], json!("schooladmin"));
}
