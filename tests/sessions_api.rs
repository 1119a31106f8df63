use std::io::{Cursor, Write};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::Router;
use serde_json::{Value, json};
use tower::ServiceExt;
use zeroize::Zeroizing;

use session_desk::{
    archive,
    config::Config,
    repositories::memory::MemorySessionBackend,
    routes::build_router,
    state::AppState,
};

const PASSWORD: &str = "hunter2";
const BOUNDARY: &str = "session-desk-test-boundary";

struct TestApp {
    router: Router,
    cookie: String,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_cron_secret(None).await
    }

    async fn with_cron_secret(cron_secret: Option<&str>) -> Self {
        let config = Config {
            app_password: Some(Zeroizing::new(PASSWORD.to_string())),
            cron_secret: cron_secret.map(|s| Zeroizing::new(s.to_string())),
            ..Config::default()
        };
        let state = AppState::with_backend(Arc::new(MemorySessionBackend::new()), config);
        let router = build_router(state);

        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/auth/login", json!({ "password": PASSWORD })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .expect("login sets the auth cookie")
            .to_string();
        assert!(cookie.starts_with("auth-session="));

        Self { router, cookie }
    }

    async fn send(&self, mut request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
        request
            .headers_mut()
            .insert(header::COOKIE, self.cookie.parse().unwrap());
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        (status, body, headers)
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body, _) = self.send(request).await;
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    async fn create(&self, name: &str, variable: &str) -> Value {
        let (status, body) = self
            .send_json(json_request(
                "POST",
                "/api/sessions",
                json!({ "name": name, "variable": variable }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    async fn list(&self) -> Vec<Value> {
        let (status, body) = self.send_json(empty_request("GET", "/api/sessions")).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().clone()
    }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn multipart_request(uri: &str, file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn zip_with_data(content: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(archive::DATA_ENTRY, zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn requests_without_cookie_are_rejected() {
    let app = TestApp::new().await;
    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/sessions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_cookie_is_rejected() {
    let app = TestApp::new().await;
    let mut request = empty_request("GET", "/api/sessions");
    request
        .headers_mut()
        .insert(header::COOKIE, "auth-session=authenticated".parse().unwrap());
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_checks_the_password() {
    let app = TestApp::new().await;

    let wrong = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/auth/login", json!({ "password": "nope" })))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let missing = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/auth/login", json!({})))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_starts_available() {
    let app = TestApp::new().await;
    let session = app.create("alpha", "secret-token-123").await;

    assert_eq!(session["name"], "alpha");
    assert_eq!(session["variable"], "secret-token-123");
    assert_eq!(session["status"], "Свободно");
    assert!(session["createdAt"].is_string());
    assert!(session["id"].is_i64());
}

#[tokio::test]
async fn create_requires_name_and_variable() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send_json(json_request("POST", "/api/sessions", json!({ "name": "alpha" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Название и переменная обязательны");
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = TestApp::new().await;
    app.create("first", "a").await;
    app.create("second", "b").await;

    let names: Vec<String> = app
        .list()
        .await
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["second", "first"]);
}

#[tokio::test]
async fn export_produces_a_decodable_archive() {
    let app = TestApp::new().await;
    let session = app.create("alpha beta", "secret-token-123").await;
    let id = session["id"].as_i64().unwrap();

    let (status, body, headers) = app
        .send(empty_request("GET", &format!("/api/sessions/export?sessionId={id}")))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"alpha_beta_session.zip\""
    );
    assert_eq!(archive::decode(&body).unwrap(), "secret-token-123");
}

#[tokio::test]
async fn export_errors() {
    let app = TestApp::new().await;

    let (missing, _) = app.send_json(empty_request("GET", "/api/sessions/export")).await;
    assert_eq!(missing, StatusCode::BAD_REQUEST);

    let (absent, _) = app
        .send_json(empty_request("GET", "/api/sessions/export?sessionId=404"))
        .await;
    assert_eq!(absent, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scheduled_reset_returns_expired_sessions() {
    let app = TestApp::new().await;
    let session = app.create("alpha", "secret").await;
    let id = session["id"].as_i64().unwrap();

    let (status, updated) = app
        .send_json(json_request(
            "PUT",
            "/api/sessions",
            json!({ "id": id, "status": "Истекла квота" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Истекла квота");

    let (status, first) = app
        .send_json(empty_request("GET", "/api/cron/reset-sessions"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["resetCount"], 1);
    assert!(first["timestamp"].is_string());
    assert_eq!(app.list().await[0]["status"], "Свободно");

    let (_, second) = app
        .send_json(empty_request("GET", "/api/cron/reset-sessions"))
        .await;
    assert_eq!(second["resetCount"], 0);
}

#[tokio::test]
async fn cron_secret_is_enforced() {
    let app = TestApp::with_cron_secret(Some("s3cret")).await;

    let (status, _) = app
        .send_json(empty_request("GET", "/api/cron/reset-sessions"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut request = empty_request("GET", "/api/cron/reset-sessions");
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer s3cret".parse().unwrap());
    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn import_round_trips_and_resets_status() {
    let app = TestApp::new().await;
    let session = app.create("alpha", "line one\nline two").await;
    let id = session["id"].as_i64().unwrap();
    app.send_json(json_request(
        "PUT",
        "/api/sessions",
        json!({ "id": id, "status": "Используется" }),
    ))
    .await;

    let (_, archive_bytes, _) = app
        .send(empty_request("GET", &format!("/api/sessions/export?sessionId={id}")))
        .await;

    let (status, body) = app
        .send_json(multipart_request(
            "/api/sessions/import",
            Some(("alpha_session.zip", archive_bytes.as_slice())),
            &[("sessionName", "restored")],
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Сессия успешно импортирована");
    assert_eq!(body["session"]["name"], "restored");
    assert_eq!(body["session"]["variable"], "line one\nline two");
    assert_eq!(body["session"]["status"], "Свободно");
    assert_eq!(app.list().await.len(), 2);
}

#[tokio::test]
async fn import_of_comment_only_body_fails() {
    let app = TestApp::new().await;
    let bytes = zip_with_data("# Gemini CLI Session Data\n# Session Name: x\n\n");

    let (status, body) = app
        .send_json(multipart_request(
            "/api/sessions/import",
            Some(("x.zip", bytes.as_slice())),
            &[("sessionName", "x")],
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Переменная сессии не найдена в файле");
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn import_requires_file_and_name() {
    let app = TestApp::new().await;
    let bytes = zip_with_data("payload");

    let (no_file, _) = app
        .send_json(multipart_request("/api/sessions/import", None, &[("sessionName", "x")]))
        .await;
    assert_eq!(no_file, StatusCode::BAD_REQUEST);

    let (no_name, _) = app
        .send_json(multipart_request("/api/sessions/import", Some(("x.zip", bytes.as_slice())), &[]))
        .await;
    assert_eq!(no_name, StatusCode::BAD_REQUEST);

    let (no_data_entry, body) = app
        .send_json(multipart_request(
            "/api/sessions/import",
            Some(("x.txt", &b"just text"[..])),
            &[("sessionName", "x")],
        ))
        .await;
    assert_eq!(no_data_entry, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn delete_of_missing_id_is_not_found() {
    let app = TestApp::new().await;
    app.create("alpha", "secret").await;

    let (status, _) = app.send_json(empty_request("DELETE", "/api/sessions?id=999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send_json(empty_request("DELETE", "/api/sessions")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.list().await.len(), 1);
}

#[tokio::test]
async fn delete_removes_the_session() {
    let app = TestApp::new().await;
    let session = app.create("alpha", "secret").await;
    let id = session["id"].as_i64().unwrap();

    let (status, body) = app
        .send_json(empty_request("DELETE", &format!("/api/sessions?id={id}")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn status_only_update_keeps_name_and_variable() {
    let app = TestApp::new().await;
    let session = app.create("alpha", "secret").await;
    let id = session["id"].as_i64().unwrap();

    let (status, body) = app
        .send_json(json_request(
            "PUT",
            "/api/sessions",
            json!({ "id": id, "status": "Используется" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Используется");
    assert_eq!(body["name"], "alpha");
    assert_eq!(body["variable"], "secret");
}

#[tokio::test]
async fn full_update_and_its_validation() {
    let app = TestApp::new().await;
    let session = app.create("alpha", "secret").await;
    let id = session["id"].as_i64().unwrap();

    let (status, body) = app
        .send_json(json_request(
            "PUT",
            "/api/sessions",
            json!({ "id": id, "name": "beta", "variable": "other", "status": "Свободно" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "beta");
    assert_eq!(body["variable"], "other");

    let (incomplete, body) = app
        .send_json(json_request(
            "PUT",
            "/api/sessions",
            json!({ "id": id, "name": "gamma", "status": "Свободно" }),
        ))
        .await;
    assert_eq!(incomplete, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Все поля обязательны для полного обновления");

    let (unknown_status, _) = app
        .send_json(json_request(
            "PUT",
            "/api/sessions",
            json!({ "id": id, "status": "Broken" }),
        ))
        .await;
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);

    let (no_id, _) = app
        .send_json(json_request("PUT", "/api/sessions", json!({ "status": "Свободно" })))
        .await;
    assert_eq!(no_id, StatusCode::BAD_REQUEST);

    let (absent, _) = app
        .send_json(json_request(
            "PUT",
            "/api/sessions",
            json!({ "id": 999, "status": "Свободно" }),
        ))
        .await;
    assert_eq!(absent, StatusCode::NOT_FOUND);
}

fn raw_request(method: &str, uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn malformed_json_bodies_get_a_json_400() {
    let app = TestApp::new().await;
    app.create("alpha", "secret").await;

    let cases = [
        raw_request("PUT", "/api/sessions", Some("application/json"), r#"{"id":"1","status":"Свободно"}"#),
        raw_request("POST", "/api/sessions", Some("application/json"), r#"{"name":"alpha","#),
        raw_request("POST", "/api/sessions", None, r#"{"name":"alpha","variable":"x"}"#),
    ];
    for request in cases {
        let (status, body, headers) = app.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Некорректный запрос");
    }

    assert_eq!(app.list().await.len(), 1);
}

#[tokio::test]
async fn malformed_login_body_gets_a_json_400() {
    let app = TestApp::new().await;
    let response = app
        .router
        .clone()
        .oneshot(raw_request("POST", "/api/auth/login", Some("application/json"), r#"{"password":42}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Некорректный запрос");
}

#[tokio::test]
async fn text_statistics() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send_json(multipart_request(
            "/api/translations/analyze",
            Some(("chapter.txt", "Глава первая.\nОн пришёл домой.".as_bytes())),
            &[],
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fileName"], "chapter.txt");
    assert_eq!(body["wordCount"], 5);
    assert_eq!(body["charCount"], 26);
    assert_eq!(body["readingTimeMinutes"], 1);
    assert_eq!(body["readingTimeLabel"], "1 мин");
}

#[tokio::test]
async fn text_statistics_require_utf8() {
    let app = TestApp::new().await;
    let (status, _) = app
        .send_json(multipart_request(
            "/api/translations/analyze",
            Some(("broken.txt", &[0xffu8, 0xfe, 0xfd][..])),
            &[],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
