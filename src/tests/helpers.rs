use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{config::Config, create_router, repository::Repositories, state::AppState};

pub const BOUNDARY: &str = "aero-test-boundary";

pub fn test_app() -> (Router, Repositories) {
    let repos = Repositories::in_memory();
    let app = create_router(AppState::new(repos.clone(), Config::default()));
    (app, repos)
}

/// Unsigned session cookie, as a client could hand-craft it.
pub fn forged_session(username: &str, role: &str) -> String {
    let identity = format!(r#"{{"username":"{}","role":"{}"}}"#, username, role);
    format!("aero_user={}", urlencoding::encode(&identity))
}

/// Signs in through `/login` and returns the signed session cookie.
pub async fn login_cookie(app: &Router, username: &str, password: &str) -> String {
    let response = send(
        app,
        form("/login", None, &[("username", username), ("password", password)]),
    )
    .await;
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|c| c.starts_with("aero_user="))
        .and_then(|c| c.split(';').next())
        .expect("login sets the session cookie")
        .to_string()
}

pub async fn admin(app: &Router) -> String {
    login_cookie(app, "admin", "admin123").await
}

pub async fn guest(app: &Router) -> String {
    login_cookie(app, "guest", "guest123").await
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form(uri: &str, cookie: Option<&str>, pairs: &[(&str, &str)]) -> Request<Body> {
    let body = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn file_upload(uri: &str, cookie: &str, file_name: &str, content_type: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: {ct}\r\n\r\nfile contents\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = file_name,
        ct = content_type
    );
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn header_value<'a>(response: &'a Response<Body>, name: header::HeaderName) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// All `Set-Cookie` headers joined, for substring checks.
pub fn set_cookies(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("\n")
}
