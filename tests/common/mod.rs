// Shared fixtures: a mock Kittygram backend and clients pointed at it.

#![allow(dead_code)]

use kittygram::api::ApiClient;
use kittygram::config::{Config, UnauthenticatedPolicy};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CSRF: &str = "abc123";

pub fn config_for(server: &MockServer, policy: UnauthenticatedPolicy) -> Config {
    let mut config = Config::default();
    config.api.base_url = format!("{}/api", server.uri());
    config.session.unauthenticated = policy;
    config
}

/// Client whose jar already holds the CSRF cookie, as after a first page view.
pub fn api_for(config: &Config) -> ApiClient {
    let api = ApiClient::new(&config.api.base_url).unwrap();
    api.jar()
        .add_cookie_str(&format!("csrftoken={}; Path=/", CSRF), api.base_url());
    api
}

pub fn user_json(id: i64, username: &str) -> Value {
    json!({"id": id, "username": username, "email": format!("{username}@example.com")})
}

pub fn post_json(id: i64, author_id: i64, can_edit: bool) -> Value {
    json!({
        "id": id,
        "title": format!("Cat #{id}"),
        "description": "Naps all day",
        "image": null,
        "author": user_json(author_id, &format!("user{author_id}")),
        "created_at": "2025-01-15T12:00:00Z",
        "can_edit": can_edit
    })
}

pub async fn mount_me(server: &MockServer, id: i64, username: &str) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(id, username)))
        .mount(server)
        .await;
}

pub async fn mount_me_unauthorized(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Authentication credentials were not provided."})),
        )
        .mount(server)
        .await;
}

pub async fn mount_posts(server: &MockServer, posts: Value) {
    Mock::given(method("GET"))
        .and(path("/api/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts))
        .mount(server)
        .await;
}

/// Requests the backend saw for `method` and `path`.
pub async fn count_requests(server: &MockServer, http_method: &str, url_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == url_path)
        .count()
}

/// Base URL nothing listens on.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

/// Backend that answers the session check and the feed, then hangs up on
/// every other request before replying. Returns its API base URL.
pub async fn read_only_backend(user: Value, posts: Value) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let user = user.clone();
            let posts = posts.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&head);
                let body = if head.starts_with("GET /api/auth/me/ ") {
                    user.to_string()
                } else if head.starts_with("GET /api/posts/ ") {
                    posts.to_string()
                } else {
                    // Dropping the socket cuts the request off.
                    return;
                };

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}/api", addr)
}
