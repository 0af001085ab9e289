mod common;

use kittygram::api::ApiClient;
use kittygram::config::UnauthenticatedPolicy;
use kittygram::models::PostDraft;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{api_for, config_for, count_requests, post_json, CSRF};

fn base(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

#[tokio::test]
async fn test_csrf_cookie_is_primed_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "csrftoken=fresh; Path=/")
                .set_body_json(json!([])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&base(&server)).unwrap();
    assert!(api.csrf_token().is_none());

    api.ensure_csrf_token().await.unwrap();
    api.ensure_csrf_token().await.unwrap();

    assert_eq!(api.csrf_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_percent_encoded_csrf_cookie_is_decoded() {
    let server = MockServer::start().await;
    let api = ApiClient::new(&base(&server)).unwrap();
    api.jar()
        .add_cookie_str("csrftoken=a%2Fb%3Dc; Path=/", api.base_url());

    assert_eq!(api.csrf_token().as_deref(), Some("a/b=c"));
}

#[tokio::test]
async fn test_delete_carries_csrf_header() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/posts/9/"))
        .and(header("X-CSRFToken", CSRF))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, UnauthenticatedPolicy::Redirect);
    api_for(&config).delete_post(9).await.unwrap();
}

#[tokio::test]
async fn test_reads_do_not_send_csrf_header() {
    let server = MockServer::start().await;
    common::mount_posts(&server, json!([post_json(1, 1, false)])).await;

    let config = config_for(&server, UnauthenticatedPolicy::Redirect);
    let posts = api_for(&config).list_posts().await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author.username, "user1");
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("X-CSRFToken").is_none());
}

#[tokio::test]
async fn test_rejection_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/posts/3/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "description": ["Too long."]
        })))
        .mount(&server)
        .await;

    let config = config_for(&server, UnauthenticatedPolicy::Redirect);
    let draft = PostDraft {
        title: "t".into(),
        ..PostDraft::default()
    };
    let err = api_for(&config).update_post(3, &draft).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert_eq!(
        err.field_message(&["title", "description"]).as_deref(),
        Some("Too long.")
    );
}

#[tokio::test]
async fn test_unauthorized_me() {
    let server = MockServer::start().await;
    common::mount_me_unauthorized(&server).await;

    let api = ApiClient::new(&base(&server)).unwrap();
    let err = api.current_user().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(count_requests(&server, "GET", "/api/auth/me/").await, 1);
}

#[tokio::test]
async fn test_session_cookie_follows_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "sessionid=s3ss; Path=/; HttpOnly")
                .set_body_json(json!({"id": 1, "username": "murka"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::user_json(1, "murka")))
        .mount(&server)
        .await;

    let config = config_for(&server, UnauthenticatedPolicy::Redirect);
    let api = api_for(&config);
    api.login(&kittygram::models::LoginRequest {
        username: "murka".into(),
        password: "secret-pass".into(),
    })
    .await
    .unwrap();

    let cookies = api.cookie_header().unwrap();
    assert!(cookies.contains("sessionid=s3ss"));
    assert!(cookies.contains(&format!("csrftoken={}", CSRF)));
    let user = api.current_user().await.unwrap();
    assert_eq!(user.username, "murka");
}
