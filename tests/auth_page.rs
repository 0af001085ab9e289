mod common;

use kittygram::api::ApiClient;
use kittygram::config::{Config, UnauthenticatedPolicy};
use kittygram::forms::{LoginForm, RegisterForm};
use kittygram::notify::NoticeKind;
use kittygram::pages::AuthPage;
use kittygram::session::Route;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{api_for, config_for, CSRF};

fn register_form(password: &str, confirm: &str) -> RegisterForm {
    RegisterForm {
        username: "murka".into(),
        email: "murka@example.com".into(),
        password: password.into(),
        password_confirm: confirm.into(),
    }
}

async fn page(server: &MockServer) -> AuthPage {
    let config = config_for(server, UnauthenticatedPolicy::Redirect);
    AuthPage::new(api_for(&config), &config)
}

#[tokio::test]
async fn test_short_password_never_reaches_the_server() {
    let server = MockServer::start().await;
    let mut page = page(&server).await;

    page.submit_register(&register_form("short", "short")).await;

    let message = page.message().current().expect("message shown");
    assert_eq!(message.text, "Password must be at least 8 characters");
    assert_eq!(message.kind, NoticeKind::Error);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(page.navigation().is_none());
}

#[tokio::test]
async fn test_mismatched_passwords_never_reach_the_server() {
    let server = MockServer::start().await;
    let mut page = page(&server).await;

    page.submit_register(&register_form("longenough1", "longenough2"))
        .await;

    assert_eq!(
        page.message().current().unwrap().text,
        "Passwords do not match"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_success_moves_to_posts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .and(header("X-CSRFToken", CSRF))
        .and(body_json(json!({
            "username": "murka",
            "email": "murka@example.com",
            "password": "longenough",
            "password_confirm": "longenough"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "user": {"id": 1, "username": "murka", "email": "murka@example.com"},
            "message": "Registered"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut page = page(&server).await;
    page.submit_register(&register_form("longenough", "longenough"))
        .await;

    assert_eq!(page.navigation(), Some(Route::Posts));
    assert_eq!(page.message().current().unwrap().kind, NoticeKind::Success);
    assert_eq!(page.register_button().label(), "Sign up");
    assert!(!page.register_button().is_disabled());
}

#[tokio::test]
async fn test_register_shows_first_field_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "email": ["Enter a valid email address."],
            "username": ["A user with that username already exists."]
        })))
        .mount(&server)
        .await;

    let mut page = page(&server).await;
    page.submit_register(&register_form("longenough", "longenough"))
        .await;

    // username is checked before email
    assert_eq!(
        page.message().current().unwrap().text,
        "A user with that username already exists."
    );
    assert!(page.navigation().is_none());
}

#[tokio::test]
async fn test_register_falls_back_to_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let mut page = page(&server).await;
    page.submit_register(&register_form("longenough", "longenough"))
        .await;

    assert_eq!(page.message().current().unwrap().text, "Registration failed");
}

#[tokio::test]
async fn test_login_sends_csrf_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(header("X-CSRFToken", CSRF))
        .and(body_json(json!({"username": "murka", "password": "secret-pass"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "sessionid=s3ss; Path=/; HttpOnly")
                .set_body_json(json!({"id": 1, "username": "murka"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut page = page(&server).await;
    page.submit_login(&LoginForm {
        username: "murka".into(),
        password: "secret-pass".into(),
    })
    .await;

    assert_eq!(page.navigation(), Some(Route::Posts));
    assert_eq!(
        page.message().current().unwrap().text,
        "Signed in! Redirecting..."
    );
    assert_eq!(page.login_button().label(), "Sign in");
}

#[tokio::test]
async fn test_login_rejection_shows_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let mut page = page(&server).await;
    page.submit_login(&LoginForm {
        username: "murka".into(),
        password: "wrong".into(),
    })
    .await;

    assert_eq!(page.message().current().unwrap().text, "Invalid credentials");
    assert!(page.navigation().is_none());
}

#[tokio::test]
async fn test_network_failure_restores_submit_button() {
    let config = {
        let mut config = Config::default();
        config.api.base_url = common::dead_base_url();
        config
    };
    let api = ApiClient::new(&config.api.base_url).unwrap();
    let mut page = AuthPage::new(api, &config);

    page.submit_login(&LoginForm {
        username: "murka".into(),
        password: "secret-pass".into(),
    })
    .await;

    assert_eq!(page.login_button().label(), "Sign in");
    assert!(!page.login_button().is_disabled());
    let message = page.message().current().unwrap();
    assert!(message
        .text
        .starts_with("Network error while signing in"));
    assert!(page.navigation().is_none());

    page.submit_register(&register_form("longenough", "longenough"))
        .await;
    assert_eq!(page.register_button().label(), "Sign up");
    assert!(!page.register_button().is_disabled());
    assert!(page
        .message()
        .current()
        .unwrap()
        .text
        .starts_with("Network error during registration"));
}
