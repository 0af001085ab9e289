use crate::api::ApiClient;
use crate::config::UnauthenticatedPolicy;
use crate::error::{ClientError, ClientResult};
use crate::models::{Post, User};

/// Pages the client can navigate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Posts,
    Profile,
}

impl Route {
    pub fn page(&self) -> &'static str {
        match self {
            Route::Login => "login.html",
            Route::Posts => "posts.html",
            Route::Profile => "profile.html",
        }
    }
}

/// Outcome of the session check run when a page opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Authenticated(User),
    Redirect(Route),
    LoginPrompt,
}

/// Per-page session state: who is signed in and the last feed we saw.
#[derive(Debug, Default)]
pub struct Session {
    current_user: Option<User>,
    posts: Vec<Post>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the backend who we are. Any failure counts as signed out.
    pub async fn guard(&mut self, api: &ApiClient, policy: UnauthenticatedPolicy) -> Guard {
        match api.current_user().await {
            Ok(user) => {
                tracing::info!("Signed in as {}", user.username);
                self.current_user = Some(user.clone());
                Guard::Authenticated(user)
            }
            Err(e) => {
                tracing::info!("Session check failed: {}", e);
                self.current_user = None;
                match policy {
                    UnauthenticatedPolicy::Redirect => Guard::Redirect(Route::Login),
                    UnauthenticatedPolicy::Inline => Guard::LoginPrompt,
                }
            }
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn require_user(&self) -> ClientResult<&User> {
        self.current_user.as_ref().ok_or(ClientError::Unauthorized)
    }

    pub fn sign_out(&mut self) {
        self.current_user = None;
        self.posts.clear();
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Replace the cache with the latest list response.
    pub fn replace_posts(&mut self, posts: Vec<Post>) {
        self.posts = posts;
    }

    pub fn cached_post(&self, id: i64) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }
}
