use askama::Template;
use chrono::{DateTime, Utc};

use crate::error::ClientResult;
use crate::models::{Post, User};
use crate::notify::{Message, Toast};
use crate::session::Route;

// --- View structs ---

pub struct PostCard {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub author: String,
    pub created_at: String,
    pub can_manage: bool,
}

impl PostCard {
    pub fn new(post: &Post, viewer: Option<&User>) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            description: post.description.clone().unwrap_or_default(),
            image: post.image.clone().filter(|src| !src.is_empty()),
            author: post.author.username.clone(),
            created_at: format_post_date(&post.created_at),
            can_manage: post.is_managed_by(viewer),
        }
    }
}

// --- Templates ---

#[derive(Template)]
#[template(path = "components/post_list.html")]
pub struct PostListTemplate {
    pub posts: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "components/auth_message.html")]
pub struct AuthMessageTemplate {
    pub login_page: &'static str,
}

#[derive(Template)]
#[template(path = "components/current_image.html")]
pub struct CurrentImageTemplate {
    pub image: Option<String>,
    pub title: String,
}

#[derive(Template)]
#[template(path = "components/profile_info.html")]
pub struct ProfileInfoTemplate {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "components/profile_auth_message.html")]
pub struct ProfileAuthMessageTemplate {
    pub login_page: &'static str,
}

#[derive(Template)]
#[template(path = "components/message.html")]
pub struct MessageTemplate {
    pub message: Option<Message>,
}

#[derive(Template)]
#[template(path = "components/toasts.html")]
pub struct ToastsTemplate {
    pub toasts: Vec<Toast>,
}

/// Render a template, logging failures.
pub fn render<T: Template>(template: &T) -> ClientResult<String> {
    template.render().map_err(|e| {
        tracing::error!("Template render error: {}", e);
        e.into()
    })
}

/// Markup for the `#postsContainer` element.
pub fn post_list(posts: &[Post], viewer: Option<&User>) -> ClientResult<String> {
    let posts = posts
        .iter()
        .map(|post| PostCard::new(post, viewer))
        .collect();
    render(&PostListTemplate { posts })
}

pub fn auth_message() -> ClientResult<String> {
    render(&AuthMessageTemplate {
        login_page: Route::Login.page(),
    })
}

/// The "current photo" block of the edit form.
pub fn current_image(post: &Post) -> ClientResult<String> {
    render(&CurrentImageTemplate {
        image: post.image.clone().filter(|src| !src.is_empty()),
        title: post.title.clone(),
    })
}

pub fn profile_info(user: &User) -> ClientResult<String> {
    render(&ProfileInfoTemplate {
        id: user.id,
        username: user.username.clone(),
        email: user
            .email
            .clone()
            .filter(|email| !email.is_empty())
            .unwrap_or_else(|| "Not specified".to_string()),
    })
}

pub fn profile_auth_message() -> ClientResult<String> {
    render(&ProfileAuthMessageTemplate {
        login_page: Route::Login.page(),
    })
}

/// The `#message` element; hidden when there is nothing to show.
pub fn message(message: Option<Message>) -> ClientResult<String> {
    render(&MessageTemplate { message })
}

pub fn toasts(toasts: Vec<Toast>) -> ClientResult<String> {
    render(&ToastsTemplate { toasts })
}

pub fn format_post_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}

// --- Tests ---
