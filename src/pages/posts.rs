use crate::api::ApiClient;
use crate::config::{Config, UnauthenticatedPolicy, UploadConfig};
use crate::error::{field_messages, ClientError, ClientResult};
use crate::forms::{human_size, validate_image, Confirm, SubmitButton};
use crate::models::{ImageUpload, Post, PostDraft};
use crate::notify::{NoticeKind, Timings, Toasts};
use crate::render;
use crate::session::{Guard, Route, Session};

const CREATE_ERROR_FIELDS: &[&str] = &["title", "description", "image", "non_field_errors"];

/// Labels used when reporting per-field errors from an update.
const UPDATE_ERROR_FIELDS: &[(&str, &str)] = &[
    ("title", "Title: "),
    ("description", "Description: "),
    ("image", "Image: "),
    ("non_field_errors", ""),
];

/// The create-post modal.
#[derive(Debug, Clone)]
pub struct CreateModal {
    pub open: bool,
    pub draft: PostDraft,
    pub button: SubmitButton,
}

/// The edit-post modal, prefilled from the post cache.
#[derive(Debug, Clone)]
pub struct EditModal {
    pub open: bool,
    pub post_id: Option<i64>,
    pub title: String,
    pub description: String,
    /// New image chosen by the user; `None` keeps the current one.
    pub image: Option<ImageUpload>,
    pub current_image_html: String,
    pub button: SubmitButton,
}

impl EditModal {
    fn reset(&mut self) {
        self.post_id = None;
        self.title.clear();
        self.description.clear();
        self.image = None;
        self.current_image_html.clear();
    }
}

/// The feed page: session guard, post list and the post forms.
pub struct PostsPage {
    api: ApiClient,
    policy: UnauthenticatedPolicy,
    uploads: UploadConfig,
    session: Session,
    container: String,
    greeting: Option<String>,
    auth_controls_visible: bool,
    create: CreateModal,
    edit: EditModal,
    toasts: Toasts,
    navigation: Option<Route>,
}

impl PostsPage {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            api,
            policy: config.session.unauthenticated,
            uploads: config.uploads.clone(),
            session: Session::new(),
            container: String::new(),
            greeting: None,
            auth_controls_visible: false,
            create: CreateModal {
                open: false,
                draft: PostDraft::default(),
                button: SubmitButton::new("Publish"),
            },
            edit: EditModal {
                open: false,
                post_id: None,
                title: String::new(),
                description: String::new(),
                image: None,
                current_image_html: String::new(),
                button: SubmitButton::new("Save"),
            },
            toasts: Toasts::new(Timings::from(&config.notifications)),
            navigation: None,
        }
    }

    // -- Accessors --

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Markup of the `#postsContainer` element.
    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn greeting(&self) -> Option<&str> {
        self.greeting.as_deref()
    }

    pub fn auth_controls_visible(&self) -> bool {
        self.auth_controls_visible
    }

    pub fn create_modal(&self) -> &CreateModal {
        &self.create
    }

    pub fn create_modal_mut(&mut self) -> &mut CreateModal {
        &mut self.create
    }

    pub fn edit_modal(&self) -> &EditModal {
        &self.edit
    }

    pub fn edit_modal_mut(&mut self) -> &mut EditModal {
        &mut self.edit
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn navigation(&self) -> Option<Route> {
        self.navigation
    }

    // -- Page load --

    /// What the page does once it is ready: prime the CSRF cookie, check the
    /// session and show the feed.
    pub async fn open(&mut self) {
        if self.enter().await {
            self.load_posts().await;
        }
    }

    /// Like [`open`](Self::open), but the feed shows only the viewer's posts.
    pub async fn open_my_posts(&mut self) {
        if self.enter().await {
            self.load_my_posts().await;
        }
    }

    /// CSRF priming and the session guard. True when the viewer is signed in.
    async fn enter(&mut self) -> bool {
        if let Err(e) = self.api.ensure_csrf_token().await {
            tracing::warn!("Could not obtain a CSRF cookie: {}", e);
        }

        match self.session.guard(&self.api, self.policy).await {
            Guard::Authenticated(user) => {
                self.greeting = Some(format!("Hello, {}!", user.username));
                self.auth_controls_visible = true;
                true
            }
            Guard::Redirect(route) => {
                self.navigation = Some(route);
                false
            }
            Guard::LoginPrompt => {
                self.show_login_prompt();
                false
            }
        }
    }

    pub async fn load_posts(&mut self) {
        if self.session.current_user().is_none() {
            return;
        }
        let result = self.api.list_posts().await;
        self.apply_list(result);
    }

    /// Same as [`load_posts`](Self::load_posts) but only the viewer's own posts.
    pub async fn load_my_posts(&mut self) {
        if self.session.current_user().is_none() {
            return;
        }
        let result = self.api.my_posts().await;
        self.apply_list(result);
    }

    fn apply_list(&mut self, result: ClientResult<Vec<Post>>) {
        match result {
            Ok(posts) => {
                tracing::debug!("Loaded {} posts", posts.len());
                self.session.replace_posts(posts);
                self.render_posts();
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!("Session expired, sign-in required");
                self.show_login_prompt();
            }
            Err(e) => tracing::error!("Failed to load posts: {}", e),
        }
    }

    fn render_posts(&mut self) {
        match render::post_list(self.session.posts(), self.session.current_user()) {
            Ok(html) => self.container = html,
            Err(e) => tracing::error!("Could not render posts: {}", e),
        }
    }

    fn show_login_prompt(&mut self) {
        self.auth_controls_visible = false;
        self.greeting = None;
        match render::auth_message() {
            Ok(html) => self.container = html,
            Err(e) => tracing::error!("Could not render sign-in prompt: {}", e),
        }
    }

    // -- Create --

    pub fn open_create(&mut self) {
        self.create.open = true;
    }

    pub fn close_create(&mut self) {
        self.create.open = false;
    }

    /// Submit the create form.
    pub async fn create_post(&mut self) {
        if self.session.current_user().is_none() {
            self.toasts
                .push("Sign in to create posts", NoticeKind::Error);
            return;
        }

        if let Some(image) = &self.create.draft.image {
            if let Err(reason) = validate_image(image, &self.uploads) {
                self.toasts.push(reason, NoticeKind::Error);
                return;
            }
        }

        let api = &self.api;
        let draft = &self.create.draft;
        let result = self
            .create
            .button
            .while_busy("Publishing...", async {
                api.ensure_csrf_token().await?;
                api.create_post(draft).await
            })
            .await;

        match result {
            Ok(post) => {
                tracing::info!("Post {} created", post.id);
                self.create.open = false;
                self.create.draft = PostDraft::default();
                self.load_posts().await;
                self.toasts.push("Post created!", NoticeKind::Success);
            }
            Err(e) if e.is_payload_too_large() => {
                self.toasts.push(
                    format!(
                        "File is too large. Maximum size is {}",
                        human_size(self.uploads.max_bytes)
                    ),
                    NoticeKind::Error,
                );
            }
            Err(e) if e.status().is_some() => {
                let text = e
                    .field_message(CREATE_ERROR_FIELDS)
                    .unwrap_or_else(|| "Failed to create post".to_string());
                self.toasts.push(text, NoticeKind::Error);
            }
            Err(e) => {
                tracing::error!("Network error while creating post: {}", e);
                self.toasts
                    .push("Network error while creating post", NoticeKind::Error);
            }
        }
    }

    // -- Edit --

    /// Fill the edit form from the cache and open it. No request is made.
    pub fn open_edit(&mut self, id: i64) {
        if self.session.current_user().is_none() {
            self.toasts
                .push("Sign in to edit posts", NoticeKind::Error);
            return;
        }

        let Some(post) = self.session.cached_post(id) else {
            self.toasts.push("Post not found", NoticeKind::Error);
            return;
        };

        let current_image_html = match render::current_image(post) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Could not render current image: {}", e);
                String::new()
            }
        };

        self.edit.post_id = Some(post.id);
        self.edit.title = post.title.clone();
        self.edit.description = post.description.clone().unwrap_or_default();
        self.edit.image = None;
        self.edit.current_image_html = current_image_html;
        self.edit.open = true;
    }

    pub fn close_edit(&mut self) {
        self.edit.open = false;
    }

    /// Submit the edit form as a partial update.
    pub async fn update_post(&mut self) {
        if self.session.current_user().is_none() {
            self.toasts
                .push("Sign in to update posts", NoticeKind::Error);
            return;
        }

        let Some(id) = self.edit.post_id else {
            self.toasts.push("Post not found", NoticeKind::Error);
            return;
        };

        if let Some(image) = &self.edit.image {
            if let Err(reason) = validate_image(image, &self.uploads) {
                self.toasts.push(reason, NoticeKind::Error);
                return;
            }
        }

        let draft = PostDraft {
            title: self.edit.title.clone(),
            description: self.edit.description.clone(),
            image: self.edit.image.clone(),
        };
        let api = &self.api;
        let result = self
            .edit
            .button
            .while_busy("Saving...", async {
                api.ensure_csrf_token().await?;
                api.update_post(id, &draft).await
            })
            .await;

        match result {
            Ok(_) => {
                tracing::info!("Post {} updated", id);
                self.edit.open = false;
                self.edit.reset();
                self.load_posts().await;
                self.toasts.push("Post updated!", NoticeKind::Success);
            }
            Err(e) if e.status().is_some() => {
                self.toasts.push(update_error_message(&e), NoticeKind::Error);
            }
            Err(e) => {
                tracing::error!("Network error while updating post: {}", e);
                self.toasts
                    .push("Network error while updating post", NoticeKind::Error);
            }
        }
    }

    // -- Delete --

    pub async fn delete_post(&mut self, id: i64, confirm: &impl Confirm) {
        if self.session.current_user().is_none() {
            self.toasts
                .push("Sign in to delete posts", NoticeKind::Error);
            return;
        }

        if !confirm.confirm("Are you sure you want to delete this post?") {
            return;
        }

        match self.api.delete_post(id).await {
            Ok(()) => {
                tracing::info!("Post {} deleted", id);
                self.load_posts().await;
                self.toasts.push("Post deleted!", NoticeKind::Success);
            }
            Err(e) => {
                tracing::warn!("Failed to delete post {}: {}", id, e);
                self.toasts.push("Failed to delete post", NoticeKind::Error);
            }
        }
    }

    // -- Navigation --

    /// Ends the session and leaves for the login page whatever the backend says.
    pub async fn logout(&mut self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!("Logout failed, leaving anyway: {}", e);
        }
        self.session.sign_out();
        self.navigation = Some(Route::Login);
    }

    pub fn open_profile(&mut self) {
        self.navigation = Some(Route::Profile);
    }
}

/// Message for a rejected update: the first field with errors, its messages
/// joined, or the HTTP status when the body is not JSON.
fn update_error_message(e: &ClientError) -> String {
    let Some(body) = e.body() else {
        return e
            .status_line()
            .unwrap_or_else(|| "Failed to update post".to_string());
    };

    UPDATE_ERROR_FIELDS
        .iter()
        .find_map(|(field, label)| {
            field_messages(body, field).map(|messages| format!("{}{}", label, messages.join(", ")))
        })
        .unwrap_or_else(|| "Unknown server error".to_string())
}
