use crate::api::ApiClient;
use crate::config::Config;
use crate::forms::Confirm;
use crate::notify::{NoticeKind, Timings, Toasts};
use crate::render;
use crate::session::Route;

pub struct ProfilePage {
    api: ApiClient,
    profile_html: String,
    actions_visible: bool,
    toasts: Toasts,
    navigation: Option<Route>,
}

impl ProfilePage {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            api,
            profile_html: String::new(),
            actions_visible: true,
            toasts: Toasts::new(Timings::from(&config.notifications)),
            navigation: None,
        }
    }

    /// Markup of the `#profileInfo` element.
    pub fn profile_html(&self) -> &str {
        &self.profile_html
    }

    pub fn actions_visible(&self) -> bool {
        self.actions_visible
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn navigation(&self) -> Option<Route> {
        self.navigation
    }

    pub async fn load(&mut self) {
        let rendered = match self.api.current_user().await {
            Ok(user) => {
                tracing::debug!("Profile loaded for {}", user.username);
                self.actions_visible = true;
                render::profile_info(&user)
            }
            Err(e) => {
                tracing::warn!("Profile load failed: {}", e);
                self.actions_visible = false;
                render::profile_auth_message()
            }
        };

        match rendered {
            Ok(html) => self.profile_html = html,
            Err(e) => tracing::error!("Could not render profile: {}", e),
        }
    }

    /// Ends the session after confirmation. Leaves for the login page even
    /// when the backend refuses.
    pub async fn logout(&mut self, confirm: &impl Confirm) {
        if !confirm.confirm("Are you sure you want to sign out?") {
            return;
        }

        match self.api.logout().await {
            Ok(()) => {
                self.toasts.push("Signed out", NoticeKind::Success);
            }
            Err(e) => tracing::warn!("Logout failed, leaving anyway: {}", e),
        }
        self.navigation = Some(Route::Login);
    }

    /// "My posts" and "Back" both lead to the feed.
    pub fn open_posts(&mut self) {
        self.navigation = Some(Route::Posts);
    }
}
