use crate::api::ApiClient;
use crate::config::Config;
use crate::forms::{LoginForm, RegisterForm, SubmitButton};
use crate::notify::{MessageBox, NoticeKind, Timings};
use crate::session::Route;

const REGISTER_ERROR_FIELDS: &[&str] = &["error", "username", "email", "password", "non_field_errors"];

/// Login and registration forms.
pub struct AuthPage {
    api: ApiClient,
    message: MessageBox,
    login_button: SubmitButton,
    register_button: SubmitButton,
    navigation: Option<Route>,
}

impl AuthPage {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            api,
            message: MessageBox::new(Timings::from(&config.notifications)),
            login_button: SubmitButton::new("Sign in"),
            register_button: SubmitButton::new("Sign up"),
            navigation: None,
        }
    }

    pub fn message(&self) -> &MessageBox {
        &self.message
    }

    pub fn login_button(&self) -> &SubmitButton {
        &self.login_button
    }

    pub fn register_button(&self) -> &SubmitButton {
        &self.register_button
    }

    /// Page the browser would be sent to, once a handler decided to leave.
    pub fn navigation(&self) -> Option<Route> {
        self.navigation
    }

    pub async fn submit_login(&mut self, form: &LoginForm) {
        tracing::info!("Login attempt for user {}", form.username);
        let request = form.to_request();
        let result = self
            .login_button
            .while_busy("Signing in...", self.api.login(&request))
            .await;

        match result {
            Ok(()) => {
                self.message
                    .show("Signed in! Redirecting...", NoticeKind::Success);
                self.navigation = Some(Route::Posts);
            }
            Err(e) if e.status().is_some() => {
                let text = e
                    .field_message(&["error", "non_field_errors"])
                    .unwrap_or_else(|| "Login failed".to_string());
                self.message.show(text, NoticeKind::Error);
            }
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                self.message.show(
                    format!("Network error while signing in: {}", e),
                    NoticeKind::Error,
                );
            }
        }
    }

    pub async fn submit_register(&mut self, form: &RegisterForm) {
        if let Err(reason) = form.validate() {
            self.message.show(reason, NoticeKind::Error);
            return;
        }

        tracing::info!("Registration attempt for user {}", form.username);
        let request = form.to_request();
        let result = self
            .register_button
            .while_busy("Signing up...", self.api.register(&request))
            .await;

        match result {
            Ok(()) => {
                self.message.show(
                    "Registration complete! You are now signed in.",
                    NoticeKind::Success,
                );
                self.navigation = Some(Route::Posts);
            }
            Err(e) if e.status().is_some() => {
                let text = e
                    .field_message(REGISTER_ERROR_FIELDS)
                    .unwrap_or_else(|| "Registration failed".to_string());
                self.message.show(text, NoticeKind::Error);
            }
            Err(e) => {
                tracing::error!("Registration failed: {}", e);
                self.message.show(
                    format!("Network error during registration: {}", e),
                    NoticeKind::Error,
                );
            }
        }
    }
}
