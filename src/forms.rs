use std::future::Future;

use crate::config::UploadConfig;
use crate::models::{ImageUpload, LoginRequest, RegisterRequest};

pub const MIN_PASSWORD_LEN: usize = 8;

/// A form's submit button: its label and whether it can be pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    label: String,
    disabled: bool,
}

impl SubmitButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Run `request` with the button disabled and showing `busy_label`.
    /// The original label and state come back however the request ends.
    pub async fn while_busy<F, T>(&mut self, busy_label: &str, request: F) -> T
    where
        F: Future<Output = T>,
    {
        let original = std::mem::replace(&mut self.label, busy_label.to_string());
        self.disabled = true;

        let result = request.await;

        self.label = original;
        self.disabled = false;
        result
    }
}

/// Yes/no prompt shown before destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn to_request(&self) -> LoginRequest {
        LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegisterForm {
    /// Checks done before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        if self.password != self.password_confirm {
            return Err("Passwords do not match".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }
        Ok(())
    }

    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            password_confirm: self.password_confirm.clone(),
        }
    }
}

/// Size and type pre-check, so oversized uploads never reach the server.
pub fn validate_image(image: &ImageUpload, limits: &UploadConfig) -> Result<(), String> {
    if image.size() > limits.max_bytes {
        return Err(format!(
            "File size must not exceed {}",
            human_size(limits.max_bytes)
        ));
    }
    if !limits
        .allowed_types
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&image.content_type))
    {
        return Err("Only JPEG, PNG, GIF and WebP files are allowed".to_string());
    }
    Ok(())
}

/// `10MB`, `512KB`, `300 bytes`.
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{}KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}
