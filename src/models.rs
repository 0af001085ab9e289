use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub author: User,
    pub created_at: DateTime<Utc>,
    /// Computed by the server for the requesting user.
    #[serde(default)]
    pub can_edit: bool,
}

impl Post {
    /// Whether `viewer` may see edit and delete controls for this post.
    pub fn is_managed_by(&self, viewer: Option<&User>) -> bool {
        self.can_edit && viewer.is_some_and(|user| user.id == self.author.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// An image file attached to a create or edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read a file from disk, guessing its content type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Contents of the create-post and edit-post forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub description: String,
    pub image: Option<ImageUpload>,
}

/// JSON body used when no image is attached.
#[derive(Debug, Serialize)]
pub(crate) struct PostFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
}
