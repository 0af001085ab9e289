// Keeps API cookies on disk between runs of the command-line client.

use std::path::PathBuf;

use reqwest::cookie::{CookieStore, Jar};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ClientResult;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedCookies {
    base_url: String,
    cookies: Vec<String>,
}

pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Put saved cookies back into `jar`. Cookies saved for another base URL
    /// are ignored. Returns how many were restored.
    pub fn load_into(&self, jar: &Jar, url: &Url) -> ClientResult<usize> {
        if !self.path.exists() {
            return Ok(0);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let saved: SavedCookies = serde_json::from_str(&content)?;
        if saved.base_url != url.as_str() {
            tracing::info!(
                "Ignoring cookies saved for {} (now using {})",
                saved.base_url,
                url
            );
            return Ok(0);
        }

        for cookie in &saved.cookies {
            jar.add_cookie_str(&format!("{}; Path=/", cookie), url);
        }
        tracing::debug!("Restored {} cookies", saved.cookies.len());
        Ok(saved.cookies.len())
    }

    /// Write the cookies `jar` holds for `url`.
    pub fn save_from(&self, jar: &Jar, url: &Url) -> ClientResult<()> {
        let cookies = jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
            .map(|header| {
                header
                    .split(';')
                    .map(|pair| pair.trim().to_string())
                    .filter(|pair| !pair.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let saved = SavedCookies {
            base_url: url.to_string(),
            cookies,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&saved)?)?;
        Ok(())
    }
}
