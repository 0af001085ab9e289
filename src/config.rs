use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "kittygram", about = "Client for the Kittygram photo feed")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the Kittygram API
    #[arg(long)]
    pub api_url: Option<String>,

    /// What to do when the posts page is opened without a session
    #[arg(long, value_enum)]
    pub unauthenticated: Option<UnauthenticatedPolicy>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and keep the session cookie
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account (signs in on success)
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password
        #[arg(long)]
        password_confirm: String,
    },
    /// End the session
    Logout,
    /// Render the feed
    Posts {
        /// Only posts written by the signed-in user
        #[arg(long)]
        mine: bool,
    },
    /// Publish a new post
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// JPEG, PNG, GIF or WebP file to attach
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Change one of your posts
    Edit {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Replacement image; the current one is kept when omitted
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Delete one of your posts
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the signed-in user's profile
    Profile,
}

/// Behaviour of the posts page when the session check fails.
#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnauthenticatedPolicy {
    /// Navigate to the login page.
    #[default]
    Redirect,
    /// Stay on the page and render a sign-in prompt in place of the feed.
    Inline,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub notifications: NotificationConfig,
    pub uploads: UploadConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub unauthenticated: UnauthenticatedPolicy,
    pub cookie_file: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub display_ms: u64,
    pub exit_ms: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_ms: 3000,
            exit_ms: 300,
        }
    }
}

impl NotificationConfig {
    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    pub fn exit(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_types: ["image/jpeg", "image/png", "image/gif", "image/webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref api_url) = cli.api_url {
            config.api.base_url = api_url.clone();
        }
        if let Some(policy) = cli.unauthenticated {
            config.session.unauthenticated = policy;
        }

        if config.session.cookie_file.is_none() {
            config.session.cookie_file = Some(data_dir.join("cookies.json"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".kittygram")
        })
    }

    pub fn cookies_path(&self) -> PathBuf {
        self.session
            .cookie_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("cookies.json"))
    }
}
