use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use reqwest::cookie::Jar;
use tracing_subscriber::EnvFilter;

use kittygram::api::ApiClient;
use kittygram::config::{Cli, Command, Config};
use kittygram::forms::{Confirm, LoginForm, RegisterForm};
use kittygram::models::{ImageUpload, PostDraft};
use kittygram::notify::{MessageBox, Toasts};
use kittygram::pages::{AuthPage, PostsPage, ProfilePage};
use kittygram::render;
use kittygram::session::Route;
use kittygram::store::CookieFile;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::debug!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Restore the cookie jar, standing in for the browser's cookie store
    let jar = Arc::new(Jar::default());
    let api = ApiClient::with_jar(&config.api.base_url, jar.clone())?;
    let cookies = CookieFile::new(config.cookies_path());
    cookies.load_into(&jar, api.base_url())?;
    tracing::debug!("Using API at {}", api.base_url());

    run(cli.command, api.clone(), &config).await?;

    cookies.save_from(&jar, api.base_url())?;
    Ok(())
}

async fn run(command: Command, api: ApiClient, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let mut page = AuthPage::new(api, config);
            page.submit_login(&LoginForm { username, password }).await;
            print_message(page.message());
            print_navigation(page.navigation());
        }
        Command::Register {
            username,
            email,
            password,
            password_confirm,
        } => {
            let mut page = AuthPage::new(api, config);
            let form = RegisterForm {
                username,
                email,
                password,
                password_confirm,
            };
            page.submit_register(&form).await;
            print_message(page.message());
            print_navigation(page.navigation());
        }
        Command::Logout => {
            let mut page = PostsPage::new(api, config);
            page.logout().await;
            print_navigation(page.navigation());
        }
        Command::Posts { mine } => {
            let mut page = PostsPage::new(api, config);
            if mine {
                page.open_my_posts().await;
            } else {
                page.open().await;
            }
            print_feed(&page);
        }
        Command::Create {
            title,
            description,
            image,
        } => {
            let image = image.as_deref().map(ImageUpload::from_path).transpose()?;
            let mut page = PostsPage::new(api, config);
            page.open().await;
            page.open_create();
            page.create_modal_mut().draft = PostDraft {
                title,
                description,
                image,
            };
            page.create_post().await;
            print_feed(&page);
        }
        Command::Edit {
            id,
            title,
            description,
            image,
        } => {
            let image = image.as_deref().map(ImageUpload::from_path).transpose()?;
            let mut page = PostsPage::new(api, config);
            page.open().await;
            page.open_edit(id);
            if page.edit_modal().open {
                let edit = page.edit_modal_mut();
                if let Some(title) = title {
                    edit.title = title;
                }
                if let Some(description) = description {
                    edit.description = description;
                }
                edit.image = image;
                page.update_post().await;
            }
            print_feed(&page);
        }
        Command::Delete { id, yes } => {
            let mut page = PostsPage::new(api, config);
            page.open().await;
            if yes {
                page.delete_post(id, &|_: &str| true).await;
            } else {
                page.delete_post(id, &StdinConfirm).await;
            }
            print_feed(&page);
        }
        Command::Profile => {
            let mut page = ProfilePage::new(api, config);
            page.load().await;
            println!("{}", page.profile_html());
            print_toasts(page.toasts());
        }
    }

    Ok(())
}

/// Blocking yes/no question on the terminal.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        let _ = std::io::stderr().flush();

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn print_feed(page: &PostsPage) {
    if let Some(greeting) = page.greeting() {
        eprintln!("{}", greeting);
    }
    if !page.container().is_empty() {
        println!("{}", page.container());
    }
    print_toasts(page.toasts());
    print_navigation(page.navigation());
}

fn print_message(message: &MessageBox) {
    if let Some(message) = message.current() {
        match render::message(Some(message)) {
            Ok(html) => println!("{}", html),
            Err(e) => tracing::error!("Could not render message: {}", e),
        }
    }
}

fn print_toasts(toasts: &Toasts) {
    let toasts = toasts.snapshot();
    if toasts.is_empty() {
        return;
    }
    match render::toasts(toasts) {
        Ok(html) => eprintln!("{}", html),
        Err(e) => tracing::error!("Could not render notifications: {}", e),
    }
}

fn print_navigation(route: Option<Route>) {
    if let Some(route) = route {
        eprintln!("-> {}", route.page());
    }
}
