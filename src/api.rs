// HTTP access to the Kittygram REST API.
//
// Every request shares one cookie jar, so the session and CSRF cookies set
// by the backend ride along automatically. Mutating requests also echo the
// CSRF token back in the `X-CSRFToken` header.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::csrf::{self, CSRF_HEADER};
use crate::error::{ClientError, ClientResult, RejectedBody};
use crate::models::{LoginRequest, Post, PostDraft, PostFields, RegisterRequest, User};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_jar(base_url, Arc::new(Jar::default()))
    }

    /// Build a client around an existing cookie jar.
    pub fn with_jar(base_url: &str, jar: Arc<Jar>) -> ClientResult<Self> {
        let base = parse_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self { http, jar, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// Resolve an API path such as `posts/12/` against the base URL.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Cookies the jar would send to the API, as a `Cookie` header string.
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.base)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.cookie_header()
            .as_deref()
            .and_then(csrf::token_from_cookie_header)
    }

    /// Make sure the jar holds a CSRF cookie.
    ///
    /// The backend sets `csrftoken` on any safe request, so an unauthenticated
    /// look at the feed is enough to obtain one.
    pub async fn ensure_csrf_token(&self) -> ClientResult<()> {
        if self.csrf_token().is_some() {
            return Ok(());
        }

        tracing::debug!("No CSRF cookie yet, priming it");
        self.http.get(self.endpoint("posts/")?).send().await?;
        Ok(())
    }

    // -- Auth --

    pub async fn current_user(&self) -> ClientResult<User> {
        let response = self.get("auth/me/").await?;
        Ok(response.json().await?)
    }

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<()> {
        let builder = self.mutating(Method::POST, "auth/login/")?.json(request);
        send(builder).await?;
        Ok(())
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        let builder = self.mutating(Method::POST, "auth/register/")?.json(request);
        send(builder).await?;
        Ok(())
    }

    pub async fn logout(&self) -> ClientResult<()> {
        let builder = self
            .mutating(Method::POST, "auth/logout/")?
            .json(&serde_json::json!({}));
        send(builder).await?;
        Ok(())
    }

    // -- Posts --

    pub async fn list_posts(&self) -> ClientResult<Vec<Post>> {
        self.get_json("posts/").await
    }

    pub async fn my_posts(&self) -> ClientResult<Vec<Post>> {
        self.get_json("posts/my_posts/").await
    }

    pub async fn create_post(&self, draft: &PostDraft) -> ClientResult<Post> {
        let builder = with_draft(self.mutating(Method::POST, "posts/")?, draft)?;
        Ok(send(builder).await?.json().await?)
    }

    /// Partial update. The image is left untouched unless the draft has one.
    pub async fn update_post(&self, id: i64, draft: &PostDraft) -> ClientResult<Post> {
        let path = format!("posts/{}/", id);
        let builder = with_draft(self.mutating(Method::PATCH, &path)?, draft)?;
        Ok(send(builder).await?.json().await?)
    }

    pub async fn delete_post(&self, id: i64) -> ClientResult<()> {
        let path = format!("posts/{}/", id);
        send(self.mutating(Method::DELETE, &path)?).await?;
        Ok(())
    }

    // -- Helpers --

    async fn get(&self, path: &str) -> ClientResult<Response> {
        send(self.http.get(self.endpoint(path)?)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Ok(self.get(path).await?.json().await?)
    }

    fn mutating(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.csrf_token().unwrap_or_default();
        if token.is_empty() {
            tracing::warn!("Sending {} {} without a CSRF token", method, path);
        }
        Ok(self
            .http
            .request(method, self.endpoint(path)?)
            .header(CSRF_HEADER, token))
    }
}

/// Base URLs are treated as directories so relative joins keep their prefix.
fn parse_base_url(base_url: &str) -> ClientResult<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(Url::parse(&base)?)
}

/// Multipart when an image is attached, JSON otherwise.
fn with_draft(builder: RequestBuilder, draft: &PostDraft) -> ClientResult<RequestBuilder> {
    match &draft.image {
        Some(image) => {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)?;
            let form = Form::new()
                .text("title", draft.title.clone())
                .text("description", draft.description.clone())
                .part("image", part);
            Ok(builder.multipart(form))
        }
        None => Ok(builder.json(&PostFields {
            title: &draft.title,
            description: &draft.description,
        })),
    }
}

/// Send a request and turn any non-2xx answer into `ClientError::Rejected`.
async fn send(builder: RequestBuilder) -> ClientResult<Response> {
    let response = builder.send().await?;
    let status = response.status();
    tracing::debug!("{} {}", status.as_u16(), response.url().path());

    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    tracing::warn!("Request rejected with {}: {}", status, text);
    Err(ClientError::Rejected {
        status,
        body: RejectedBody::parse(text),
    })
}
