use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Request rejected with status {status}")]
    Rejected { status: StatusCode, body: RejectedBody },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Body of a non-2xx response, kept as JSON when it parses.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectedBody {
    Json(Value),
    Text(String),
}

impl RejectedBody {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => RejectedBody::Json(value),
            Err(_) => RejectedBody::Text(text),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            RejectedBody::Json(value) => Some(value),
            RejectedBody::Text(_) => None,
        }
    }
}

impl ClientError {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
            || self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_payload_too_large(&self) -> bool {
        self.status() == Some(StatusCode::PAYLOAD_TOO_LARGE)
    }

    /// JSON body of a rejected request, if the server sent one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ClientError::Rejected { body, .. } => body.json(),
            _ => None,
        }
    }

    /// First message stored under any of `fields`, checked in order.
    pub fn field_message(&self, fields: &[&str]) -> Option<String> {
        self.body().and_then(|body| first_field_message(body, fields))
    }

    /// `Error 502: Bad Gateway` style line for bodies nobody can read.
    pub fn status_line(&self) -> Option<String> {
        self.status().map(|status| {
            format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )
        })
    }
}

/// Looks up the first non-empty message under `fields`.
///
/// The backend reports errors either as `{"error": "text"}` or as
/// per-field lists like `{"username": ["taken"]}`; both shapes are read.
pub fn first_field_message(body: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| field_messages(body, field)?.into_iter().next())
}

/// All messages stored under one field.
pub fn field_messages(body: &Value, field: &str) -> Option<Vec<String>> {
    let messages: Vec<String> = match body.get(field)? {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => return None,
    };

    if messages.is_empty() {
        None
    } else {
        Some(messages)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
