use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{detail}")]
    Api { status: StatusCode, detail: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("session file: {0}")]
    Session(String),
    #[error("Please log in.")]
    NotLoggedIn,
    #[error("{0}")]
    Invalid(String),
}

impl ClientError {
    /// Build an [`ClientError::Api`] from a response body, preferring the
    /// `detail` field and falling back to field errors or the raw text.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => match map.get("detail").and_then(Value::as_str) {
                Some(detail) => detail.to_string(),
                None => field_errors(&map).unwrap_or_else(|| body.to_string()),
            },
            Ok(Value::String(text)) => text,
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Self::Api { status, detail }
    }
}

fn field_errors(map: &serde_json::Map<String, Value>) -> Option<String> {
    let parts: Vec<String> = map
        .iter()
        .filter_map(|(field, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => return None,
            };
            (!text.is_empty()).then(|| format!("{field}: {text}"))
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join("; "))
}
