//! Client-side error taxonomy.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response other than an auth failure.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// 401/403 — missing, expired or rejected bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),

    /// The API has no endpoint for this operation.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// The message the server put in its error body, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        let msg = match self {
            ApiError::Server { message, .. } => message.as_str(),
            ApiError::Unauthorized(message) => message.as_str(),
            _ => return None,
        };
        let msg = msg.trim();
        (!msg.is_empty()).then_some(msg)
    }

    /// Text to show the user: the server's message, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            401 | 403 => ApiError::Unauthorized(message),
            _ => ApiError::Server { status, message },
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Tries `message`, `error` and `detail` string fields first. A map of
/// field → messages (a validation error payload) becomes
/// `"a, b | c"`. A JSON string or non-JSON body is used as is.
pub fn extract_message(body: &str) -> String {
    let body = body.trim();
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    match json {
        Value::String(s) => s,
        Value::Object(map) => {
            for key in ["message", "error", "detail"] {
                if let Some(Value::String(s)) = map.get(key) {
                    return s.clone();
                }
            }
            map.values()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Array(items) => Some(
                        items
                            .iter()
                            .filter_map(|i| i.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    ),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" | ")
        }
        _ => String::new(),
    }
}
