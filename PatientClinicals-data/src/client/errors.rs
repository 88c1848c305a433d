use std::fmt;

use thiserror::Error;

/// Category of a failed API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection refused, timeout or other transport failure
    Network,

    /// Non-2xx response other than 404
    Server { status: u16 },

    /// The requested entity does not exist (404)
    NotFound,

    /// Rejected locally before reaching the network
    Validation,

    /// A 2xx response whose body did not have the expected shape
    Decode,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Network => write!(f, "Network error"),
            ApiErrorKind::Server { status } => write!(f, "Server error ({})", status),
            ApiErrorKind::NotFound => write!(f, "Not found"),
            ApiErrorKind::Validation => write!(f, "Validation error"),
            ApiErrorKind::Decode => write!(f, "Unexpected response"),
        }
    }
}

/// Normalized error produced at the API client boundary.
///
/// Whatever shape the backend used to report a problem, callers only ever see
/// a kind and a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ApiError {
    /// What went wrong
    pub kind: ApiErrorKind,

    /// Description of the failure
    pub message: String,

    /// Whether `message` came from the response body
    from_server: bool,
}

impl ApiError {
    /// Transport failure
    pub fn network(message: impl Into<String>) -> Self {
        Self { kind: ApiErrorKind::Network, message: message.into(), from_server: false }
    }

    /// Local validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self { kind: ApiErrorKind::Validation, message: message.into(), from_server: false }
    }

    /// Unexpected body on a successful response
    pub fn decode(message: impl Into<String>) -> Self {
        Self { kind: ApiErrorKind::Decode, message: message.into(), from_server: false }
    }

    /// Entity absent on the server
    pub fn not_found(message: impl Into<String>) -> Self {
        Self { kind: ApiErrorKind::NotFound, message: message.into(), from_server: true }
    }

    /// Error status with a server-supplied message
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self { kind: ApiErrorKind::Server { status }, message: message.into(), from_server: true }
    }

    /// Build an error from a non-2xx status and its raw body
    pub fn from_response(status: u16, body: &str) -> Self {
        let kind = if status == 404 {
            ApiErrorKind::NotFound
        } else {
            ApiErrorKind::Server { status }
        };

        match extract_server_message(body) {
            Some(message) => Self { kind, message, from_server: true },
            None => Self {
                kind,
                message: format!("request failed with status code {}", status),
                from_server: false,
            },
        }
    }

    /// The message the backend put in the response body, if any
    pub fn server_message(&self) -> Option<&str> {
        if self.from_server {
            Some(&self.message)
        } else {
            None
        }
    }

    /// Message to show a user: the server's own wording, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// True when the error reports a missing entity
    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::decode(error.to_string())
        } else {
            ApiError::network(error.to_string())
        }
    }
}

/// Pull a human readable message out of an error body.
///
/// The backend answers either with a JSON object carrying a `message` field,
/// a bare JSON string, or plain text.
pub fn extract_server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => map
            .get("message")
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string),
        Ok(serde_json::Value::String(message)) if !message.trim().is_empty() => {
            Some(message.trim().to_string())
        }
        Ok(_) => None,
        Err(_) => Some(trimmed.to_string()),
    }
}
