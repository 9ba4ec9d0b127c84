//! Gateway error type and user-facing message extraction

use serde::Deserialize;
use thiserror::Error;

/// Optional structured fields a backend may put in an error response
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "text_only")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "text_only")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parse a raw response body, tolerating non-JSON payloads
    pub fn parse(raw: &str) -> ErrorBody {
        serde_json::from_str(raw).unwrap_or_default()
    }
}

/// Keeps string fields, drops anything else (objects, numbers, null)
fn text_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Failure of a single gateway call
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GatewayError {
    /// The request never produced an HTTP response
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: ErrorBody },

    /// The response arrived but could not be decoded
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// A local image file named in the form could not be read
    #[error("Could not read image {path}: {reason}")]
    Image { path: String, reason: String },

    #[error("Request cancelled")]
    Cancelled,
}

impl GatewayError {
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else if e.is_timeout() {
            GatewayError::Transport("Request timed out".to_string())
        } else if e.is_connect() {
            GatewayError::Transport(format!("Connection failed: {}", e))
        } else {
            GatewayError::Transport(format!("Request failed: {}", e))
        }
    }

    fn body(&self) -> Option<&ErrorBody> {
        match self {
            GatewayError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Picks the most specific message available for a failed call.
///
/// Order: server `message`, server `error`, the error's own description,
/// then `fallback`. Blank strings count as absent.
pub fn describe_failure(err: &GatewayError, fallback: &str) -> String {
    let body = err.body();
    let description = err.to_string();

    let picked = [
        body.and_then(|b| b.message.as_deref()),
        body.and_then(|b| b.error.as_deref()),
        Some(description.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|s| !s.is_empty())
    .unwrap_or(fallback)
    .to_string();
    picked
}
