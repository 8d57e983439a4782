use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the Calendar/Tasks adapter.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl ApiError {
    /// Maps a non-success response to an error, preferring the message Google
    /// puts in `{"error": {"message": ...}}` over the raw body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = google_error_message(body)
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_else(|| body.to_owned());

        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(message),
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        }
    }
}

fn google_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    // The token endpoint reports `{"error": "invalid_grant", "error_description": ...}`
    if let Some(code) = error.as_str() {
        return Some(
            value
                .get("error_description")
                .and_then(|d| d.as_str())
                .map(|d| format!("{code}: {d}"))
                .unwrap_or_else(|| code.to_owned()),
        );
    }
    error
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_owned)
}
