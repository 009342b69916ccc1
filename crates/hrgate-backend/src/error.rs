use thiserror::Error;

/// Failure modes when talking to the HR backend.
///
/// Every relay handler maps these the same way: `Upstream` keeps the backend
/// status code, `Unreachable` becomes 503, `InvalidResponse` becomes 500.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("backend unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("invalid response format from backend: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Build an Upstream error from a non-2xx body, preferring the FastAPI
    /// `detail` field, then `error`, then the raw text.
    pub fn from_upstream(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(json) => json
                .get("detail")
                .or_else(|| json.get("error"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| body.to_string()),
            Err(_) => body.to_string(),
        };
        BackendError::Upstream { status, message }
    }

    /// Status code the relay should answer with.
    pub fn relay_status(&self) -> u16 {
        match self {
            BackendError::Upstream { status, .. } => *status,
            BackendError::Unreachable(_) => 503,
            BackendError::InvalidResponse(_) => 500,
        }
    }
}
