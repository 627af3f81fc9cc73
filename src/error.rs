use thiserror::Error;

/// Failure of a single label request.
///
/// The logging adapter in [`crate::labels`] reports every variant with the same advisory line;
/// callers awaiting a [`crate::labels::LabelTask`] can tell them apart.
#[derive(Debug, Error)]
pub enum LabelError {
    /// The request never produced an HTTP response (curl missing, DNS, connection reset).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// GitHub answered with a non-2xx status.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not valid JSON.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid issue URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The task was aborted before it finished.
    #[error("label request was cancelled")]
    Cancelled,
}

impl LabelError {
    /// Whether GitHub rejected the credentials (or the lack of them).
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}
