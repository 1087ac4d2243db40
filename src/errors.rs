use thiserror::Error;

/// Failures of a parks-directory search. The `Display` text is shown inline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Please enter your NPS API key")]
    Auth,
    #[error("403 Forbidden: the API key is invalid or not allowed")]
    Forbidden,
    #[error("429 Too Many Requests: rate limit exceeded, try again later")]
    RateLimited,
    #[error("NPS request failed: {0}")]
    Request(String),
    #[error("No results found, try another keyword or resource kind")]
    Empty,
    #[error("Search was aborted")]
    Aborted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Please enter a valid Gemini API key first")]
    MissingKey,
    /// Message reported by the generative API or the transport.
    #[error("{0}")]
    Generation(String),
    #[error("Request was aborted")]
    Aborted,
}
