//! Error types for OpenProject API operations.

use thiserror::Error;

/// Errors that can occur during OpenProject API operations.
#[derive(Debug, Error)]
pub enum OpenProjectError {
    /// Configuration is missing or incomplete.
    #[error("OpenProject configuration required: {0}")]
    ConfigMissing(String),

    /// A JSON payload carried no `_type` discriminator.
    #[error("Response is not a typed resource: missing '_type' discriminator")]
    MissingType,

    /// A decoded resource was not of the requested kind.
    #[error("Expected a {expected} resource, got {found}")]
    UnexpectedType {
        expected: &'static str,
        found: String,
    },

    /// API request failed.
    #[error("OpenProject API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// The server answered with something other than JSON.
    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Project parent pointers loop back onto themselves.
    #[error("Project hierarchy contains a cycle through project {project_id}")]
    HierarchyCycle { project_id: u64 },

    /// Invalid argument supplied by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for OpenProject operations.
pub type Result<T> = core::result::Result<T, OpenProjectError>;
