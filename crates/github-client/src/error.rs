//! GitHub client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Improperly configured GitHub URL '{0}'. Check that the repository URL is correct \
         and points to a public repository"
    )]
    InvalidUrl(String),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl GitHubError {
    /// True when the error was raised locally, before any request was sent.
    pub fn is_invalid_url(&self) -> bool {
        matches!(self, GitHubError::InvalidUrl(_))
    }
}
