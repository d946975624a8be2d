//! Heroku client errors.

use github_client::GitHubError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain an API token.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error(
        "Could not load the API key to be used for making requests. Set the {env_var} \
         environment variable or add a `machine {host}` entry to your .netrc file"
    )]
    Missing { env_var: &'static str, host: String },

    #[error("Could not read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse {} (line {}): {}", .path.display(), .line, .message)]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum HerokuError {
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Input rejected locally; no request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Update requested without any field to change; no request was sent.
    #[error("Nothing to update: supply a new name or a maintenance flag")]
    NoOp,

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        id: Option<String>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Repository metadata error: {0}")]
    Repository(GitHubError),

    #[error("Build {build_id} still pending after {attempts} polls ({elapsed:?})")]
    PollTimeout {
        build_id: String,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("Polling for build {build_id} was cancelled")]
    Cancelled { build_id: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl HerokuError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            HerokuError::Api { status, .. } => Some(*status),
            HerokuError::Repository(GitHubError::Api { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// True for errors raised before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            HerokuError::Validation(_) | HerokuError::NoOp | HerokuError::Credential(_)
        )
    }
}

// Malformed repository URLs never reach the metadata API.
impl From<GitHubError> for HerokuError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::InvalidUrl(_) => HerokuError::Validation(err.to_string()),
            other => HerokuError::Repository(other),
        }
    }
}

/// Result type alias for Heroku client operations.
pub type HerokuResult<T> = Result<T, HerokuError>;
