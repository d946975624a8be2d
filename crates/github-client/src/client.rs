//! GitHub REST API client for repository metadata.

use crate::error::GitHubError;
use crate::repo::RepoRef;
use crate::types::*;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("heroku-rs/", env!("CARGO_PKG_VERSION"));

/// Unauthenticated, read-only GitHub client.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a client against the public GitHub API.
    pub fn new(timeout: Duration) -> Result<Self, GitHubError> {
        Self::with_base_url(DEFAULT_API_URL, timeout)
    }

    /// Create a client against a custom API endpoint.
    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GitHubError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the configured API endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a branch of a repository.
    #[instrument(skip(self))]
    pub async fn get_branch(&self, repo_url: &str, branch: &str) -> Result<Branch, GitHubError> {
        let repo = RepoRef::parse(repo_url).inspect_err(|_| {
            warn!("Rejected repository URL before request");
        })?;

        let response = self
            .client
            .get(format!("{}{}", self.base_url, repo.branch_path(branch)))
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| {
                    if body.is_empty() {
                        status.canonical_reason().unwrap_or("Unknown error").to_string()
                    } else {
                        body
                    }
                });
            warn!(%repo, branch, status = status.as_u16(), "Branch lookup failed: {}", message);
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Resolve the head commit sha of `branch` in the repository at `repo_url`.
    #[instrument(skip(self))]
    pub async fn resolve_commit(&self, repo_url: &str, branch: &str) -> Result<String, GitHubError> {
        let branch = self.get_branch(repo_url, branch).await?;
        debug!(branch = %branch.name, sha = %branch.commit.sha, "Resolved branch head");
        Ok(branch.commit.sha)
    }
}
