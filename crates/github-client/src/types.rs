//! GitHub API types.

use serde::Deserialize;

/// Branch returned by `GET /repos/{owner}/{repo}/branches/{branch}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: BranchCommit,
    #[serde(default)]
    pub protected: bool,
}

/// Head commit of a branch.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchCommit {
    pub sha: String,
    pub url: Option<String>,
}

/// Error document GitHub returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: String,
}
