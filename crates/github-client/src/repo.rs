//! Repository URL parsing.
//!
//! Best-effort grammar, not a URL validator:
//!
//! ```text
//! [http:// | https://] [www.] github.com/<owner>/<repo>[.git][/]
//! ```
//!
//! Query strings, fragments, additional path segments and segments starting
//! with a dot are rejected.

use crate::error::GitHubError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static REPO_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.)?github\.com/(?P<owner>[A-Za-z0-9_-][A-Za-z0-9_.-]*)/(?P<repo>[A-Za-z0-9_-][A-Za-z0-9_.-]*?)(?:\.git)?/?$",
    )
    .expect("repository URL pattern is valid")
});

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Extract owner/repo from a repository URL.
    pub fn parse(url: &str) -> Result<Self, GitHubError> {
        let caps = REPO_URL_REGEX
            .captures(url.trim())
            .ok_or_else(|| GitHubError::InvalidUrl(url.to_string()))?;

        Ok(Self {
            owner: caps["owner"].to_string(),
            repo: caps["repo"].to_string(),
        })
    }

    /// API path of a branch of this repository.
    pub fn branch_path(&self, branch: &str) -> String {
        format!(
            "/repos/{}/{}/branches/{}",
            self.owner,
            self.repo,
            encode_branch(branch)
        )
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// URL of the branch tarball, derived from the URL the caller supplied.
pub fn tarball_url(repo_url: &str, branch: &str) -> String {
    format!(
        "{}/tarball/{}",
        repo_url.trim().trim_end_matches('/'),
        encode_branch(branch)
    )
}

/// Percent-encode each `/`-separated part of a branch name.
fn encode_branch(branch: &str) -> String {
    branch
        .split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
