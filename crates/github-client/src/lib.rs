//! Read-only GitHub repository metadata client.

mod client;
mod error;
mod repo;
mod types;

pub use client::{GitHubClient, DEFAULT_API_URL};
pub use error::GitHubError;
pub use repo::{tarball_url, RepoRef};
pub use types::*;
