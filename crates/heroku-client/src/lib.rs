//! Heroku Platform API client.
//!
//! Manages apps and drives source builds to completion:
//!
//! ```no_run
//! # async fn run() -> heroku_client::HerokuResult<()> {
//! use heroku_client::{HerokuClient, PollOptions};
//!
//! let client = HerokuClient::from_env()?;
//! let app = client.create_app("wonder-beetle-42").await?;
//! let build = client
//!     .build_from_repository(&app.id, "https://github.com/acme/widgets", "main", None, PollOptions::bounded())
//!     .await?;
//! println!("build {} {}", build.id, build.status);
//! # Ok(())
//! # }
//! ```

mod apps;
mod builds;
mod client;
mod clock;
mod config;
mod credentials;
mod error;
mod netrc;
mod types;
mod validation;

pub use builds::{PollOptions, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
pub use client::{HerokuClient, HEROKU_MEDIA_TYPE, NO_BODY};
pub use clock::{Clock, ManualClock, TokioClock};
pub use config::{HerokuConfig, PollConfig};
pub use credentials::{
    Credential, CredentialResolver, CredentialSource, API_HOST, API_KEY_ENV, NETRC_ENV,
};
pub use error::{CredentialError, HerokuError, HerokuResult};
pub use types::*;
pub use validation::{is_valid_app_name, validate_app_name};

pub use github_client::{GitHubClient, GitHubError};
pub use reqwest::Method;
