//! Client configuration loaded from environment variables.
//!
//! Variables use the `HEROKU__` prefix and `__` as the nesting separator, e.g.
//! `HEROKU__API_URL` or `HEROKU__POLL__TIMEOUT=10m`. A `.env` file is loaded
//! first when present. The API token is not part of this configuration; see
//! [`crate::CredentialResolver`].

use serde::Deserialize;
use std::time::Duration;

/// Heroku client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HerokuConfig {
    /// Platform API endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Repository metadata API endpoint
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Build status polling
    #[serde(default)]
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Delay between build status checks
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Give up after this long (unbounded when unset)
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Give up after this many status checks (unbounded when unset)
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for HerokuConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            github_api_url: default_github_api_url(),
            timeout: default_timeout(),
            poll: PollConfig::default(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            timeout: None,
            max_attempts: None,
        }
    }
}

fn default_api_url() -> String {
    "https://api.heroku.com".into()
}

fn default_github_api_url() -> String {
    github_client::DEFAULT_API_URL.into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_poll_interval() -> Duration {
    crate::builds::DEFAULT_POLL_INTERVAL
}

impl HerokuConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("HEROKU")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
