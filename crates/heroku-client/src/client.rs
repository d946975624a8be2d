//! Platform API transport.

use crate::clock::{Clock, TokioClock};
use crate::config::{HerokuConfig, PollConfig};
use crate::credentials::{Credential, CredentialResolver};
use crate::error::{HerokuError, HerokuResult};
use crate::types::ErrorResponse;
use github_client::GitHubClient;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Versioned media type of the Platform API.
pub const HEROKU_MEDIA_TYPE: &str = "application/vnd.heroku+json; version=3";

const CLIENT_USER_AGENT: &str = concat!("heroku-rs/", env!("CARGO_PKG_VERSION"));

/// Placeholder for requests without a body.
pub const NO_BODY: Option<&()> = None;

/// Heroku Platform API client.
///
/// Owns its resolved credential; clones share the connection pool.
#[derive(Clone)]
pub struct HerokuClient {
    client: Client,
    base_url: String,
    credential: Credential,
    pub(crate) github: GitHubClient,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) poll: PollConfig,
}

impl HerokuClient {
    /// Create a client from a resolved credential and configuration.
    pub fn new(credential: Credential, config: &HerokuConfig) -> HerokuResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let github = GitHubClient::with_base_url(&config.github_api_url, config.timeout)?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            credential,
            github,
            clock: Arc::new(TokioClock),
            poll: config.poll.clone(),
        })
    }

    /// Create a client from environment configuration, resolving the API key
    /// from `HEROKU_API_KEY` or the netrc file.
    pub fn from_env() -> HerokuResult<Self> {
        let config = HerokuConfig::load()?;
        Self::from_resolver(&CredentialResolver::from_env(), &config)
    }

    /// Create a client whose API key comes from `resolver`.
    pub fn from_resolver(
        resolver: &CredentialResolver,
        config: &HerokuConfig,
    ) -> HerokuResult<Self> {
        let credential = resolver.resolve()?;
        Self::new(credential, config)
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> HerokuResult<Self> {
        let config = HerokuConfig {
            api_url: base_url.into(),
            timeout,
            ..HerokuConfig::default()
        };
        Self::new(Credential::new(api_key), &config)
    }

    /// Replace the repository metadata client.
    pub fn with_github(mut self, github: GitHubClient) -> Self {
        self.github = github;
        self
    }

    /// Replace the time source used while polling builds.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the configured API endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and decode the JSON response.
    ///
    /// Every non-2xx response becomes [`HerokuError::Api`].
    #[instrument(skip(self, body))]
    pub async fn execute<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> HerokuResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header(ACCEPT, HEROKU_MEDIA_TYPE)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .bearer_auth(self.credential.expose());

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> HerokuResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            debug!("Response body: {}", truncate(&body, 200));
            serde_json::from_str(&body).map_err(HerokuError::from)
        } else {
            Err(api_error(status, &body))
        }
    }
}

/// Map a non-2xx response to an API error, preferring the platform's error
/// document, then any JSON body, then the raw text or reason phrase.
pub(crate) fn api_error(status: StatusCode, body: &str) -> HerokuError {
    let (id, message) = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(doc) => (doc.id, doc.message),
        Err(_) => match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => (None, value.to_string()),
            Err(_) if !body.trim().is_empty() => (None, body.trim().to_string()),
            Err(_) => (
                None,
                status.canonical_reason().unwrap_or("Unknown error").to_string(),
            ),
        },
    };

    warn!(
        status = status.as_u16(),
        id = id.as_deref().unwrap_or("-"),
        "API request failed: {}",
        message
    );

    HerokuError::Api {
        status: status.as_u16(),
        id,
        message,
    }
}

/// Encode a user-supplied identifier for use as a path segment.
pub(crate) fn segment(id_or_name: &str) -> String {
    urlencoding::encode(id_or_name).into_owned()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
