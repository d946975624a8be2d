//! API token resolution.
//!
//! Order: the `HEROKU_API_KEY` environment variable, then the `api.heroku.com`
//! entry of the user's netrc file (`$NETRC` or `~/.netrc`). The token lives in
//! the entry's password slot.

use crate::error::CredentialError;
use crate::netrc::Netrc;
use secrecy::{ExposeSecret, SecretString};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding the API token.
pub const API_KEY_ENV: &str = "HEROKU_API_KEY";

/// Host key of the platform API in the netrc file.
pub const API_HOST: &str = "api.heroku.com";

/// Environment variable overriding the netrc location.
pub const NETRC_ENV: &str = "NETRC";

/// Bearer token for the platform API.
///
/// Wrapped in `SecretString` so it never shows up in debug output.
#[derive(Clone, Debug)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Where a credential was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Netrc(PathBuf),
}

/// Resolves the API token from its configured sources.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    env_token: Option<String>,
    netrc_path: Option<PathBuf>,
    host: String,
}

impl CredentialResolver {
    /// Resolver with explicit inputs.
    pub fn new(env_token: Option<String>, netrc_path: Option<PathBuf>) -> Self {
        Self {
            env_token,
            netrc_path,
            host: API_HOST.to_string(),
        }
    }

    /// Resolver reading the process environment and the user's home directory.
    pub fn from_env() -> Self {
        let netrc_path = std::env::var_os(NETRC_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".netrc")));

        Self::new(std::env::var(API_KEY_ENV).ok(), netrc_path)
    }

    /// Look up a different host in the netrc file.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn resolve(&self) -> Result<Credential, CredentialError> {
        self.resolve_with_source().map(|(credential, _)| credential)
    }

    pub fn resolve_with_source(&self) -> Result<(Credential, CredentialSource), CredentialError> {
        if let Some(token) = self.env_token.as_deref().filter(|t| !t.is_empty()) {
            debug!("Using API key from {}", API_KEY_ENV);
            return Ok((Credential::new(token), CredentialSource::Environment));
        }

        if let Some(path) = &self.netrc_path {
            if let Some(token) = self.read_netrc(path)? {
                debug!(path = %path.display(), "Using API key from netrc");
                return Ok((Credential::new(token), CredentialSource::Netrc(path.clone())));
            }
        }

        Err(CredentialError::Missing {
            env_var: API_KEY_ENV,
            host: self.host.clone(),
        })
    }

    fn read_netrc(&self, path: &Path) -> Result<Option<String>, CredentialError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No netrc file");
                return Ok(None);
            }
            Err(source) => {
                return Err(CredentialError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let netrc = Netrc::parse(&contents).map_err(|e| CredentialError::Parse {
            path: path.to_path_buf(),
            line: e.line,
            message: e.message,
        })?;

        Ok(netrc
            .machine(&self.host)
            .and_then(|auth| auth.password.clone())
            .filter(|token| !token.is_empty()))
    }
}
