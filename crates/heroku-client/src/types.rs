//! Platform API types.

use crate::error::{HerokuError, HerokuResult};
use crate::validation::{optional_bool, optional_string};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Server fields the client passes through without interpreting.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Application as represented by the platform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppRecord {
    /// Platform-assigned identifier
    pub id: String,

    /// Human-assigned name
    pub name: String,

    /// Whether the app is in maintenance mode
    #[serde(default)]
    pub maintenance: bool,

    /// Additional fields
    #[serde(flatten)]
    pub extra: Extra,
}

/// Fields to change on an app. At least one must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<bool>,
}

impl AppUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn maintenance(mut self, enabled: bool) -> Self {
        self.maintenance = Some(enabled);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.maintenance.is_none()
    }

    /// Build an update from loosely-typed input such as a decoded request body.
    ///
    /// Rejects a non-boolean `maintenance` or a non-string `name`. Emptiness is
    /// checked later, by [`crate::HerokuClient::update_app`].
    pub fn from_json(value: &serde_json::Value) -> HerokuResult<Self> {
        if !value.is_object() {
            return Err(HerokuError::Validation(format!(
                "app update must be an object, got {value}"
            )));
        }

        Ok(Self {
            name: optional_string(value, "name")?,
            maintenance: optional_bool(value, "maintenance")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateAppRequest<'a> {
    pub name: &'a str,
}

/// Integrity checksum of a source archive, sent as `SHA256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    hex: String,
}

impl Checksum {
    const PREFIX: &'static str = "SHA256:";

    /// Accept a hex SHA-256 digest, with or without the `SHA256:` prefix.
    pub fn sha256(digest: &str) -> HerokuResult<Self> {
        let digest = digest.trim();
        let hex_part = match digest.get(..Self::PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(Self::PREFIX) => {
                &digest[Self::PREFIX.len()..]
            }
            _ => digest,
        };

        let bytes = hex::decode(hex_part).map_err(|e| {
            HerokuError::Validation(format!("checksum is not valid hex: {e}"))
        })?;
        if bytes.len() != 32 {
            return Err(HerokuError::Validation(format!(
                "SHA-256 checksum must be 32 bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self {
            hex: hex::encode(bytes),
        })
    }

    /// Compute the checksum of an archive's contents.
    pub fn of(archive: &[u8]) -> Self {
        Self {
            hex: hex::encode(Sha256::digest(archive)),
        }
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.hex)
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Where the platform fetches build source from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBlob {
    /// Archive URL
    pub url: String,

    /// Version label recorded with the build
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Archive checksum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,
}

impl SourceBlob {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            version: None,
            checksum: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateBuildRequest<'a> {
    pub source_blob: &'a SourceBlob,
}

/// Build status. Anything other than `pending` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    Pending,
    Succeeded,
    Failed,
    Other(String),
}

impl BuildStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, BuildStatus::Pending)
    }

    pub fn as_str(&self) -> &str {
        match self {
            BuildStatus::Pending => "pending",
            BuildStatus::Succeeded => "succeeded",
            BuildStatus::Failed => "failed",
            BuildStatus::Other(s) => s,
        }
    }
}

impl From<String> for BuildStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => BuildStatus::Pending,
            "succeeded" => BuildStatus::Succeeded,
            "failed" => BuildStatus::Failed,
            _ => BuildStatus::Other(s),
        }
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the app owning a build.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppRef {
    pub id: String,
    pub name: Option<String>,
}

/// Source information echoed back on a build.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildSource {
    pub url: Option<String>,
    pub version: Option<String>,
    pub checksum: Option<String>,
}

/// Build as represented by the platform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildRecord {
    pub id: String,
    pub app: AppRef,
    pub status: BuildStatus,
    pub source_blob: Option<BuildSource>,
    pub output_stream_url: Option<String>,

    /// Additional fields
    #[serde(flatten)]
    pub extra: Extra,
}

/// Error document returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub id: Option<String>,
    pub message: String,
}
