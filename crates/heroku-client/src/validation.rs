//! Local input validation. Nothing here performs I/O.

use crate::error::{HerokuError, HerokuResult};
use regex::Regex;
use std::sync::LazyLock;

/// Platform rule for app names: 3-30 characters, lowercase letter first,
/// lowercase alphanumerics or hyphens, no trailing hyphen.
static APP_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]{1,28}[a-z0-9]$").unwrap());

pub fn is_valid_app_name(name: &str) -> bool {
    APP_NAME_REGEX.is_match(name)
}

pub fn validate_app_name(name: &str) -> HerokuResult<()> {
    if is_valid_app_name(name) {
        Ok(())
    } else {
        Err(HerokuError::Validation(format!(
            "Improper app name '{name}'. Names must be 3 to 30 characters, begin with a \
             lowercase letter and contain only lowercase letters, numbers and hyphens, \
             ending with a letter or number"
        )))
    }
}

/// Read an optional boolean field from loosely-typed input.
pub(crate) fn optional_bool(value: &serde_json::Value, field: &str) -> HerokuResult<Option<bool>> {
    match value.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(HerokuError::Validation(format!(
            "'{field}' must be a boolean, got {other}"
        ))),
    }
}

/// Read an optional string field from loosely-typed input.
pub(crate) fn optional_string(
    value: &serde_json::Value,
    field: &str,
) -> HerokuResult<Option<String>> {
    match value.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(HerokuError::Validation(format!(
            "'{field}' must be a string, got {other}"
        ))),
    }
}
