//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services.
//! Nothing in this crate reads environment variables during request handling; the
//! `*_from_env_value` helpers take the raw `Option<String>` so the binaries do the
//! reading and tests can exercise parsing without touching process state.

use crate::constants::{
    DEFAULT_CATALOG_TIMEOUT, DEFAULT_CATALOG_TTL, DEFAULT_GENERATION_TIMEOUT,
    DEFAULT_MIN_TEXT_CHARS, DEFAULT_MODEL_ID,
};
use crate::{CidError, CidResult};
use cid_types::NonEmptyText;
use std::time::Duration;

/// Behaviour switches and limits of the suggestion pipeline.
#[derive(Clone, Debug)]
pub struct SuggestConfig {
    specialty_required: bool,
    model_selection_enabled: bool,
    default_model: String,
    min_text_chars: usize,
    catalog_ttl: Duration,
    catalog_timeout: Duration,
    generation_timeout: Duration,
}

impl SuggestConfig {
    /// Create a new `SuggestConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CidError::InvalidConfig` if the default model is blank or either timeout
    /// is zero.
    pub fn new(
        specialty_required: bool,
        model_selection_enabled: bool,
        default_model: &str,
        min_text_chars: usize,
        catalog_ttl: Duration,
        catalog_timeout: Duration,
        generation_timeout: Duration,
    ) -> CidResult<Self> {
        let default_model = NonEmptyText::new(default_model)
            .map_err(|_| CidError::InvalidConfig("default model cannot be empty".into()))?
            .into_inner();

        if catalog_timeout.is_zero() || generation_timeout.is_zero() {
            return Err(CidError::InvalidConfig(
                "upstream timeouts must be greater than zero".into(),
            ));
        }

        Ok(Self {
            specialty_required,
            model_selection_enabled,
            default_model,
            min_text_chars,
            catalog_ttl,
            catalog_timeout,
            generation_timeout,
        })
    }

    pub fn specialty_required(&self) -> bool {
        self.specialty_required
    }

    pub fn model_selection_enabled(&self) -> bool {
        self.model_selection_enabled
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn min_text_chars(&self) -> usize {
        self.min_text_chars
    }

    pub fn catalog_ttl(&self) -> Duration {
        self.catalog_ttl
    }

    pub fn catalog_timeout(&self) -> Duration {
        self.catalog_timeout
    }

    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            specialty_required: false,
            model_selection_enabled: true,
            default_model: DEFAULT_MODEL_ID.to_string(),
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            catalog_ttl: DEFAULT_CATALOG_TTL,
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a boolean switch from an optional string value.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off` in any case. `None` or blank
/// yields `default`.
pub fn bool_from_env_value(name: &str, value: Option<String>, default: bool) -> CidResult<bool> {
    let Some(value) = present(value) else {
        return Ok(default);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(CidError::InvalidConfig(format!(
            "{name} must be a boolean, got {other:?}"
        ))),
    }
}

/// Parse a whole number of seconds from an optional string value.
pub fn secs_from_env_value(
    name: &str,
    value: Option<String>,
    default: Duration,
) -> CidResult<Duration> {
    let Some(value) = present(value) else {
        return Ok(default);
    };

    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| CidError::InvalidConfig(format!("{name} must be a number of seconds")))
}

/// Parse a non-negative count from an optional string value.
pub fn usize_from_env_value(name: &str, value: Option<String>, default: usize) -> CidResult<usize> {
    let Some(value) = present(value) else {
        return Ok(default);
    };

    value
        .parse::<usize>()
        .map_err(|_| CidError::InvalidConfig(format!("{name} must be a non-negative integer")))
}

/// Parse a comma-separated origin allow-list.
///
/// Entries are trimmed and a trailing `/` is dropped, since browsers never send one in
/// the `Origin` header. `None` or blank yields `default`.
pub fn origins_from_env_value(value: Option<String>, default: &[&str]) -> Vec<String> {
    match present(value) {
        Some(raw) => raw
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect(),
        None => default.iter().map(|o| o.to_string()).collect(),
    }
}
