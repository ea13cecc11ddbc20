//! Process configuration for the REST server.
//!
//! Every value is read once at startup. `AppConfig::from_lookup` takes the variable
//! reader as a closure so tests can supply a map instead of the process environment.

use cid_core::config::{
    bool_from_env_value, origins_from_env_value, secs_from_env_value, usize_from_env_value,
};
use cid_core::constants::{
    DEFAULT_BLOCKLIST_DIR, DEFAULT_CATALOG_TIMEOUT, DEFAULT_CATALOG_TTL,
    DEFAULT_GEMINI_API_BASE, DEFAULT_GENERATION_TIMEOUT, DEFAULT_MIN_TEXT_CHARS,
    DEFAULT_MODEL_ID, GIVEN_NAMES_FILENAME, SURNAMES_FILENAME,
};
use cid_core::{CidError, CidResult, SuggestConfig};
use std::path::PathBuf;

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Origins the browser front end is served from.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "https://fhcflx.github.io",
    "http://localhost:5500",
    "http://127.0.0.1:5500",
    "null",
];

#[derive(Clone)]
pub struct AppConfig {
    pub rest_addr: String,
    pub allowed_origins: Vec<String>,
    pub blocklist_dir: PathBuf,
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub suggest: SuggestConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("rest_addr", &self.rest_addr)
            .field("allowed_origins", &self.allowed_origins)
            .field("blocklist_dir", &self.blocklist_dir)
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_api_base", &self.gemini_api_base)
            .field("suggest", &self.suggest)
            .finish()
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> CidResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from a variable reader.
    ///
    /// # Errors
    ///
    /// Returns `CidError::InvalidConfig` if `GEMINI_API_KEY` is missing or blank, or if
    /// any of the optional variables cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> CidResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CidError::InvalidConfig("GEMINI_API_KEY is not set".into()))?;

        let suggest = SuggestConfig::new(
            bool_from_env_value(
                "CID_SPECIALTY_REQUIRED",
                lookup("CID_SPECIALTY_REQUIRED"),
                false,
            )?,
            bool_from_env_value("CID_MODEL_SELECTION", lookup("CID_MODEL_SELECTION"), true)?,
            &lookup("CID_DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL_ID.into()),
            usize_from_env_value(
                "CID_MIN_TEXT_CHARS",
                lookup("CID_MIN_TEXT_CHARS"),
                DEFAULT_MIN_TEXT_CHARS,
            )?,
            secs_from_env_value(
                "CID_CATALOG_TTL_SECS",
                lookup("CID_CATALOG_TTL_SECS"),
                DEFAULT_CATALOG_TTL,
            )?,
            secs_from_env_value(
                "CID_CATALOG_TIMEOUT_SECS",
                lookup("CID_CATALOG_TIMEOUT_SECS"),
                DEFAULT_CATALOG_TIMEOUT,
            )?,
            secs_from_env_value(
                "CID_GENERATION_TIMEOUT_SECS",
                lookup("CID_GENERATION_TIMEOUT_SECS"),
                DEFAULT_GENERATION_TIMEOUT,
            )?,
        )?;

        Ok(Self {
            rest_addr: lookup("CID_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into()),
            allowed_origins: origins_from_env_value(
                lookup("CID_ALLOWED_ORIGINS"),
                &DEFAULT_ALLOWED_ORIGINS,
            ),
            blocklist_dir: lookup("CID_BLOCKLIST_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOCKLIST_DIR)),
            gemini_api_key,
            gemini_api_base: lookup("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.into()),
            suggest,
        })
    }

    /// The given-name and surname files, in load order.
    pub fn blocklist_files(&self) -> [PathBuf; 2] {
        [
            self.blocklist_dir.join(GIVEN_NAMES_FILENAME),
            self.blocklist_dir.join(SURNAMES_FILENAME),
        ]
    }
}
