//! # API REST
//!
//! REST API for the CID suggestion service.
//!
//! Handles:
//! - HTTP endpoints with axum (`/models`, `/sugerir-cid`, `/health`)
//! - OpenAPI document at `/api-docs/openapi.json`
//! - Origin allow-list and CORS
//! - Mapping core errors to status codes and `{ "error": ... }` bodies
//!
//! Uses `api-shared` for wire types and `cid-core` for the pipeline itself.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod origin;
pub mod routes;

pub use config::AppConfig;
pub use error::ApiError;
pub use origin::AllowedOrigins;
pub use routes::{router, ApiDoc, AppState};

use cid_core::{
    Blocklist, CidResult, GeminiClient, ModelCatalog, SuggestionService, SystemClock,
};
use std::sync::Arc;

impl AppState {
    /// Wires the production pipeline: blocklist files, Gemini client and catalog cache.
    ///
    /// # Errors
    ///
    /// Returns `CidError::BlocklistRead` if either blocklist file cannot be read.
    pub fn from_config(cfg: &AppConfig) -> CidResult<Self> {
        let blocklist = Blocklist::load_files(&cfg.blocklist_files())?;
        let gemini = Arc::new(GeminiClient::new(
            cfg.gemini_api_key.clone(),
            cfg.gemini_api_base.clone(),
        ));
        let catalog = ModelCatalog::new(
            gemini.clone(),
            Arc::new(SystemClock),
            cfg.suggest.catalog_ttl(),
            cfg.suggest.catalog_timeout(),
        );

        Ok(Self {
            service: SuggestionService::new(
                Arc::new(cfg.suggest.clone()),
                Arc::new(blocklist),
                Arc::new(catalog),
                gemini,
            ),
        })
    }
}

/// Binds `cfg.rest_addr` and serves the router until the server fails.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be wired, the address cannot be bound, or
/// the server stops with an I/O error.
pub async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&cfg)?;
    let app = router(state, AllowedOrigins::new(cfg.allowed_origins.clone()));

    tracing::info!("-- Starting CID REST API on {}", cfg.rest_addr);
    tracing::info!("-- Allowed origins: {:?}", cfg.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&cfg.rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
