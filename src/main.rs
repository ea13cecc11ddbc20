use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppConfig;

/// Main entry point for the CID suggestion service
///
/// Loads `.env`, resolves the configuration once and serves the REST API until the
/// server stops.
///
/// # Environment Variables
/// - `GEMINI_API_KEY`: credential for the Generative Language API (required)
/// - `GEMINI_API_BASE`: API base URL (default: the public v1beta endpoint)
/// - `CID_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CID_ALLOWED_ORIGINS`: comma-separated origin allow-list
/// - `CID_BLOCKLIST_DIR`: directory holding `nomes.txt` and `sobrenomes.txt` (default: "data")
/// - `CID_SPECIALTY_REQUIRED`, `CID_MODEL_SELECTION`, `CID_DEFAULT_MODEL`,
///   `CID_MIN_TEXT_CHARS`: request validation switches
/// - `CID_CATALOG_TTL_SECS`, `CID_CATALOG_TIMEOUT_SECS`, `CID_GENERATION_TIMEOUT_SECS`:
///   cache lifetime and upstream deadlines
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - `GEMINI_API_KEY` is missing or any variable is malformed,
/// - a blocklist file cannot be read,
/// - the server address cannot be bound, or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cid_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("cid_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(cid_core::CidError::InvalidConfig(msg)) => {
            anyhow::bail!("cannot start CID service: {msg}")
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("++ Starting CID suggestion service");
    tracing::debug!("configuration: {:?}", cfg);

    api_rest::serve(cfg).await.context("CID REST server stopped")
}
