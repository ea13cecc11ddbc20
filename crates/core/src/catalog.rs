//! Model catalog cache.
//!
//! Holds the list of generative models offered by the upstream provider, filtered to
//! the ones usable for text suggestions and ranked by preference. The list is fetched
//! lazily and kept for a fixed TTL; the first call after expiry pays the fetch latency.
//!
//! ## Refresh rules
//!
//! - A non-empty list younger than the TTL is returned as-is (same `Arc`).
//! - Otherwise the provider is asked again under a deadline, the result is filtered and
//!   sorted, and it replaces the previous list wholesale.
//! - Refreshes are serialised behind an async mutex, so callers arriving while a fetch
//!   is in flight wait for it instead of starting their own.
//! - A failed fetch leaves the previous snapshot untouched and is reported to the caller;
//!   there is no retry.

use crate::clock::Clock;
use crate::upstream::{CatalogEntry, ModelSource, UpstreamError};
use crate::CidResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Substring every usable model id must contain.
const FAMILY_MARKER: &str = "gemini";

/// Generation method required for text suggestions.
const TEXT_GENERATION_METHOD: &str = "generateContent";

/// Model variants that are not general text models.
const EXCLUDED_MARKERS: &[&str] = &["image", "nano", "robotics"];

/// Resource-name prefix stripped from upstream model names.
const MODEL_NAME_PREFIX: &str = "models/";

/// A model offered to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: String,
    pub display_name: String,
    pub description: String,
}

#[derive(Debug)]
struct Snapshot {
    models: Arc<[ModelDescriptor]>,
    fetched_at: DateTime<Utc>,
}

pub struct ModelCatalog {
    source: Arc<dyn ModelSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    fetch_timeout: Duration,
    state: Mutex<Option<Snapshot>>,
}

impl ModelCatalog {
    pub fn new(
        source: Arc<dyn ModelSource>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            ttl,
            fetch_timeout,
            state: Mutex::new(None),
        }
    }

    /// Returns the current model list, refreshing it from upstream when stale.
    ///
    /// # Errors
    ///
    /// Returns `CidError::UpstreamUnavailable` if the provider call fails or does not
    /// answer within the fetch deadline.
    pub async fn get_available_models(&self) -> CidResult<Arc<[ModelDescriptor]>> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        if let Some(snapshot) = state.as_ref() {
            if !snapshot.models.is_empty() && self.is_fresh(snapshot, now) {
                tracing::debug!("serving model catalog from cache");
                return Ok(Arc::clone(&snapshot.models));
            }
        }

        tracing::info!("fetching model catalog from upstream");
        let entries = match tokio::time::timeout(self.fetch_timeout, self.source.list_models())
            .await
        {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                tracing::error!("model catalog fetch failed: {:?}", e);
                return Err(e.into());
            }
            Err(_) => {
                tracing::error!(
                    "model catalog fetch timed out after {:?}",
                    self.fetch_timeout
                );
                return Err(UpstreamError::Timeout.into());
            }
        };

        let models: Arc<[ModelDescriptor]> = select_models(entries).into();
        tracing::info!("model catalog refreshed with {} models", models.len());

        *state = Some(Snapshot {
            models: Arc::clone(&models),
            fetched_at: now,
        });

        Ok(models)
    }

    /// Whether `model_id` is in the current catalog (refreshing it if stale).
    pub async fn contains(&self, model_id: &str) -> CidResult<bool> {
        let models = self.get_available_models().await?;
        Ok(models.iter().any(|m| m.id == model_id))
    }

    fn is_fresh(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> bool {
        // A clock that went backwards yields a negative age; treat it as fresh.
        match (now - snapshot.fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }
}

/// Filters upstream entries down to usable text models and sorts them by preference.
pub fn select_models(entries: Vec<CatalogEntry>) -> Vec<ModelDescriptor> {
    let mut models: Vec<ModelDescriptor> = entries
        .into_iter()
        .filter(is_usable_text_model)
        .map(|entry| ModelDescriptor {
            id: entry
                .name
                .strip_prefix(MODEL_NAME_PREFIX)
                .unwrap_or(&entry.name)
                .to_string(),
            display_name: entry.display_name,
            description: entry.description,
        })
        .collect();

    models.sort_by(|a, b| {
        priority_score(&b.id)
            .cmp(&priority_score(&a.id))
            .then_with(|| {
                a.display_name
                    .to_lowercase()
                    .cmp(&b.display_name.to_lowercase())
            })
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    models
}

fn is_usable_text_model(entry: &CatalogEntry) -> bool {
    let id = entry.name.to_lowercase();
    id.contains(FAMILY_MARKER)
        && entry
            .supported_generation_methods
            .iter()
            .any(|m| m == TEXT_GENERATION_METHOD)
        && !EXCLUDED_MARKERS.iter().any(|marker| id.contains(marker))
}

/// Preference score of a model id; higher sorts first.
///
/// `-latest` aliases beat pinned versions, the 1.5 generation beats older ones, and the
/// fast tier is preferred over the capability tier.
pub fn priority_score(model_id: &str) -> u32 {
    let mut score = 0;
    if model_id.contains("-latest") {
        score += 100;
    }
    if model_id.contains("1.5") {
        score += 50;
    }
    if model_id.contains("flash") {
        score += 20;
    }
    if model_id.contains("pro") {
        score += 10;
    }
    score
}
