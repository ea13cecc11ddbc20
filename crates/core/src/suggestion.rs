//! ICD-10 suggestion pipeline.
//!
//! One request flows through these steps, stopping at the first failure:
//!
//! 1. field validation (text length, model, specialty per [`SuggestConfig`]);
//! 2. model lookup in the [`ModelCatalog`] when callers may pick a model;
//! 3. the personal-name [`Blocklist`], before any paid generation call;
//! 4. prompt composition and a generation call under a deadline;
//! 5. upstream safety verdict;
//! 6. parsing of the model's answer.
//!
//! Nothing is retried. Every error is terminal for the request.

use crate::blocklist::Blocklist;
use crate::catalog::ModelCatalog;
use crate::config::SuggestConfig;
use crate::error::{BlockSource, RequestProblem};
use crate::prompt::build_generation_request;
use crate::response::{parse_suggestions, CidSuggestion};
use crate::upstream::{Generation, TextGenerator, UpstreamError};
use crate::{CidError, CidResult};
use cid_types::{ClinicalText, NonEmptyText};
use std::sync::Arc;

/// A suggestion request as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub clinical_text: String,
    pub specialty: Option<String>,
    pub model_id: Option<String>,
}

/// Suggestions together with the model that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionResult {
    pub suggestions: Vec<CidSuggestion>,
    pub model_id: String,
}

/// Request fields after validation.
struct ValidatedRequest {
    text: ClinicalText,
    specialty: Option<NonEmptyText>,
    model_id: String,
}

#[derive(Clone)]
pub struct SuggestionService {
    cfg: Arc<SuggestConfig>,
    blocklist: Arc<Blocklist>,
    catalog: Arc<ModelCatalog>,
    generator: Arc<dyn TextGenerator>,
}

impl SuggestionService {
    pub fn new(
        cfg: Arc<SuggestConfig>,
        blocklist: Arc<Blocklist>,
        catalog: Arc<ModelCatalog>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            cfg,
            blocklist,
            catalog,
            generator,
        }
    }

    pub fn config(&self) -> &SuggestConfig {
        &self.cfg
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Runs the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// * `CidError::InvalidRequest` - missing/short text, missing model or specialty,
    ///   or a model not in the catalog.
    /// * `CidError::PolicyBlocked` - blocklist hit or upstream safety block.
    /// * `CidError::UpstreamUnavailable` - the catalog or generation call failed or timed
    ///   out.
    /// * `CidError::UpstreamFormat` - the provider answered, but without usable text or
    ///   with text that is not a suggestion list.
    pub async fn suggest(&self, req: SuggestionRequest) -> CidResult<SuggestionResult> {
        let validated = self.validate(req)?;

        if self.cfg.model_selection_enabled()
            && !self.catalog.contains(&validated.model_id).await?
        {
            tracing::warn!("rejected unknown model {}", validated.model_id);
            return Err(CidError::InvalidRequest(RequestProblem::UnknownModel(
                validated.model_id,
            )));
        }

        if self
            .blocklist
            .contains_blocked_token(validated.text.as_str())
            .is_some()
        {
            tracing::warn!("clinical text matched the personal-name blocklist");
            return Err(CidError::PolicyBlocked(BlockSource::Blocklist));
        }

        let request = build_generation_request(
            &validated.model_id,
            &validated.text,
            validated.specialty.as_ref(),
        );

        tracing::debug!("sending prompt to model {}", request.model_id);
        let deadline = self.cfg.generation_timeout();
        let generation = match tokio::time::timeout(deadline, self.generator.generate(&request)).await
        {
            Ok(Ok(generation)) => generation,
            Ok(Err(UpstreamError::Decode(detail))) => {
                tracing::error!("generation answer could not be used: {}", detail);
                return Err(CidError::UpstreamFormat(detail));
            }
            Ok(Err(e)) => {
                tracing::error!("generation call failed: {:?}", e);
                return Err(e.into());
            }
            Err(_) => {
                tracing::error!("generation call timed out after {:?}", deadline);
                return Err(UpstreamError::Timeout.into());
            }
        };

        let raw = match generation {
            Generation::Text(raw) => raw,
            Generation::Blocked { reason } => {
                tracing::warn!("upstream blocked the request: {}", reason);
                return Err(CidError::PolicyBlocked(BlockSource::Upstream { reason }));
            }
        };

        let suggestions = parse_suggestions(&raw).inspect_err(|e| {
            tracing::error!("could not parse model answer: {}; raw answer: {:?}", e, raw);
        })?;

        tracing::debug!("returning {} suggestions", suggestions.len());
        Ok(SuggestionResult {
            suggestions,
            model_id: validated.model_id,
        })
    }

    fn validate(&self, req: SuggestionRequest) -> CidResult<ValidatedRequest> {
        let text = ClinicalText::new(&req.clinical_text, self.cfg.min_text_chars())?;

        let specialty = NonEmptyText::optional(req.specialty);
        if self.cfg.specialty_required() && specialty.is_none() {
            return Err(CidError::InvalidRequest(RequestProblem::MissingSpecialty));
        }

        let model_id = if self.cfg.model_selection_enabled() {
            NonEmptyText::optional(req.model_id)
                .ok_or(CidError::InvalidRequest(RequestProblem::MissingModel))?
                .into_inner()
        } else {
            self.cfg.default_model().to_string()
        };

        Ok(ValidatedRequest {
            text,
            specialty,
            model_id,
        })
    }
}
