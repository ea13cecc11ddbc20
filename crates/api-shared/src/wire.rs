//! JSON wire types.
//!
//! Field names follow the existing browser front end (`texto`, `especialidade`,
//! `modelName`, `cid`, `descricao`, `justificativa`), so they are fixed by the client
//! rather than by Rust naming.

use cid_core::{CidSuggestion, ModelDescriptor, SuggestionRequest, SuggestionResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of every non-2xx answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// One entry of `GET /models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModelRes {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<&ModelDescriptor> for ModelRes {
    fn from(model: &ModelDescriptor) -> Self {
        Self {
            id: model.id.clone(),
            name: model.display_name.clone(),
            description: model.description.clone(),
        }
    }
}

/// Body of `POST /sugerir-cid`.
///
/// Every field is optional at the JSON level so that missing values are reported by the
/// pipeline as a 400 with a readable message, not as a deserialisation rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuggestCidReq {
    #[serde(rename = "texto", default)]
    pub text: Option<String>,
    #[serde(rename = "especialidade", default)]
    pub specialty: Option<String>,
    #[serde(rename = "modelName", default)]
    pub model_name: Option<String>,
}

impl From<SuggestCidReq> for SuggestionRequest {
    fn from(req: SuggestCidReq) -> Self {
        SuggestionRequest {
            clinical_text: req.text.unwrap_or_default(),
            specialty: req.specialty,
            model_id: req.model_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CidSuggestionRes {
    pub cid: String,
    pub descricao: String,
    pub justificativa: String,
}

impl From<CidSuggestion> for CidSuggestionRes {
    fn from(suggestion: CidSuggestion) -> Self {
        Self {
            cid: suggestion.code.to_string(),
            descricao: suggestion.description,
            justificativa: suggestion.justification,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuggestCidRes {
    pub suggestions: Vec<CidSuggestionRes>,
    #[serde(rename = "modelName")]
    pub model_name: String,
}

impl From<SuggestionResult> for SuggestCidRes {
    fn from(result: SuggestionResult) -> Self {
        Self {
            suggestions: result.suggestions.into_iter().map(Into::into).collect(),
            model_name: result.model_id,
        }
    }
}
