//! Parsing of the model's free-text answer into suggestions.
//!
//! Models are asked for a bare JSON array but frequently wrap it in a markdown fence.
//! Fence markers are removed, the rest must parse as JSON, and each entry is then
//! checked on its own: entries with a missing or malformed code are dropped rather than
//! passed on to the browser.

use crate::{CidError, CidResult};
use cid_types::CidCode;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// A single ICD-10 suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidSuggestion {
    pub code: CidCode,
    pub description: String,
    pub justification: String,
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    #[serde(alias = "code", alias = "codigo")]
    cid: Option<String>,
    #[serde(alias = "description")]
    descricao: Option<String>,
    #[serde(alias = "justification")]
    justificativa: Option<String>,
}

/// Removes every ```` ```json ```` and ```` ``` ```` marker and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses the model's answer into validated suggestions.
///
/// Accepts a JSON array of suggestion objects, a single object, or an object with a
/// `suggestions` array. Duplicate codes keep their first occurrence.
///
/// # Errors
///
/// Returns `CidError::UpstreamFormat` if the text is not JSON, is JSON of the wrong
/// shape, or every entry of a non-empty list was rejected.
pub fn parse_suggestions(raw: &str) -> CidResult<Vec<CidSuggestion>> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| CidError::UpstreamFormat(format!("answer is not valid JSON: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("suggestions") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(CidError::UpstreamFormat(
                    "\"suggestions\" is not an array".into(),
                ))
            }
            None => vec![Value::Object(map)],
        },
        other => {
            return Err(CidError::UpstreamFormat(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = items.len();
    let mut seen = HashSet::new();
    let suggestions: Vec<CidSuggestion> = items
        .into_iter()
        .filter_map(validate_entry)
        .filter(|s| seen.insert(s.code.clone()))
        .collect();

    if total > 0 && suggestions.is_empty() {
        return Err(CidError::UpstreamFormat(format!(
            "none of the {total} suggested entries was usable"
        )));
    }
    if suggestions.len() < total {
        tracing::warn!(
            "dropped {} of {} suggestion entries",
            total - suggestions.len(),
            total
        );
    }

    Ok(suggestions)
}

fn validate_entry(item: Value) -> Option<CidSuggestion> {
    let raw: RawSuggestion = match serde_json::from_value(item) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("suggestion entry has the wrong shape: {}", e);
            return None;
        }
    };

    let code = match raw.cid.as_deref().map(CidCode::parse) {
        Some(Ok(code)) => code,
        Some(Err(e)) => {
            tracing::warn!("suggestion entry rejected: {}", e);
            return None;
        }
        None => {
            tracing::warn!("suggestion entry has no code");
            return None;
        }
    };

    let description = raw.descricao.unwrap_or_default().trim().to_string();
    if description.is_empty() {
        tracing::warn!("suggestion entry {} has no description", code);
        return None;
    }

    Some(CidSuggestion {
        code,
        description,
        justification: raw.justificativa.unwrap_or_default().trim().to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
