//! Google Generative Language (Gemini) REST adapter.
//!
//! Implements [`ModelSource`] over `GET /models` and [`TextGenerator`] over
//! `POST /models/{model}:generateContent`. Deadlines are owned by the callers in the
//! core crate, not by this client.

use super::{
    CatalogEntry, Generation, GenerationRequest, ModelSource, TextGenerator, UpstreamError,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Candidate finish reasons that mean the answer was withheld for policy reasons.
const POLICY_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

const API_KEY_HEADER: &str = "x-goog-api-key";
const MODELS_PAGE_SIZE: &str = "1000";

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    fn generate_url(&self, model_id: &str) -> String {
        let model_id = model_id.strip_prefix("models/").unwrap_or(model_id);
        format!("{}/models/{}:generateContent", self.base_url, model_id)
    }

    async fn fetch_models_page(
        &self,
        page_token: Option<&str>,
    ) -> Result<ListModelsResponse, UpstreamError> {
        let mut request = self
            .http
            .get(self.models_url())
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("pageSize", MODELS_PAGE_SIZE)]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                code: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<ListModelsResponse>().await?)
    }
}

#[async_trait]
impl ModelSource for GeminiClient {
    async fn list_models(&self) -> Result<Vec<CatalogEntry>, UpstreamError> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_models_page(page_token.as_deref()).await?;
            entries.extend(page.models.into_iter().map(CatalogEntry::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, UpstreamError> {
        let body = GenerateContentRequest::from(request);

        let response = self
            .http
            .post(self.generate_url(&request.model_id))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let envelope = response.json::<GenerateContentResponse>().await?;
        interpret_generate_response(envelope)
    }
}

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ApiModel>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiModel {
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl From<ApiModel> for CatalogEntry {
    fn from(model: ApiModel) -> Self {
        CatalogEntry {
            name: model.name,
            display_name: model.display_name,
            description: model.description,
            supported_generation_methods: model.supported_generation_methods,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    safety_settings: Vec<ApiSafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

impl<'a> From<&'a GenerationRequest> for GenerateContentRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system_instruction,
                }],
            },
            safety_settings: request
                .safety_settings
                .iter()
                .map(|s| ApiSafetySetting {
                    category: s.category.as_api_str(),
                    threshold: s.threshold.as_api_str(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Turns a decoded `generateContent` envelope into a [`Generation`].
///
/// A prompt-level `blockReason` or a first candidate stopped for policy reasons is a
/// block; otherwise the text parts of the first candidate are concatenated.
fn interpret_generate_response(
    envelope: GenerateContentResponse,
) -> Result<Generation, UpstreamError> {
    if let Some(reason) = envelope
        .prompt_feedback
        .and_then(|f| f.block_reason)
        .filter(|r| !r.is_empty())
    {
        return Ok(Generation::Blocked { reason });
    }

    let candidate = envelope
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamError::Decode("response has no candidates".into()))?;

    if let Some(reason) = candidate
        .finish_reason
        .as_deref()
        .filter(|r| POLICY_FINISH_REASONS.contains(r))
    {
        return Ok(Generation::Blocked {
            reason: reason.to_string(),
        });
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(UpstreamError::Decode(format!(
            "candidate has no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("none")
        )));
    }

    Ok(Generation::Text(text))
}
