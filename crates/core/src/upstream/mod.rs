//! Upstream AI provider seams.
//!
//! The pipeline only talks to the provider through [`ModelSource`] and [`TextGenerator`],
//! so tests can substitute in-process fakes and no network is needed to exercise the
//! catalog or the suggestion flow.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

/// Errors reaching or talking to the upstream provider.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The call did not finish before its deadline.
    #[error("upstream call timed out")]
    Timeout,
    /// The request never got an HTTP answer (DNS, TLS, connection reset, ...).
    #[error("transport error: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("upstream returned status {code}: {body}")]
    Status { code: u16, body: String },
    /// The provider answered 2xx but the envelope could not be decoded.
    #[error("failed to decode upstream envelope: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

/// One entry of the provider's model listing, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Resource name, e.g. `models/gemini-1.5-pro`.
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub supported_generation_methods: Vec<String>,
}

/// Harm categories the provider filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmCategory {
    Harassment,
    HateSpeech,
    SexuallyExplicit,
    DangerousContent,
}

impl HarmCategory {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockThreshold {
    BlockMediumAndAbove,
}

impl BlockThreshold {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            BlockThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

/// Safety thresholds applied to every generation call.
pub const SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting {
        category: HarmCategory::Harassment,
        threshold: BlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::HateSpeech,
        threshold: BlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::SexuallyExplicit,
        threshold: BlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::DangerousContent,
        threshold: BlockThreshold::BlockMediumAndAbove,
    },
];

/// A fully composed generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model_id: String,
    pub system_instruction: String,
    pub prompt: String,
    pub safety_settings: Vec<SafetySetting>,
}

/// What the provider made of a generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Raw model text, possibly wrapped in markdown fences.
    Text(String),
    /// The provider refused on its own safety grounds.
    Blocked { reason: String },
}

/// Lists the models the provider offers.
#[async_trait]
pub trait ModelSource: Send + Sync {
    async fn list_models(&self) -> Result<Vec<CatalogEntry>, UpstreamError>;
}

/// Runs a single text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, UpstreamError>;
}
