//! # CID Core
//!
//! Core logic of the CID-10 suggestion service:
//! - [`blocklist`]: personal-name filter applied before text leaves the process
//! - [`catalog`]: TTL cache of the provider's model list
//! - [`suggestion`]: the request → prompt → model → parsed suggestions pipeline
//! - [`upstream`]: provider seams and the Gemini REST adapter
//!
//! **No HTTP-server concerns**: routing, CORS and status codes belong in `api-rest`.

pub mod blocklist;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod prompt;
pub mod response;
pub mod suggestion;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_support;

pub use blocklist::Blocklist;
pub use catalog::{ModelCatalog, ModelDescriptor};
pub use clock::{Clock, SystemClock};
pub use config::SuggestConfig;
pub use error::{BlockSource, CidError, CidResult, RequestProblem};
pub use response::CidSuggestion;
pub use suggestion::{SuggestionRequest, SuggestionResult, SuggestionService};
pub use upstream::{GeminiClient, UpstreamError};

pub use cid_types::{CidCode, ClinicalText, NonEmptyText, TextError};
