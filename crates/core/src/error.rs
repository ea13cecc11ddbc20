use crate::upstream::UpstreamError;

/// Where a policy block originated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSource {
    /// The local name blocklist matched a token of the clinical text.
    Blocklist,
    /// The AI provider refused the prompt or stopped the answer on safety grounds.
    Upstream { reason: String },
}

/// Why a suggestion request was rejected before reaching the provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestProblem {
    #[error("clinical text is required")]
    MissingText,
    #[error("clinical text must have at least {min} characters")]
    TextTooShort { min: usize },
    #[error("model is required")]
    MissingModel,
    #[error("specialty is required")]
    MissingSpecialty,
    #[error("model {0} is not available")]
    UnknownModel(String),
    #[error("malformed request: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CidError {
    #[error("invalid request: {0}")]
    InvalidRequest(RequestProblem),
    #[error("request blocked by content policy ({0:?})")]
    PolicyBlocked(BlockSource),
    #[error("upstream provider unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),
    #[error("upstream returned an unusable answer: {0}")]
    UpstreamFormat(String),

    #[error("failed to read blocklist file {path}: {source}", path = path.display())]
    BlocklistRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<cid_types::TextError> for CidError {
    fn from(err: cid_types::TextError) -> Self {
        let problem = match err {
            cid_types::TextError::Empty => RequestProblem::MissingText,
            cid_types::TextError::TooShort { min, .. } => RequestProblem::TextTooShort { min },
            other => RequestProblem::Malformed(other.to_string()),
        };
        CidError::InvalidRequest(problem)
    }
}

pub type CidResult<T> = std::result::Result<T, CidError>;
