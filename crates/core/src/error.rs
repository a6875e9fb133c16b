use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("keyword must not be empty")]
    EmptyKeyword,

    #[error("recency window must be 10, 20 or 30 days, got {0}")]
    UnsupportedRecency(u32),

    #[error("max results must be between 1 and 100, got {0}")]
    MaxResultsOutOfRange(u32),

    #[error("an API key is required")]
    MissingApiKey,

    #[error("invalid API base url: {0}")]
    InvalidBaseUrl(String),

    #[error("sorting by virality requires the virality score to be enabled")]
    ViralitySortDisabled,

    #[error("viral threshold must be a finite non-negative number, got {0}")]
    InvalidViralThreshold(f64),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request rejected with status {status} ({reason}): {message}")]
    Rejected {
        status: u16,
        reason: String,
        message: String,
    },

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid analysis request: {0}")]
    Invalid(#[from] ValidationError),

    #[error("analysis failed: {0}")]
    Failed(#[from] ApiError),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
