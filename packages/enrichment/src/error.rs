use thiserror::Error;

/// Fatal failures of an enrichment call.
///
/// Any of these on the label lookup path ends the pipeline and is surfaced
/// to the caller through `EnrichmentResult::error`.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("label source request failed: {0}")]
    LabelRequest(#[from] reqwest::Error),

    #[error("label source error (status {status}): {message}")]
    LabelApi { status: u16, message: String },

    #[error("failed to parse label source response: {0}")]
    LabelResponseParse(String),

    #[error("no label records found for '{0}'")]
    NoResults(String),
}

/// Failure modes of the summarization call.
///
/// Non-fatal by contract: these never fail the enrichment, they are rendered
/// into the result's `summary` field as `LLM summarization failed: <reason>`.
/// `Timeout` carries the configured timeout so the diagnostic stays truthful
/// when the default is overridden.
#[derive(Debug, Error)]
pub enum SummaryFailure {
    #[error("Request timeout (>{0}s)")]
    Timeout(u64),

    #[error("Connection failed: {0}")]
    ConnectionFailure(String),

    #[error("Service returned status {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, EnrichmentError>;
