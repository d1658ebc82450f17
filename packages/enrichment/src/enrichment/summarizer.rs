use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::enrichment::config::SummaryConfig;
use crate::error::{EnrichmentError, Result, SummaryFailure};

/// Role of a message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Trait for summarization clients, enabling mocking in tests.
///
/// Failures are `SummaryFailure`, never `EnrichmentError`: the caller folds
/// them into the result's `summary` field instead of failing the request.
#[async_trait]
pub trait SummaryClient: Send + Sync {
    async fn summarize(&self, prompt: &str) -> std::result::Result<String, SummaryFailure>;
}

/// Anthropic API client implementation.
///
/// NOTE: Do NOT derive `Debug` on this struct — `api_key` would be exposed.
/// If Debug is needed, implement it manually with the key redacted.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model: String,
    max_tokens: u32,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicErrorResponse {
    error: Option<AnthropicErrorDetail>,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

impl AnthropicClient {
    pub fn new(config: &SummaryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EnrichmentError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        })
    }

    fn classify_transport_error(&self, e: reqwest::Error) -> SummaryFailure {
        if e.is_timeout() {
            SummaryFailure::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            SummaryFailure::ConnectionFailure(e.to_string())
        } else {
            SummaryFailure::Unknown(e.to_string())
        }
    }
}

#[async_trait]
impl SummaryClient for AnthropicClient {
    /// Exactly one attempt: no retries, no backoff. A caller wanting
    /// resilience re-invokes the whole enrichment.
    async fn summarize(&self, prompt: &str) -> std::result::Result<String, SummaryFailure> {
        let url = format!("{}/v1/messages", self.api_base_url);

        let messages = [Message {
            role: Role::User,
            content: prompt.to_string(),
        }];

        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: &messages,
        };

        debug!(model = %self.model, max_tokens = self.max_tokens, "sending summarization request");

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicErrorResponse>(&body_text)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or(body_text);
            return Err(SummaryFailure::ServiceError { status, message });
        }

        let api_response: AnthropicResponse = resp
            .json()
            .await
            .map_err(|e| SummaryFailure::MalformedResponse(e.to_string()))?;

        api_response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                SummaryFailure::MalformedResponse("response contained no text content".into())
            })
    }
}

/// Test utilities for the summarization client.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock summarization client. Returns pre-configured outcomes in order
    /// and counts how many calls were issued, so tests can assert that
    /// skipped summarization never reaches the service.
    pub struct MockSummaryClient {
        responses: Mutex<Vec<std::result::Result<String, SummaryFailure>>>,
        calls: AtomicUsize,
    }

    impl MockSummaryClient {
        pub fn new(responses: Vec<std::result::Result<String, SummaryFailure>>) -> Self {
            // Reverse so we can pop from the end
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_summary(content: &str) -> Self {
            Self::new(vec![Ok(content.to_string())])
        }

        pub fn with_failure(failure: SummaryFailure) -> Self {
            Self::new(vec![Err(failure)])
        }

        /// Number of summarize calls issued so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SummaryClient for MockSummaryClient {
        async fn summarize(&self, _prompt: &str) -> std::result::Result<String, SummaryFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().map_err(|e| {
                SummaryFailure::Unknown(format!("mock lock poisoned: {e}"))
            })?;
            responses.pop().unwrap_or_else(|| {
                Err(SummaryFailure::Unknown("mock exhausted".into()))
            })
        }
    }
}
