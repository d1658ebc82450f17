/// Configuration for the enrichment pipeline.
///
/// Loaded from the environment; `summary` is `None` when no API key is
/// configured, which disables summarization entirely.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub label_base_url: String,
    pub label_timeout_secs: u64,
    pub summary: Option<SummaryConfig>,
}

impl EnrichmentConfig {
    /// Load configuration from environment variables.
    ///
    /// `CLAUDE_API_KEY` is optional; everything else has a default.
    pub fn from_env() -> Self {
        let label_base_url = std::env::var("OPENFDA_BASE_URL")
            .unwrap_or_else(|_| "https://api.fda.gov/drug/label.json".into());

        let label_timeout_secs = std::env::var("OPENFDA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let summary = std::env::var("CLAUDE_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(|api_key| SummaryConfig {
                api_key,
                model: std::env::var("LLM_MODEL")
                    .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),
                api_base_url: std::env::var("LLM_API_BASE_URL")
                    .unwrap_or_else(|_| "https://api.anthropic.com".into()),
                max_tokens: std::env::var("LLM_MAX_TOKENS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(400),
                timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            });

        Self {
            label_base_url,
            label_timeout_secs,
            summary,
        }
    }

    pub fn new(label_base_url: impl Into<String>) -> Self {
        Self {
            label_base_url: label_base_url.into(),
            label_timeout_secs: 10,
            summary: None,
        }
    }

    pub fn with_label_timeout_secs(mut self, secs: u64) -> Self {
        self.label_timeout_secs = secs;
        self
    }

    pub fn with_summary(mut self, summary: SummaryConfig) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// Configuration for the LLM summarization call.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl SummaryConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "claude-sonnet-4-20250514".into(),
            api_base_url: "https://api.anthropic.com".into(),
            max_tokens: 400,
            timeout_secs: 30,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
