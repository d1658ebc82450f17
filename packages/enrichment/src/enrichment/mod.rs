mod config;
mod enricher;
mod label_source;
mod prompt;
mod summarizer;
mod types;

pub use config::{EnrichmentConfig, SummaryConfig};
pub use enricher::{assess_match, collect_safety, Enricher};
pub use label_source::{
    LabelRecord, LabelSource, OpenFdaClient, OpenFdaNames, DO_NOT_TAKE_IF_FIELDS,
};
#[cfg(any(test, feature = "test-utils"))]
pub use label_source::test_support::MockLabelSource;
pub use prompt::build_summary_prompt;
pub use summarizer::{AnthropicClient, SummaryClient};
#[cfg(any(test, feature = "test-utils"))]
pub use summarizer::test_support::MockSummaryClient;
pub use types::{EnrichmentQuery, EnrichmentResult, MatchQuality, SafetyProfile};
