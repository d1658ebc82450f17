use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::enrichment::config::EnrichmentConfig;
use crate::error::{EnrichmentError, Result};

/// Label sections scanned for "do not take if" text, in priority order.
///
/// Contraindication information is scattered across several label sections;
/// each contributing section adds exactly one string (its first value), so
/// the order here is the order of the aggregated output.
pub const DO_NOT_TAKE_IF_FIELDS: [&str; 7] = [
    "contraindications",
    "warnings",
    "warnings_and_cautions",
    "precautions",
    "pregnancy",
    "nursing_mothers",
    "pregnancy_or_lactation",
];

/// The `openfda` sub-mapping of a label record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenFdaNames {
    #[serde(default)]
    pub generic_name: Vec<String>,
    #[serde(default)]
    pub brand_name: Vec<String>,
}

/// A single drug-label record as returned by the label source.
///
/// Only the sections the pipeline reads are modeled; every field defaults to
/// empty since real label records omit most sections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelRecord {
    #[serde(default)]
    pub openfda: OpenFdaNames,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub warnings_and_cautions: Vec<String>,
    #[serde(default)]
    pub precautions: Vec<String>,
    #[serde(default)]
    pub pregnancy: Vec<String>,
    #[serde(default)]
    pub nursing_mothers: Vec<String>,
    #[serde(default)]
    pub pregnancy_or_lactation: Vec<String>,
    #[serde(default)]
    pub drug_interactions: Vec<String>,
}

impl LabelRecord {
    /// Text values for a named label section. Unknown names yield an empty slice.
    pub fn section(&self, name: &str) -> &[String] {
        match name {
            "contraindications" => &self.contraindications,
            "warnings" => &self.warnings,
            "warnings_and_cautions" => &self.warnings_and_cautions,
            "precautions" => &self.precautions,
            "pregnancy" => &self.pregnancy,
            "nursing_mothers" => &self.nursing_mothers,
            "pregnancy_or_lactation" => &self.pregnancy_or_lactation,
            "drug_interactions" => &self.drug_interactions,
            _ => &[],
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelSearchResponse {
    #[serde(default)]
    results: Vec<LabelRecord>,
}

/// Trait for label-source lookups, enabling mocking in tests.
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Fetch the best-matching label record for a generic name.
    ///
    /// Exactly one attempt; an empty result set is an error
    /// (`EnrichmentError::NoResults`), not an empty record.
    async fn fetch_label(&self, name: &str) -> Result<LabelRecord>;
}

/// OpenFDA drug-label API client.
pub struct OpenFdaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenFdaClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.label_timeout_secs))
            .build()
            .map_err(EnrichmentError::LabelRequest)?;

        Ok(Self {
            http,
            base_url: config.label_base_url.clone(),
        })
    }
}

#[async_trait]
impl LabelSource for OpenFdaClient {
    async fn fetch_label(&self, name: &str) -> Result<LabelRecord> {
        debug!(drug = name, url = %self.base_url, "querying label source");

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("search", format!("openfda.generic_name:{name}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(EnrichmentError::LabelRequest)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(EnrichmentError::LabelApi {
                status: status.as_u16(),
                message,
            });
        }

        let body: LabelSearchResponse = resp
            .json()
            .await
            .map_err(|e| EnrichmentError::LabelResponseParse(e.to_string()))?;

        body.results
            .into_iter()
            .next()
            .ok_or_else(|| EnrichmentError::NoResults(name.to_string()))
    }
}

/// Test utilities for the label source.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock label source for testing. Returns pre-configured results in order.
    pub struct MockLabelSource {
        results: Mutex<Vec<Result<LabelRecord>>>,
        calls: AtomicUsize,
    }

    impl MockLabelSource {
        pub fn new(results: Vec<Result<LabelRecord>>) -> Self {
            // Reverse so we can pop from the end
            let mut results = results;
            results.reverse();
            Self {
                results: Mutex::new(results),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_record(record: LabelRecord) -> Self {
            Self::new(vec![Ok(record)])
        }

        /// Number of fetch calls issued so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LabelSource for MockLabelSource {
        async fn fetch_label(&self, name: &str) -> Result<LabelRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().map_err(|e| {
                EnrichmentError::LabelResponseParse(format!("mock lock poisoned: {e}"))
            })?;
            results
                .pop()
                .unwrap_or_else(|| Err(EnrichmentError::NoResults(name.to_string())))
        }
    }
}
