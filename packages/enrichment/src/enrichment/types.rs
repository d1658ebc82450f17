use serde::{Deserialize, Serialize};

/// Placeholder used when the label source reports no generic or brand name.
pub(crate) const NAME_PLACEHOLDER: &str = "N/A";

/// One medication to enrich.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichmentQuery {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
}

/// Confidence that the returned label record corresponds to the requested name.
///
/// The label source's generic-name search is not guaranteed to return an
/// exact match (salt forms, combination products), so callers are told how
/// much to trust the result. `NoMatch` means the safety data may belong to a
/// different drug and must be surfaced prominently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    Exact,
    Partial,
    NoMatch,
}

/// Aggregated safety text extracted from a label record.
///
/// `do_not_take_if` holds at most one string per contributing label section
/// (up to 7, in fixed priority order); `do_not_take_with` holds at most the
/// first `drug_interactions` entry. The asymmetry is deliberate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetyProfile {
    pub do_not_take_if: Vec<String>,
    pub do_not_take_with: Vec<String>,
}

impl SafetyProfile {
    pub fn is_empty(&self) -> bool {
        self.do_not_take_if.is_empty() && self.do_not_take_with.is_empty()
    }
}

/// Caller-visible result of one enrichment.
///
/// `error` is set if and only if the label lookup failed or returned no
/// usable record; in that case the success fields are absent/default. A
/// failed summarization never sets `error` — it is folded into `summary`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub requested_name: String,
    pub dosage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_quality: Option<MatchQuality>,
    #[serde(default)]
    pub safety: SafetyProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnrichmentResult {
    /// Result for a failed label lookup: error channel only.
    pub fn lookup_failed(
        requested_name: impl Into<String>,
        dosage: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            requested_name: requested_name.into(),
            dosage: dosage.into(),
            generic_name: None,
            brand_name: None,
            match_quality: None,
            safety: SafetyProfile::default(),
            summary: None,
            error: Some(error.into()),
        }
    }
}
