use tracing::{debug, info, warn};

use crate::enrichment::label_source::{LabelRecord, LabelSource, DO_NOT_TAKE_IF_FIELDS};
use crate::enrichment::prompt;
use crate::enrichment::summarizer::SummaryClient;
use crate::enrichment::types::{
    EnrichmentQuery, EnrichmentResult, MatchQuality, SafetyProfile, NAME_PLACEHOLDER,
};

/// Main enrichment orchestrator.
///
/// Looks a medication up in the label source, aggregates its safety text,
/// scores how well the returned record matches the requested name, and
/// optionally asks the summarization service for a plain-language version.
pub struct Enricher<'a> {
    labels: &'a dyn LabelSource,
    summarizer: Option<&'a dyn SummaryClient>,
}

impl<'a> Enricher<'a> {
    /// `summarizer: None` disables summarization entirely (no credential
    /// configured).
    pub fn new(labels: &'a dyn LabelSource, summarizer: Option<&'a dyn SummaryClient>) -> Self {
        Self { labels, summarizer }
    }

    /// Enrich a single medication name with label safety data.
    ///
    /// Always returns a well-formed result: label-lookup failures populate
    /// `error`, summarization failures degrade into a diagnostic `summary`
    /// while the raw safety data stays intact.
    pub async fn enrich(&self, name: &str, dosage: &str, enable_summary: bool) -> EnrichmentResult {
        let name = name.trim();
        if name.is_empty() {
            return EnrichmentResult::lookup_failed(
                name,
                dosage,
                "medication name must not be empty",
            );
        }

        info!(drug = name, "looking up label record");
        let record = match self.labels.fetch_label(name).await {
            Ok(record) => record,
            Err(e) => {
                warn!(drug = name, error = %e, "label lookup failed");
                return EnrichmentResult::lookup_failed(name, dosage, e.to_string());
            }
        };

        let generic_name = first_or_placeholder(&record.openfda.generic_name);
        let brand_name = first_or_placeholder(&record.openfda.brand_name);

        let match_quality = assess_match(name, &generic_name, &brand_name);
        debug!(
            drug = name,
            generic = %generic_name,
            brand = %brand_name,
            quality = ?match_quality,
            "match quality assessed"
        );
        if match_quality == MatchQuality::NoMatch {
            warn!(
                drug = name,
                generic = %generic_name,
                brand = %brand_name,
                "returned record does not match requested name, safety data may belong to a different drug"
            );
        }

        let safety = collect_safety(&record);

        let summary = if enable_summary {
            self.summarize(name, dosage, &safety).await
        } else {
            None
        };

        EnrichmentResult {
            requested_name: name.to_string(),
            dosage: dosage.to_string(),
            generic_name: Some(generic_name),
            brand_name: Some(brand_name),
            match_quality: Some(match_quality),
            safety,
            summary,
            error: None,
        }
    }

    /// Enrich a batch of medications sequentially, preserving input order.
    ///
    /// Items are independent; a failed lookup yields an error result for
    /// that item without affecting the rest.
    pub async fn enrich_all(
        &self,
        queries: &[EnrichmentQuery],
        enable_summary: bool,
    ) -> Vec<EnrichmentResult> {
        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            results.push(self.enrich(&query.name, &query.dosage, enable_summary).await);
        }
        results
    }

    /// Summarization is attempted only when a client is configured and there
    /// is safety text to summarize. Failure never propagates: it becomes a
    /// diagnostic string in the summary field.
    async fn summarize(&self, name: &str, dosage: &str, safety: &SafetyProfile) -> Option<String> {
        let client = self.summarizer?;

        if safety.is_empty() {
            debug!(drug = name, "no safety text to summarize, skipping");
            return None;
        }

        let prompt = prompt::build_summary_prompt(name, dosage, safety);
        match client.summarize(&prompt).await {
            Ok(text) => {
                info!(drug = name, "summarization succeeded");
                Some(text)
            }
            Err(e) => {
                warn!(drug = name, error = %e, "summarization failed, returning raw safety data");
                Some(format!("LLM summarization failed: {e}"))
            }
        }
    }
}

fn first_or_placeholder(names: &[String]) -> String {
    names
        .first()
        .cloned()
        .unwrap_or_else(|| NAME_PLACEHOLDER.to_string())
}

/// Score how well the returned generic/brand names match the requested name.
///
/// Both sides are trimmed and lower-cased. Equality with either name is
/// `Exact`; a substring relationship in either direction with either name is
/// `Partial`; anything else is `NoMatch`. The substring heuristic is
/// deliberately simple and its boundaries are part of the contract — a short
/// requested name that happens to occur inside an unrelated brand name does
/// classify as `Partial`.
pub fn assess_match(requested: &str, generic: &str, brand: &str) -> MatchQuality {
    let requested = requested.trim().to_lowercase();
    let generic = generic.trim().to_lowercase();
    let brand = brand.trim().to_lowercase();

    if requested == generic || requested == brand {
        return MatchQuality::Exact;
    }

    let related = |returned: &str| returned.contains(&requested) || requested.contains(returned);
    if related(&generic) || related(&brand) {
        MatchQuality::Partial
    } else {
        MatchQuality::NoMatch
    }
}

/// Aggregate safety text from a label record.
///
/// "Do not take if": the first value of each present section, scanned in the
/// fixed `DO_NOT_TAKE_IF_FIELDS` priority order — no merging, no
/// deduplication. "Do not take with": the first `drug_interactions` value
/// only.
pub fn collect_safety(record: &LabelRecord) -> SafetyProfile {
    let mut do_not_take_if = Vec::new();
    for field in DO_NOT_TAKE_IF_FIELDS {
        if let Some(first) = record.section(field).first() {
            do_not_take_if.push(first.clone());
        }
    }

    let do_not_take_with = record
        .drug_interactions
        .first()
        .cloned()
        .into_iter()
        .collect();

    SafetyProfile {
        do_not_take_if,
        do_not_take_with,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::label_source::{test_support::MockLabelSource, OpenFdaNames};
    use crate::enrichment::summarizer::test_support::MockSummaryClient;
    use crate::error::SummaryFailure;
    use pretty_assertions::assert_eq;

    fn ibuprofen_record() -> LabelRecord {
        LabelRecord {
            openfda: OpenFdaNames {
                generic_name: vec!["ibuprofen".into()],
                brand_name: vec!["Advil".into()],
            },
            warnings: vec!["avoid if allergic".into()],
            drug_interactions: vec!["avoid with blood thinners".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_assess_match_exact_ignores_case_and_whitespace() {
        assert_eq!(
            assess_match("  Ibuprofen ", "ibuprofen", "Advil"),
            MatchQuality::Exact
        );
        assert_eq!(assess_match("advil", "ibuprofen", "Advil"), MatchQuality::Exact);
    }

    #[test]
    fn test_assess_match_partial_substring_both_directions() {
        // requested inside returned
        assert_eq!(
            assess_match("ibuprofen", "ibuprofen lysine", "N/A"),
            MatchQuality::Partial
        );
        // returned inside requested
        assert_eq!(
            assess_match("ibuprofen sodium", "ibuprofen", "N/A"),
            MatchQuality::Partial
        );
        // brand-side substring also counts
        assert_eq!(
            assess_match("advil dual action", "acetaminophen and ibuprofen", "Advil"),
            MatchQuality::Partial
        );
    }

    #[test]
    fn test_assess_match_misspelling_is_no_match() {
        assert_eq!(assess_match("asprin", "aspirin", "Bayer"), MatchQuality::NoMatch);
    }

    #[test]
    fn test_collect_safety_takes_first_value_per_section_in_order() {
        let record = LabelRecord {
            contraindications: vec!["c1".into(), "c2".into()],
            warnings: vec!["w1".into()],
            pregnancy: vec!["p1".into()],
            drug_interactions: vec!["i1".into(), "i2".into()],
            ..Default::default()
        };
        let safety = collect_safety(&record);
        assert_eq!(safety.do_not_take_if, vec!["c1", "w1", "p1"]);
        assert_eq!(safety.do_not_take_with, vec!["i1"]);
    }

    #[test]
    fn test_collect_safety_bounds() {
        let record = LabelRecord {
            contraindications: vec!["a".into()],
            warnings: vec!["b".into()],
            warnings_and_cautions: vec!["c".into()],
            precautions: vec!["d".into()],
            pregnancy: vec!["e".into()],
            nursing_mothers: vec!["f".into()],
            pregnancy_or_lactation: vec!["g".into()],
            drug_interactions: vec!["h".into(), "ignored".into()],
            ..Default::default()
        };
        let safety = collect_safety(&record);
        assert_eq!(safety.do_not_take_if.len(), 7);
        assert_eq!(safety.do_not_take_with.len(), 1);
    }

    #[tokio::test]
    async fn test_enrich_ibuprofen_scenario() {
        let labels = MockLabelSource::with_record(ibuprofen_record());
        let enricher = Enricher::new(&labels, None);

        let result = enricher.enrich("ibuprofen", "200mg", true).await;

        assert_eq!(result.error, None);
        assert_eq!(result.requested_name, "ibuprofen");
        assert_eq!(result.dosage, "200mg");
        assert_eq!(result.generic_name.as_deref(), Some("ibuprofen"));
        assert_eq!(result.brand_name.as_deref(), Some("Advil"));
        assert_eq!(result.match_quality, Some(MatchQuality::Exact));
        assert_eq!(result.safety.do_not_take_if, vec!["avoid if allergic"]);
        assert_eq!(result.safety.do_not_take_with, vec!["avoid with blood thinners"]);
        assert_eq!(result.summary, None);
    }

    #[tokio::test]
    async fn test_enrich_missing_names_use_placeholder() {
        let record = LabelRecord {
            warnings: vec!["some warning".into()],
            ..Default::default()
        };
        let labels = MockLabelSource::with_record(record);
        let enricher = Enricher::new(&labels, None);

        let result = enricher.enrich("obscuredrug", "", false).await;
        assert_eq!(result.generic_name.as_deref(), Some("N/A"));
        assert_eq!(result.brand_name.as_deref(), Some("N/A"));
        assert_eq!(result.match_quality, Some(MatchQuality::NoMatch));
    }

    #[tokio::test]
    async fn test_enrich_no_records_sets_error_only() {
        let labels = MockLabelSource::new(vec![]);
        let enricher = Enricher::new(&labels, None);

        let result = enricher.enrich("unobtainium", "", true).await;
        assert!(result.error.is_some());
        assert!(result.generic_name.is_none());
        assert!(result.match_quality.is_none());
        assert!(result.safety.is_empty());
        assert!(result.summary.is_none());
    }

    #[tokio::test]
    async fn test_enrich_empty_name_does_not_hit_label_source() {
        let labels = MockLabelSource::new(vec![]);
        let enricher = Enricher::new(&labels, None);

        let result = enricher.enrich("   ", "200mg", true).await;
        assert!(result.error.is_some());
        assert_eq!(labels.calls(), 0);
    }

    #[tokio::test]
    async fn test_summary_disabled_skips_call() {
        let labels = MockLabelSource::with_record(ibuprofen_record());
        let summarizer = MockSummaryClient::with_summary("should not be used");
        let enricher = Enricher::new(&labels, Some(&summarizer));

        let result = enricher.enrich("ibuprofen", "200mg", false).await;
        assert_eq!(result.summary, None);
        assert_eq!(summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_summary_skipped_when_no_safety_text() {
        let record = LabelRecord {
            openfda: OpenFdaNames {
                generic_name: vec!["ibuprofen".into()],
                brand_name: vec!["Advil".into()],
            },
            ..Default::default()
        };
        let labels = MockLabelSource::with_record(record);
        let summarizer = MockSummaryClient::with_summary("should not be used");
        let enricher = Enricher::new(&labels, Some(&summarizer));

        let result = enricher.enrich("ibuprofen", "", true).await;
        assert_eq!(result.summary, None);
        assert_eq!(summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_summary_success_is_attached() {
        let labels = MockLabelSource::with_record(ibuprofen_record());
        let summarizer = MockSummaryClient::with_summary("- Do not take if allergic");
        let enricher = Enricher::new(&labels, Some(&summarizer));

        let result = enricher.enrich("ibuprofen", "200mg", true).await;
        assert_eq!(result.summary.as_deref(), Some("- Do not take if allergic"));
        assert_eq!(summarizer.calls(), 1);
    }

    #[tokio::test]
    async fn test_summary_failure_degrades_without_error() {
        let labels = MockLabelSource::with_record(ibuprofen_record());
        let summarizer = MockSummaryClient::with_failure(SummaryFailure::Timeout(30));
        let enricher = Enricher::new(&labels, Some(&summarizer));

        let result = enricher.enrich("ibuprofen", "200mg", true).await;
        assert_eq!(
            result.summary.as_deref(),
            Some("LLM summarization failed: Request timeout (>30s)")
        );
        assert_eq!(result.error, None);
        assert_eq!(result.safety.do_not_take_if, vec!["avoid if allergic"]);
        assert_eq!(result.safety.do_not_take_with, vec!["avoid with blood thinners"]);
    }

    #[tokio::test]
    async fn test_enrich_all_preserves_order_and_isolates_failures() {
        let labels = MockLabelSource::new(vec![
            Ok(ibuprofen_record()),
            Err(crate::error::EnrichmentError::NoResults("unobtainium".into())),
        ]);
        let enricher = Enricher::new(&labels, None);

        let queries = vec![
            EnrichmentQuery {
                name: "ibuprofen".into(),
                dosage: "200mg".into(),
            },
            EnrichmentQuery {
                name: "unobtainium".into(),
                dosage: "".into(),
            },
        ];

        let results = enricher.enrich_all(&queries, false).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].requested_name, "ibuprofen");
        assert!(results[0].error.is_none());
        assert_eq!(results[1].requested_name, "unobtainium");
        assert!(results[1].error.is_some());
    }
}
