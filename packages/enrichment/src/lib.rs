pub mod enrichment;
pub mod error;

pub use enrichment::{
    EnrichmentConfig, EnrichmentQuery, EnrichmentResult, Enricher, MatchQuality, SafetyProfile,
    SummaryConfig,
};
pub use error::{EnrichmentError, SummaryFailure};
