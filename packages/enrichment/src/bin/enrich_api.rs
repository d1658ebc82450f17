use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pillpal_enrichment::enrichment::{
    AnthropicClient, Enricher, OpenFdaClient, SummaryClient,
};
use pillpal_enrichment::{EnrichmentConfig, EnrichmentQuery, EnrichmentResult};

struct AppState {
    labels: OpenFdaClient,
    summarizer: Option<AnthropicClient>,
}

impl AppState {
    fn enricher(&self) -> Enricher<'_> {
        Enricher::new(
            &self.labels,
            self.summarizer.as_ref().map(|s| s as &dyn SummaryClient),
        )
    }
}

#[derive(Deserialize)]
struct DrugInfoParams {
    name: String,
    #[serde(default)]
    dosage: String,
}

async fn drug_info(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DrugInfoParams>,
) -> Json<EnrichmentResult> {
    Json(
        state
            .enricher()
            .enrich(&params.name, &params.dosage, true)
            .await,
    )
}

#[derive(Deserialize)]
struct BatchRequest {
    medications: Vec<EnrichmentQuery>,
}

#[derive(Serialize)]
struct BatchEntry {
    input: EnrichmentQuery,
    result: EnrichmentResult,
}

#[derive(Serialize)]
struct BatchResponse {
    count: usize,
    results: Vec<BatchEntry>,
}

async fn drug_info_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchResponse> {
    let enricher = state.enricher();
    let results = enricher.enrich_all(&request.medications, true).await;

    let results: Vec<BatchEntry> = request
        .medications
        .into_iter()
        .zip(results)
        .map(|(input, result)| BatchEntry { input, result })
        .collect();

    Json(BatchResponse {
        count: results.len(),
        results,
    })
}

async fn health() -> &'static str {
    "OK"
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/drug_info", get(drug_info))
        .route("/drug_info/batch", post(drug_info_batch))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EnrichmentConfig::from_env();

    let labels = match OpenFdaClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build label source client");
            std::process::exit(1);
        }
    };

    let summarizer = match config.summary.as_ref().map(AnthropicClient::new).transpose() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build summarization client");
            std::process::exit(1);
        }
    };

    if summarizer.is_some() {
        tracing::info!("summarization enabled");
    } else {
        tracing::info!("no summarization credential configured, summaries disabled");
    }

    let state = Arc::new(AppState { labels, summarizer });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".into());
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => {
            tracing::info!(addr = %bind_addr, "enrichment API listening");
            listener
        }
        Err(e) => {
            tracing::error!(error = %e, addr = %bind_addr, "failed to bind");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, router(state)).await {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}
