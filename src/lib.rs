//! idea-analysis - business idea analysis backed by an LLM
//!
//! This library serves a small web form and the JSON endpoints behind it. Each endpoint turns the
//! submitted text into a prompt, sends it to an OpenAI-compatible chat completion service and
//! returns what comes back.

use axum::Router;
use axum::routing::{get, post};
use axum_prometheus::{
    GenericMetricLayer, Handle, PrometheusMetricLayerBuilder,
    metrics_exporter_prometheus::PrometheusHandle,
};
use std::borrow::Cow;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

pub mod auth;
pub mod client;
pub mod completion;
pub mod errors;
pub mod frontend;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod report;
pub mod response_sanitizer;
pub mod schemas;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use client::{HttpClient, HyperClient, PoolSettings};
use completion::CompletionSettings;

/// The main application state containing the HTTP client and completion service settings
#[derive(Clone, Debug)]
pub struct AppState<T: HttpClient> {
    pub http_client: T,
    pub settings: Arc<CompletionSettings>,
}

impl AppState<HyperClient> {
    /// Create a new AppState with the default Hyper client
    pub fn new(settings: CompletionSettings, pool: PoolSettings) -> Self {
        let http_client = client::create_hyper_client(pool);
        Self {
            http_client,
            settings: Arc::new(settings),
        }
    }
}

impl<T: HttpClient> AppState<T> {
    /// Create a new AppState with a custom HTTP client (useful for testing)
    pub fn with_client(settings: CompletionSettings, http_client: T) -> Self {
        Self {
            http_client,
            settings: Arc::new(settings),
        }
    }
}

/// Build the main router
/// This creates routes for:
/// - `/` - The idea form
/// - `/health` - Liveness check
/// - `/analyze` - Free-text idea analysis
/// - `/prompt_to_json`, `/generate_*`, `/analyze_competition`, `/complete_analysis` - Structured
///   project analysis
/// - `/report` - Markdown export of generated sections
#[instrument(skip(state))]
pub fn build_router<T: HttpClient + Clone + Send + Sync + 'static>(state: AppState<T>) -> Router {
    info!("Building router");
    Router::new()
        .route("/", get(frontend::index))
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze::<T>))
        .route("/prompt_to_json", post(handlers::prompt_to_json::<T>))
        .route(
            "/generate_product_brief",
            post(handlers::generate_product_brief::<T>),
        )
        .route(
            "/generate_tech_stack",
            post(handlers::generate_tech_stack::<T>),
        )
        .route(
            "/generate_market_competitor_analysis",
            post(handlers::generate_market_analysis::<T>),
        )
        .route(
            "/generate_market_analysis",
            post(handlers::generate_market_analysis::<T>),
        )
        .route(
            "/analyze_competition",
            post(handlers::analyze_competition::<T>),
        )
        .route(
            "/complete_analysis",
            post(handlers::complete_analysis::<T>),
        )
        .route("/report", post(handlers::render_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds a router for the metrics endpoint.
#[instrument(skip(handle))]
pub fn build_metrics_router(handle: PrometheusHandle) -> Router {
    info!("Building metrics router");
    Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    )
}

type MetricsLayerAndHandle = (
    GenericMetricLayer<'static, PrometheusHandle, Handle>,
    PrometheusHandle,
);

/// Builds a layer and handle for prometheus metrics collection.
///
/// # Parameters
/// - `prefix`: A string prefix for the metrics, which can be either a string literal or an owned string.
///   This parameter uses `impl Into<Cow<'static, str>>` to allow flexibility in passing either borrowed
///   or owned strings. The `'static` lifetime ensures that the prefix is valid for the entire duration
///   of the program, as required by the Prometheus metrics layer.
pub fn build_metrics_layer_and_handle(
    prefix: impl Into<Cow<'static, str>>,
) -> MetricsLayerAndHandle {
    info!("Building metrics layer");
    PrometheusMetricLayerBuilder::new()
        .with_prefix(prefix)
        .with_endpoint_label_type(axum_prometheus::EndpointLabel::Exact)
        .with_default_metrics()
        .build_pair()
}
