//! Axum handlers for the analysis endpoints
use crate::client::HttpClient;
use crate::completion::{self, CompletionPrompt};
use crate::errors::AnalysisError;
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, CompleteAnalysis, CompetitorAnalysis, MarketAnalysis,
    ProductBrief, ProductBriefRequest, ProjectAnalysis, ProjectContext, ProjectDetails,
    ReportRequest, TechStack,
};
use crate::response_sanitizer::{decode, normalize_mermaid};
use crate::{AppState, prompts, report};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
};
use tracing::{debug, info, instrument};

type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Runs a prompt through the completion service using the state's client and settings.
async fn run<T: HttpClient + Clone + Send + Sync + 'static>(
    state: &AppState<T>,
    prompt: CompletionPrompt,
) -> Result<String, AnalysisError> {
    completion::complete(&state.http_client, &state.settings, prompt).await
}

/// POST /analyze: free-text analysis of a business idea.
///
/// The completion text is returned exactly as the service produced it.
#[instrument(skip(state, payload))]
pub async fn analyze<T: HttpClient + Clone + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    payload: JsonBody<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AnalysisError> {
    let Json(request) = payload?;
    let idea = request.validated_idea()?;
    info!("Analyzing idea ({} chars)", idea.len());

    let prompt = CompletionPrompt::builder()
        .user(prompts::analyze(&request, idea))
        .build();
    let analysis = run(&state, prompt).await?;

    Ok(Json(AnalyzeResponse { analysis }))
}

async fn project_analysis<T: HttpClient + Clone + Send + Sync + 'static>(
    state: &AppState<T>,
    details: &ProjectDetails,
) -> Result<ProjectAnalysis, AnalysisError> {
    details.validate()?;

    let prompt = CompletionPrompt::builder()
        .user(prompts::project_json(details))
        .max_tokens(4000)
        .build();
    let text = run(state, prompt).await?;

    let json_analysis: ProjectContext = decode(&text)?;
    let website_overview = json_analysis.overview();
    debug!("Website overview: {}", website_overview);

    Ok(ProjectAnalysis {
        json_analysis,
        website_overview,
    })
}

async fn product_brief<T: HttpClient + Clone + Send + Sync + 'static>(
    state: &AppState<T>,
    request: &ProductBriefRequest,
) -> Result<ProductBrief, AnalysisError> {
    let prompt = CompletionPrompt::builder()
        .user(prompts::product_brief(request))
        .build();
    decode(&run(state, prompt).await?)
}

/// POST /prompt_to_json: structures a project description.
#[instrument(skip(state, payload))]
pub async fn prompt_to_json<T: HttpClient + Clone + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    payload: JsonBody<ProjectDetails>,
) -> Result<Json<ProjectAnalysis>, AnalysisError> {
    let Json(details) = payload?;
    Ok(Json(project_analysis(&state, &details).await?))
}

/// POST /generate_product_brief
#[instrument(skip(state, payload))]
pub async fn generate_product_brief<T: HttpClient + Clone + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    payload: JsonBody<ProductBriefRequest>,
) -> Result<Json<ProductBrief>, AnalysisError> {
    let Json(request) = payload?;
    request.validate()?;
    Ok(Json(product_brief(&state, &request).await?))
}

/// POST /generate_tech_stack: implementation plan plus an architecture diagram.
#[instrument(skip(state, payload))]
pub async fn generate_tech_stack<T: HttpClient + Clone + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    payload: JsonBody<ProductBriefRequest>,
) -> Result<Json<TechStack>, AnalysisError> {
    let Json(request) = payload?;
    request.validate()?;

    let prompt = CompletionPrompt::builder()
        .user(prompts::tech_stack(&request))
        .max_tokens(2500)
        .temperature(0.5)
        .build();
    let mut stack: TechStack = decode(&run(&state, prompt).await?)?;
    stack.mermaid_diagram = normalize_mermaid(&stack.mermaid_diagram);

    Ok(Json(stack))
}

/// POST /generate_market_competitor_analysis
#[instrument(skip(state, payload))]
pub async fn generate_market_analysis<T: HttpClient + Clone + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    payload: JsonBody<ProductBriefRequest>,
) -> Result<Json<MarketAnalysis>, AnalysisError> {
    let Json(request) = payload?;
    request.validate()?;

    let prompt = CompletionPrompt::builder()
        .user(prompts::market_analysis(&request))
        .max_tokens(4000)
        .build();

    Ok(Json(decode(&run(&state, prompt).await?)?))
}

/// POST /analyze_competition
#[instrument(skip(state, payload))]
pub async fn analyze_competition<T: HttpClient + Clone + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    payload: JsonBody<ProductBriefRequest>,
) -> Result<Json<CompetitorAnalysis>, AnalysisError> {
    let Json(request) = payload?;
    request.validate()?;

    let prompt = CompletionPrompt::builder()
        .system(prompts::COMPETITION_SYSTEM_PROMPT)
        .user(prompts::competition(&request))
        .build();
    let mut analysis: CompetitorAnalysis = decode(&run(&state, prompt).await?)?;
    analysis.mermaid_diagram = normalize_mermaid(&analysis.mermaid_diagram);
    info!(
        "Competitor analysis found {} competitors",
        analysis.competitive_analysis.competitors.len()
    );

    Ok(Json(analysis))
}

/// POST /complete_analysis: structures the project, then writes the brief from it.
///
/// Stops at the first failing step.
#[instrument(skip(state, payload))]
pub async fn complete_analysis<T: HttpClient + Clone + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    payload: JsonBody<ProjectDetails>,
) -> Result<Json<CompleteAnalysis>, AnalysisError> {
    let Json(details) = payload?;

    let analysis = project_analysis(&state, &details).await?;
    let brief_request = ProductBriefRequest {
        context: analysis.json_analysis.clone(),
        website_overview: analysis.website_overview.clone(),
    };
    let product_brief = product_brief(&state, &brief_request).await?;

    Ok(Json(CompleteAnalysis {
        analysis,
        product_brief,
    }))
}

/// POST /report: renders previously generated sections as one markdown document.
#[instrument(skip(payload))]
pub async fn render_report(
    payload: JsonBody<ReportRequest>,
) -> Result<impl IntoResponse, AnalysisError> {
    let Json(request) = payload?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        report::render(&request),
    ))
}

/// GET /health: liveness check.
pub async fn health() -> &'static str {
    "OK"
}
