//! Calls to the external completion service.
//!
//! Every endpoint ends up here: a prompt goes out as a single-message chat completion request,
//! the first choice's text comes back. There is no retry; a failed or slow call is surfaced to
//! the caller as an [`AnalysisError`].
use axum::{
    body::Body,
    http::{Method, Request, header},
};
use bon::Builder;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::{
    auth::ApiKey,
    client::HttpClient,
    errors::AnalysisError,
    schemas::chat_completions::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
};

pub const DEFAULT_BASE_URL: &str = "https://api.aimlapi.com";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const CHAT_COMPLETIONS_PATH: &str = "v1/chat/completions";

/// Upper bound on how much of an upstream error body ends up in logs and error messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Largest completion response body that will be buffered.
pub const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Where and how to reach the completion service.
#[derive(Debug, Clone, Builder)]
pub struct CompletionSettings {
    pub base_url: Url,
    pub api_key: ApiKey,
    #[builder(into, default = DEFAULT_MODEL.to_string())]
    pub model: String,
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
}

/// A single prompt plus the sampling parameters for it.
#[derive(Debug, Clone, Builder)]
pub struct CompletionPrompt {
    #[builder(into)]
    pub user: String,
    #[builder(into)]
    pub system: Option<String>,
    #[builder(default = 2000)]
    pub max_tokens: u32,
    #[builder(default = 0.7)]
    pub temperature: f32,
}

impl CompletionSettings {
    fn endpoint(&self) -> Result<Url, AnalysisError> {
        // Url::join drops the last path segment unless the base ends in a slash.
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(CHAT_COMPLETIONS_PATH)
            .map_err(|e| AnalysisError::Internal(format!("Invalid completion URL: {e}")))
    }

    fn chat_request(&self, prompt: CompletionPrompt) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt.user));

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(prompt.temperature),
            max_tokens: Some(prompt.max_tokens),
        }
    }
}

/// Sends `prompt` to the completion service and returns the text of the first choice, verbatim.
#[instrument(skip_all, fields(model = %settings.model))]
pub async fn complete<T: HttpClient + ?Sized>(
    http_client: &T,
    settings: &CompletionSettings,
    prompt: CompletionPrompt,
) -> Result<String, AnalysisError> {
    let url = settings.endpoint()?;
    let body = serde_json::to_vec(&settings.chat_request(prompt))
        .map_err(|e| AnalysisError::Internal(format!("Failed to serialize request: {e}")))?;

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(url.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, settings.api_key.bearer());

    // Update the host header to match the target server (otherwise cloudflare gets mad).
    if let Some(host) = url.host_str() {
        let host_value = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        builder = builder.header(header::HOST, host_value);
    }

    let request = builder
        .body(Body::from(body))
        .map_err(|e| AnalysisError::Internal(format!("Failed to build request: {e}")))?;

    debug!("Sending completion request to {}", url);
    // The timeout covers the whole exchange, body included.
    let exchange = async {
        let response = http_client.request(request).await.map_err(|e| {
            error!("Error sending request to completion service {}: {}", url, e);
            AnalysisError::Upstream(e.to_string())
        })?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_RESPONSE_BYTES)
            .await
            .map_err(|e| AnalysisError::Upstream(format!("Failed to read response body: {e}")))?;
        Ok::<_, AnalysisError>((status, bytes))
    };

    let (status, bytes) = match tokio::time::timeout(settings.timeout, exchange).await {
        Ok(result) => result?,
        Err(_) => {
            error!(
                "Completion service {} timed out after {:?}",
                url, settings.timeout
            );
            return Err(AnalysisError::Timeout(settings.timeout.as_secs()));
        }
    };

    if !status.is_success() {
        let text = String::from_utf8_lossy(&bytes);
        let snippet: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
        error!("Completion service returned {}: {}", status, snippet);
        return Err(AnalysisError::Upstream(format!(
            "upstream returned {status}: {snippet}"
        )));
    }

    let completion: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|e| {
        AnalysisError::invalid_completion(format!("Failed to parse completion response: {e}"))
    })?;

    if let Some(usage) = &completion.usage {
        info!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Completion received"
        );
    }

    match completion.first_content() {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(AnalysisError::invalid_completion(
            "No response received from the API.",
        )),
    }
}
