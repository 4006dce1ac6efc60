//! Test doubles for the completion service.
//!
//! `MockHttpClient` stands in for the hyper client: it records every request it receives and
//! answers with canned responses, transport failures or delayed responses.
use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::HttpClient;

#[derive(Debug, Clone)]
enum MockReply {
    Response { status: StatusCode, body: String },
    /// 200 headers followed by a body that never yields a frame.
    StalledBody,
    Failure(String),
}

pub struct MockHttpClient {
    pub requests: Arc<Mutex<Vec<MockRequest>>>,
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    delay: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl MockRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The body parsed as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }

    /// Content of the last message in a forwarded chat completion request.
    pub fn user_prompt(&self) -> String {
        let body = self.json();
        body["messages"]
            .as_array()
            .and_then(|messages| messages.last())
            .and_then(|message| message["content"].as_str())
            .unwrap_or_default()
            .to_string()
    }
}

impl MockHttpClient {
    /// Answers every request with `status` and `body`.
    pub fn new(status: StatusCode, body: &str) -> Self {
        Self::from_replies(vec![MockReply::Response {
            status,
            body: body.to_string(),
        }])
    }

    /// Answers each request with the next response in `responses`; the last one repeats.
    pub fn sequence(responses: Vec<(StatusCode, String)>) -> Self {
        Self::from_replies(
            responses
                .into_iter()
                .map(|(status, body)| MockReply::Response { status, body })
                .collect(),
        )
    }

    /// Fails every request as if the connection could not be made.
    pub fn failing(message: &str) -> Self {
        Self::from_replies(vec![MockReply::Failure(message.to_string())])
    }

    /// Sends response headers immediately, then never finishes the body.
    pub fn stalled_body() -> Self {
        Self::from_replies(vec![MockReply::StalledBody])
    }

    /// Waits `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn from_replies(replies: Vec<MockReply>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(replies.into())),
            delay: None,
        }
    }

    fn next_reply(&self) -> MockReply {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies
                .front()
                .cloned()
                .unwrap_or(MockReply::Failure("no reply configured".to_string()))
        }
    }

    pub fn get_requests(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl std::fmt::Debug for MockHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpClient")
            .field("requests", &self.requests)
            .field("delay", &self.delay)
            .finish()
    }
}

impl Clone for MockHttpClient {
    fn clone(&self) -> Self {
        Self {
            requests: Arc::clone(&self.requests),
            replies: Arc::clone(&self.replies),
            delay: self.delay,
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn request(
        &self,
        req: axum::extract::Request,
    ) -> Result<axum::response::Response, Box<dyn std::error::Error + Send + Sync>> {
        // Extract request details
        let method = req.method().to_string();
        let uri = req.uri().to_string();
        let headers = req
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        // Read body
        let body = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?
            .to_vec();

        // Store the request
        self.requests.lock().unwrap().push(MockRequest {
            method,
            uri,
            headers,
            body,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply() {
            MockReply::Response { status, body } => Ok(axum::response::Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(axum::body::Body::from(body))
                .unwrap()),
            MockReply::StalledBody => Ok(axum::response::Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .body(axum::body::Body::from_stream(futures_util::stream::pending::<
                    Result<axum::body::Bytes, std::io::Error>,
                >()))
                .unwrap()),
            MockReply::Failure(message) => Err(message.into()),
        }
    }
}

/// A minimal chat completion response body whose first choice carries `content`.
pub fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
    .to_string()
}
