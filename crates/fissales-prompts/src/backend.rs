use std::{collections::VecDeque, fmt, sync::Arc};

use async_trait::async_trait;
use fissales_core::FisSalesError;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::PromptServiceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        })
    }
}

#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct PromptResponse {
    pub status: u16,
    pub status_text: String,
    /// Parsed JSON body, `Value::Null` when the body was empty or not JSON.
    pub body: Value,
}

impl PromptResponse {
    /// Build a response, deriving the status text from the status code.
    pub fn new(status: u16, body: Value) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            body,
        }
    }

    /// A `200 OK` response.
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam between [`PromptClient`](crate::PromptClient) and the
/// Prompt Service.
///
/// Implementations return every HTTP response, including non-2xx ones, and
/// reserve `Err` for failures to get a response at all.
#[async_trait]
pub trait PromptBackend: Send + Sync {
    async fn send(&self, request: PromptRequest) -> Result<PromptResponse, FisSalesError>;
}

/// Production backend using reqwest.
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Build a backend honouring the transport settings in `config`.
    pub fn from_config(config: &PromptServiceConfig) -> Result<Self, FisSalesError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FisSalesError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one shared with other services.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptBackend for HttpBackend {
    async fn send(&self, request: PromptRequest) -> Result<PromptResponse, FisSalesError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            FisSalesError::Transport(format!(
                "{} {} failed: {e}",
                request.method, request.url
            ))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FisSalesError::Transport(format!("failed to read response body: {e}")))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(PromptResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// Test backend with queued responses. Every request is recorded so tests
/// can assert what was (or was not) sent.
pub struct FakeBackend {
    responses: Arc<Mutex<VecDeque<Result<PromptResponse, FisSalesError>>>>,
    requests: Arc<Mutex<Vec<PromptRequest>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push_response(&self, response: PromptResponse) -> &Self {
        self.responses
            .try_lock()
            .expect("not concurrent during setup")
            .push_back(Ok(response));
        self
    }

    pub fn push_error(&self, error: FisSalesError) -> &Self {
        self.responses
            .try_lock()
            .expect("not concurrent during setup")
            .push_back(Err(error));
        self
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<PromptRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptBackend for FakeBackend {
    async fn send(&self, request: PromptRequest) -> Result<PromptResponse, FisSalesError> {
        self.requests.lock().await.push(request);
        let mut responses = self.responses.lock().await;
        responses
            .pop_front()
            .unwrap_or_else(|| Err(FisSalesError::Transport("FakeBackend exhausted".to_string())))
    }
}
