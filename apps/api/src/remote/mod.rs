/// Remote client: the only code that talks to the resume backend over HTTP.
///
/// Every request carries a fresh `X-Request-ID`. Network failures, 5xx, 408 and
/// 429 are retried with exponential backoff (1s, 2s, 4s by default). A 401 clears
/// the stored bearer token and is returned as `RemoteError::Auth` without retry.
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{ResumeRecord, User};

pub mod optimizer;

pub use optimizer::{OptimizationOptions, Optimized, ResumeOptimizer};

const REQUEST_ID_HEADER: &str = "X-Request-ID";
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("remote returned status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn code(&self) -> &'static str {
        match self {
            RemoteError::Network(_) => "NETWORK_ERROR",
            RemoteError::Auth(_) => "UNAUTHORIZED",
            RemoteError::Server { .. } => "REMOTE_ERROR",
            RemoteError::Decode(_) => "REMOTE_DECODE_ERROR",
        }
    }

    /// Text safe to show the person editing the resume.
    pub fn user_message(&self) -> &str {
        match self {
            RemoteError::Network(_) => "Network error - please check your connection",
            RemoteError::Auth(_) => "Your session has expired. Please sign in again.",
            RemoteError::Server { message, .. } if !message.is_empty() => message,
            RemoteError::Server { .. } => "The resume service returned an error",
            RemoteError::Decode(_) => "The resume service sent an unexpected response",
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// `{success, data, message}` wrapper used by every backend response.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    resume_data: &'a ResumeRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AtsResumeRequest<'a> {
    resume_data: &'a ResumeRecord,
    options: &'a OptimizationOptions,
}

/// Payload of `/api/resume/Ats_resume`: either rendered HTML or a record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtsResumeResponse {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: String,
    retry_attempts: u32,
    backoff: Duration,
    token: Arc<RwLock<Option<String>>>,
}

impl RemoteClient {
    pub fn new(base_url: &str, timeout: Duration, retry_attempts: u32) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_attempts,
            backoff: DEFAULT_BACKOFF,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Overrides the first retry delay; later retries double it.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// POST /api/auth. Stores the returned bearer token for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, RemoteError> {
        let credentials = Credentials { email, password };
        let envelope: ApiEnvelope<LoginResponse> = self
            .send(Method::POST, "/api/auth", Some(&credentials), false)
            .await?;
        let login = require_data(envelope)?;
        self.set_token(Some(login.token.clone())).await;
        info!("Signed in as {}", login.user.email);
        Ok(login)
    }

    /// GET /me
    pub async fn me(&self) -> Result<User, RemoteError> {
        let envelope: ApiEnvelope<User> = self.send::<(), _>(Method::GET, "/me", None, true).await?;
        require_data(envelope)
    }

    /// POST /api/resume/Resume. Public; no token is attached.
    pub async fn upload_resume(
        &self,
        record: &ResumeRecord,
        user_id: Option<&str>,
    ) -> Result<Option<serde_json::Value>, RemoteError> {
        let body = UploadRequest {
            resume_data: record,
            user_id,
        };
        let envelope: ApiEnvelope<serde_json::Value> = self
            .send(Method::POST, "/api/resume/Resume", Some(&body), false)
            .await?;
        Ok(envelope.data)
    }

    /// POST /api/resume/Ats_resume. Protected: fails with `Auth` before any
    /// network traffic when no token is held.
    pub async fn generate_ats_resume(
        &self,
        record: &ResumeRecord,
        options: &OptimizationOptions,
    ) -> Result<AtsResumeResponse, RemoteError> {
        if !self.has_token().await {
            return Err(RemoteError::Auth("Sign in to generate an ATS resume".to_string()));
        }
        let body = AtsResumeRequest {
            resume_data: record,
            options,
        };
        let envelope: ApiEnvelope<AtsResumeResponse> = self
            .send(Method::POST, "/api/resume/Ats_resume", Some(&body), true)
            .await?;
        require_data(envelope)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        with_auth: bool,
    ) -> Result<ApiEnvelope<T>, RemoteError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error: Option<RemoteError> = None;

        for attempt in 0..=self.retry_attempts {
            if attempt > 0 {
                let delay = self.backoff.saturating_mul(2u32.saturating_pow(attempt - 1));
                warn!(
                    "{method} {path} attempt {attempt} failed, retrying after {}ms...",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let request_id = Uuid::new_v4().to_string();
            let mut request = self
                .http
                .request(method.clone(), &url)
                .header(REQUEST_ID_HEADER, &request_id);
            if with_auth {
                if let Some(token) = self.token.read().await.as_deref() {
                    request = request.bearer_auth(token);
                }
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            debug!("{method} {path} request_id={request_id}");

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(RemoteError::Network(e.to_string()));
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::UNAUTHORIZED {
                self.set_token(None).await;
                return Err(RemoteError::Auth(error_message(response).await));
            }

            if is_retryable(status) {
                let message = error_message(response).await;
                warn!("{method} {path} returned {status}: {message}");
                last_error = Some(RemoteError::Server {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                return Err(RemoteError::Server {
                    status: status.as_u16(),
                    message: error_message(response).await,
                });
            }

            let envelope: ApiEnvelope<T> = response
                .json()
                .await
                .map_err(|e| RemoteError::Decode(e.to_string()))?;
            if !envelope.success {
                return Err(RemoteError::Server {
                    status: status.as_u16(),
                    message: envelope.message.unwrap_or_default(),
                });
            }
            return Ok(envelope);
        }

        Err(last_error.unwrap_or_else(|| RemoteError::Network("no attempt was made".to_string())))
    }
}

fn require_data<T>(envelope: ApiEnvelope<T>) -> Result<T, RemoteError> {
    envelope
        .data
        .ok_or_else(|| RemoteError::Decode("response has no data".to_string()))
}

/// Prefers the backend's `{"message": ...}`, then the raw body, then the status reason.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
        return parsed.message;
    }
    if !body.trim().is_empty() {
        return body;
    }
    status.canonical_reason().unwrap_or("request failed").to_string()
}
