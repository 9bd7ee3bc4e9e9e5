//! Shared HTTP client for the Gemini REST backend
//!
//! One `reqwest::Client` per backend, with a per-request timeout and a small
//! retry budget for 5xx and network failures.

use archpro_utils::error::GenerationError;
use archpro_utils::redaction::redact_error_message;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default connect timeout (30 seconds)
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of retry attempts for 5xx and network failures
const MAX_RETRIES: u32 = 2;

/// Initial backoff duration for retries (1 second)
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Arc<Client>,
    max_timeout: Duration,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if the client cannot be constructed
    pub fn with_max_timeout(max_timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| {
                GenerationError::Misconfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client: Arc::new(client),
            max_timeout,
        })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Execute a request with timeout and retry policy.
    ///
    /// - Per-request timeout: `min(request_timeout, max_timeout)`
    /// - Up to 2 retries for 5xx and network failures, backing off 1s then 2s
    /// - 4xx responses fail immediately; the provider's error message is kept
    ///
    /// # Errors
    ///
    /// - `ProviderAuth` for 401/403
    /// - `NotFound` for 404
    /// - `ProviderQuota` for 429
    /// - `ProviderOutage` for 5xx (after retries)
    /// - `Timeout` for timeouts
    /// - `Transport` for network errors (after retries) and other 4xx
    pub async fn execute_with_retry(
        &self,
        request_builder: RequestBuilder,
        request_timeout: Duration,
        provider_name: &str,
    ) -> Result<Response, GenerationError> {
        let effective_timeout = request_timeout.min(self.max_timeout);

        let mut attempt = 0;

        loop {
            attempt += 1;

            let request = request_builder
                .try_clone()
                .ok_or_else(|| {
                    GenerationError::Transport("Failed to clone request for retry".to_string())
                })?
                .timeout(effective_timeout)
                .build()
                .map_err(|e| GenerationError::Transport(format!("Failed to build request: {e}")))?;

            debug!(
                provider = provider_name,
                attempt = attempt,
                timeout_secs = effective_timeout.as_secs(),
                "Executing HTTP request"
            );

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_client_error() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(map_client_error(status, &body, provider_name));
                    }

                    if status.is_server_error() {
                        if attempt <= MAX_RETRIES {
                            warn!(
                                provider = provider_name,
                                attempt = attempt,
                                status = status.as_u16(),
                                "Server error, will retry"
                            );
                            tokio::time::sleep(INITIAL_BACKOFF * attempt).await;
                            continue;
                        }

                        return Err(GenerationError::ProviderOutage(format!(
                            "{provider_name} returned server error: {status}"
                        )));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        return Err(GenerationError::Timeout {
                            duration: effective_timeout,
                        });
                    }

                    let sanitized = redact_error_message(&e.to_string());

                    if attempt <= MAX_RETRIES {
                        warn!(
                            provider = provider_name,
                            attempt = attempt,
                            error = %sanitized,
                            "Network error, will retry"
                        );
                        tokio::time::sleep(INITIAL_BACKOFF * attempt).await;
                        continue;
                    }

                    return Err(GenerationError::Transport(format!(
                        "{provider_name} request failed: {sanitized}"
                    )));
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The provider's `error.message`, if the body is a JSON error envelope.
fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
}

/// Map 4xx responses to `GenerationError` variants.
///
/// - 401/403 → `ProviderAuth`
/// - 404 → `NotFound`
/// - 429 → `ProviderQuota`
/// - Other 4xx → `Transport`
fn map_client_error(status: StatusCode, body: &str, provider_name: &str) -> GenerationError {
    let detail = provider_message(body)
        .map(|message| format!(": {}", redact_error_message(&message)))
        .unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::ProviderAuth(
            format!("{provider_name} authentication failed: {status}{detail}"),
        ),
        StatusCode::NOT_FOUND => {
            GenerationError::NotFound(format!("{provider_name} returned {status}{detail}"))
        }
        StatusCode::TOO_MANY_REQUESTS => GenerationError::ProviderQuota(format!(
            "{provider_name} rate limit exceeded: {status}{detail}"
        )),
        _ => GenerationError::Transport(format!(
            "{provider_name} returned client error: {status}{detail}"
        )),
    }
}
