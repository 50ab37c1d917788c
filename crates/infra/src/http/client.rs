use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use sellerdesk_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use sellerdesk_domain::SellerDeskError;
use tracing::debug;

use crate::errors::InfraError;

/// Longest backoff between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// `SellerDesk/<version> (Language=Rust; Platform=<os>)`
pub fn user_agent() -> String {
    format!(
        "SellerDesk/{} (Language=Rust; Platform={})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

/// When and how long to wait before repeating a request.
///
/// Only connect failures, timeouts and 5xx answers are repeated. The delay
/// doubles per retry, capped at [`MAX_BACKOFF`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_backoff: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_backoff }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: usize) -> Duration {
        let exponent = u32::try_from(retry.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        self.base_backoff.saturating_mul(1u32 << exponent).min(MAX_BACKOFF)
    }

    fn has_attempts_after(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }

    fn retries_status(status: StatusCode) -> bool {
        status.is_server_error()
    }

    fn retries_error(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }
}

/// Shared reqwest wrapper: timeout, user agent and a [`RetryPolicy`].
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Send `builder`, repeating per the retry policy.
    ///
    /// The last 5xx response is returned as `Ok`; status handling is the
    /// caller's job.
    ///
    /// # Errors
    /// `Network` for transport failures, `Internal` if a retried request body
    /// cannot be cloned.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, SellerDeskError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = builder
                .try_clone()
                .ok_or_else(|| SellerDeskError::Internal("streaming request body cannot be retried".into()))?
                .build()
                .map_err(|e| SellerDeskError::from(InfraError::from(e)))?;
            let (method, url) = (request.method().clone(), request.url().clone());

            match self.client.execute(request).await {
                Ok(response)
                    if RetryPolicy::retries_status(response.status())
                        && self.retry.has_attempts_after(attempt) =>
                {
                    debug!(attempt, %method, %url, status = %response.status(), "server error, retrying");
                }
                Ok(response) => {
                    debug!(attempt, %method, %url, status = %response.status(), "response received");
                    return Ok(response);
                }
                Err(err) if RetryPolicy::retries_error(&err) && self.retry.has_attempts_after(attempt) => {
                    debug!(attempt, %method, %url, error = %err, "transport error, retrying");
                }
                Err(err) => return Err(InfraError::from(err).into()),
            }

            let delay = self.retry.delay_for(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts including the first. `1` disables retries.
    #[must_use]
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.retry = RetryPolicy::new(attempts, self.retry.base_backoff);
        self
    }

    #[must_use]
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.retry = RetryPolicy::new(self.retry.max_attempts, backoff);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// # Errors
    /// `Network`/`InvalidInput` if reqwest rejects the settings.
    pub fn build(self) -> Result<HttpClient, SellerDeskError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.unwrap_or_else(user_agent))
            .build()
            .map_err(|e| SellerDeskError::from(InfraError::from(e)))?;

        Ok(HttpClient { client, retry: self.retry })
    }
}
