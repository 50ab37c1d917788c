//! Authenticated, rate-limited gateway to the remote API
//!
//! Every call runs the same pipeline:
//! 1. obtain the access token and attach the bearer headers
//! 2. wait for a token from the operation's rate limiter bucket
//! 3. send once through [`HttpClient`] (transport retries disabled)
//! 4. decode into a [`RemoteCallOutcome`]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use sellerdesk_common::resilience::RateLimiterRegistry;
use sellerdesk_domain::constants::{
    ACCESS_TOKEN_HEADER, AMZ_DATE_FORMAT, AMZ_DATE_HEADER, DEFAULT_HTTP_TIMEOUT_SECS,
};
use sellerdesk_domain::SellerDeskError;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::auth::AccessTokenProvider;
use super::errors::ApiError;
use super::outcome::RemoteCallOutcome;
use crate::http::HttpClient;

/// Configuration for the gateway
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Host or URL of the regional endpoint. A bare host gets `https://`.
    pub endpoint: String,
    /// Timeout for a single request
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            endpoint: sellerdesk_domain::constants::DEFAULT_API_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// One remote request, independent of credentials.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self { body: Some(body), ..Self::new(Method::POST, path) }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Gateway client shared by every remote operation
pub struct ApiGatewayClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    limiter: Arc<RateLimiterRegistry>,
    base_url: String,
}

impl ApiGatewayClient {
    /// Create a new gateway
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the endpoint is not a valid URL or the
    /// HTTP client cannot be built.
    pub fn new(
        config: &ApiClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
        limiter: Arc<RateLimiterRegistry>,
    ) -> Result<Self, ApiError> {
        let base_url = normalize_endpoint(&config.endpoint)?;
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(1)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Self { http, auth, limiter, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute `request` under `operation_key`'s rate limit.
    ///
    /// Non-2xx responses are returned as [`RemoteCallOutcome::Failure`], not
    /// as errors.
    ///
    /// # Errors
    /// Token acquisition, limiter cancellation, transport failures and
    /// cancellation while the request is in flight.
    #[instrument(skip(self, request, cancel), fields(operation = %operation_key, method = %request.method, path = %request.path))]
    pub async fn call(
        &self,
        operation_key: &str,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<RemoteCallOutcome, ApiError> {
        let token = self.auth.access_token(cancel).await?;
        self.limiter.acquire(operation_key, cancel).await?;

        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCESS_TOKEN_HEADER, token.as_str())
            .header(AMZ_DATE_HEADER, Utc::now().format(AMZ_DATE_FORMAT).to_string());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ApiError::Cancelled),
            result = self.http.send(builder) => result.map_err(map_transport_error)?,
        };

        let status = response.status().as_u16();
        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ApiError::Cancelled),
            result = response.text() => result.map_err(|e| ApiError::Network(format!("failed to read body: {e}")))?,
        };

        let outcome = RemoteCallOutcome::decode(status, &body);
        if outcome.is_success() {
            debug!(status, "Remote call succeeded");
        } else {
            warn!(status, "Remote call failed");
        }
        Ok(outcome)
    }

    /// Like [`call`](Self::call) but converts a failure into
    /// [`ApiError::Remote`].
    ///
    /// # Errors
    /// Everything `call` returns, plus `ApiError::Remote` for non-2xx.
    pub async fn call_checked(
        &self,
        operation_key: &str,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<Value, ApiError> {
        self.call(operation_key, request, cancel).await?.into_result()
    }
}

fn normalize_endpoint(endpoint: &str) -> Result<String, ApiError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::Config("API endpoint is empty".to_string()));
    }
    let candidate = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };
    url::Url::parse(&candidate)
        .map_err(|e| ApiError::Config(format!("invalid API endpoint '{endpoint}': {e}")))?;
    Ok(candidate)
}

fn map_transport_error(err: SellerDeskError) -> ApiError {
    match err {
        SellerDeskError::Network(message) => ApiError::Network(message),
        SellerDeskError::RemoteApi { status, body } => ApiError::Remote { status, body },
        SellerDeskError::Config(message) | SellerDeskError::InvalidInput(message) => {
            ApiError::Config(message)
        }
        other => ApiError::Network(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::auth::StaticTokenProvider;

    const QUOTAS: &[(&str, f64, u32)] = &[("test.op", 100.0, 10), ("slow.op", 0.01, 1)];

    fn gateway(server: &MockServer) -> ApiGatewayClient {
        let config = ApiClientConfig { endpoint: server.uri(), ..ApiClientConfig::default() };
        let limiter = Arc::new(RateLimiterRegistry::from_quotas(QUOTAS).unwrap());
        ApiGatewayClient::new(&config, Arc::new(StaticTokenProvider::new("tok-1")), limiter)
            .unwrap()
    }

    #[test]
    fn bare_host_gets_https_scheme() {
        assert_eq!(
            normalize_endpoint("sellingpartnerapi-na.amazon.com").unwrap(),
            "https://sellingpartnerapi-na.amazon.com"
        );
        assert_eq!(normalize_endpoint("http://127.0.0.1:8080/").unwrap(), "http://127.0.0.1:8080");
        assert!(normalize_endpoint("  ").is_err());
    }

    #[tokio::test]
    async fn test_call_attaches_credential_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fba/inventory/v1/summaries"))
            .and(query_param("details", "true"))
            .and(header("authorization", "Bearer tok-1"))
            .and(header("x-amz-access-token", "tok-1"))
            .and(header_exists("x-amz-date"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let request = ApiRequest::get("/fba/inventory/v1/summaries").query("details", "true");
        let outcome =
            gateway(&server).call("test.op", &request, &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.status(), 200);
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_failure_is_an_outcome_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"errors":[{"code":"InvalidInput","message":"bad"}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&server);
        let request = ApiRequest::post("/plans", json!({"a": 1}));
        let outcome = gw.call("test.op", &request, &CancellationToken::new()).await.unwrap();
        assert!(matches!(outcome, RemoteCallOutcome::Failure { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_call_checked_converts_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let err = gateway(&server)
            .call_checked("test.op", &ApiRequest::get("/x"), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ApiError::Remote { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_operation_key_rejected_before_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let err = gateway(&server)
            .call("no.such.op", &ApiRequest::get("/x"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::RateLimit(_)));
    }

    /// Validates cancellation while waiting on the limiter.
    ///
    /// Assertions:
    /// - Second call on a drained low-rate key is cancelled.
    /// - Only the first request reached the server.
    #[tokio::test]
    async fn test_cancel_while_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(1).mount(&server).await;

        let gw = gateway(&server);
        let cancel = CancellationToken::new();
        gw.call("slow.op", &ApiRequest::get("/x"), &cancel).await.unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let err = tokio::time::timeout(
            Duration::from_secs(2),
            gw.call("slow.op", &ApiRequest::get("/x"), &cancel),
        )
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, ApiError::RateLimit(sellerdesk_common::resilience::RateLimitError::Cancelled(_))));
        assert_eq!(err.category(), crate::api::ApiErrorCategory::Cancelled);
    }
}
