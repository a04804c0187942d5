//! Authenticated request executor.
//!
//! Every resource operation goes through [`PrintixClient::execute`], which
//! resolves the endpoint, attaches the bearer token, and records the
//! rate-limit headers of the response.

use crate::error::{snippet, ClientError, ClientResult};
use crate::token::{TokenManager, TokenStatus};
use chrono::{DateTime, Utc};
use printix_core::{ClientConfig, Clock, SystemClock};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, RwLock};

const RATE_LIMIT_REMAINING: &str = "x-rate-limit-remaining";
const RATE_LIMIT_RESET: &str = "x-rate-limit-reset";

/// Last rate-limit figures reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: Option<i64>,
    pub reset: Option<DateTime<Utc>>,
}

// ============================================================================
// REQUEST DESCRIPTION
// ============================================================================

/// One outbound call: method, endpoint (path or absolute URL), query, JSON
/// body, and extra headers.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter only when `value` is `Some`.
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// ============================================================================
// RESPONSE ENVELOPE
// ============================================================================

/// Status fields present on every Printix response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_id: Option<String>,
    /// Some endpoints report failures here instead of `errorDescription`.
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiStatus {
    pub fn check(&self, operation: &'static str) -> ClientResult<()> {
        if self.success {
            return Ok(());
        }
        let description = self
            .error_description
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "no description".to_string());
        Err(ClientError::Api {
            operation,
            description,
            error_id: self.error_id.clone().unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(flatten)]
    status: ApiStatus,
    #[serde(flatten)]
    data: T,
}

/// Payload of responses that carry nothing beyond the status fields.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NoContent {}

// ============================================================================
// CLIENT
// ============================================================================

pub struct PrintixClientBuilder {
    config: ClientConfig,
    http: Option<reqwest::Client>,
    clock: Option<Arc<dyn Clock>>,
}

impl PrintixClientBuilder {
    /// Use a caller-supplied transport instead of the default one.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> ClientResult<PrintixClient> {
        self.config.validate()?;

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .timeout(self.config.request_timeout)
                .build()?,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let tokens = TokenManager::new(http.clone(), &self.config, clock.clone());

        Ok(PrintixClient {
            http,
            base_url: self.config.base_url().to_string(),
            tokens,
            tenant_id: RwLock::new(self.config.tenant_id.clone()),
            test_mode: self.config.test_mode,
            user_identifier: self.config.user_identifier.clone(),
            rate_limit: Mutex::new(RateLimitInfo::default()),
        })
    }
}

/// Client for the Printix Cloud Print API.
///
/// Safe to share between tasks; token and rate-limit state are internally
/// synchronised.
pub struct PrintixClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenManager,
    tenant_id: RwLock<Option<String>>,
    test_mode: bool,
    user_identifier: Option<String>,
    rate_limit: Mutex<RateLimitInfo>,
}

impl PrintixClient {
    pub fn builder(config: ClientConfig) -> PrintixClientBuilder {
        PrintixClientBuilder {
            config,
            http: None,
            clock: None,
        }
    }

    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Self::builder(config).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn user_identifier(&self) -> Option<&str> {
        self.user_identifier.as_deref()
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub async fn token_status(&self) -> TokenStatus {
        self.tokens.status().await
    }

    pub fn tenant_id(&self) -> Option<String> {
        self.tenant_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Switch the tenant used by subsequent tenant-scoped calls.
    pub fn set_tenant(&self, tenant_id: impl Into<String>) {
        *self.tenant_id.write().unwrap_or_else(|e| e.into_inner()) = Some(tenant_id.into());
    }

    pub(crate) fn require_tenant(&self, operation: &'static str) -> ClientResult<String> {
        self.tenant_id()
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingTenant { operation })
    }

    pub fn rate_limit_info(&self) -> RateLimitInfo {
        *self.rate_limit.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Absolute URLs (HAL links) pass through; anything else is joined to the base URL.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }

    /// Send an authenticated request and return the raw response.
    ///
    /// Authentication failures surface as [`ClientError::Auth`] before any
    /// request to the API is made.
    pub async fn execute(&self, request: ApiRequest) -> ClientResult<reqwest::Response> {
        let url = self.resolve_url(&request.endpoint);
        let token = self.tokens.bearer_token().await?;

        tracing::debug!(method = %request.method, %url, "Printix API request");

        let mut builder = self
            .http
            .request(request.method, &url)
            .bearer_auth(token.expose_secret());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        self.capture_rate_limit(response.headers());
        Ok(response)
    }

    /// Execute, check the HTTP status and the envelope, and decode the payload.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: ApiRequest,
    ) -> ClientResult<T> {
        let response = self.execute(request).await?;
        let envelope: Envelope<T> = parse_response(response).await?;
        envelope.status.check(operation)?;
        Ok(envelope.data)
    }

    fn capture_rate_limit(&self, headers: &HeaderMap) {
        let remaining = header_i64(headers, RATE_LIMIT_REMAINING);
        let reset =
            header_i64(headers, RATE_LIMIT_RESET).and_then(|s| DateTime::from_timestamp(s, 0));
        if remaining.is_none() && reset.is_none() {
            return;
        }

        let mut info = self.rate_limit.lock().unwrap_or_else(|e| e.into_inner());
        if remaining.is_some() {
            info.remaining = remaining;
        }
        if reset.is_some() {
            info.reset = reset;
        }
        tracing::trace!(remaining = ?info.remaining, reset = ?info.reset, "Rate limit updated");
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

impl std::fmt::Debug for PrintixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintixClient")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .field("tenant_id", &self.tenant_id())
            .field("test_mode", &self.test_mode)
            .finish()
    }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            body: snippet(&text),
        })
    }
}
