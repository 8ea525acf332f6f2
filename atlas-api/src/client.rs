//! HTTP client for the RIPE Atlas REST API.
//!
//! Owns the pooled transport, the session headers (API key and
//! User-Agent), and the request timeout. Every endpoint goes through
//! [`AtlasClient::request`], which logs, sends, checks the status, and
//! decodes the JSON body.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, Span};

use atlas_core::config::{ApiConfig, AppConfig};
use atlas_core::constants;
use atlas_core::error::{AtlasError, AtlasResult};

/// Query parameters as ordered key/value pairs.
pub type QueryParams = Vec<(String, String)>;

/// Client for the RIPE Atlas REST API.
///
/// Immutable after construction. Cloning is cheap and shares the
/// connection pool, which is how listing streams stay independent of the
/// borrow of the client that created them.
#[derive(Clone)]
pub struct AtlasClient {
    inner: Client,
    /// API root without trailing slash (e.g. "https://atlas.ripe.net/api/v2").
    base_url: String,
    /// Caller-supplied name; tags measurement descriptions.
    name: String,
    /// Per-request timeout.
    timeout: Duration,
    /// Authorization and User-Agent, applied to every request unless overridden.
    default_headers: HeaderMap,
    /// Parent span for every event this client emits.
    span: Span,
}

impl AtlasClient {
    /// Create a client with its own pooled transport.
    pub fn new(config: &ApiConfig) -> AtlasResult<Self> {
        let inner = Client::builder()
            .connect_timeout(config.timeout())
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| AtlasError::Transport(format!("failed to build HTTP client: {e}")))?;

        Self::with_http_client(config, inner)
    }

    /// Create a client on top of a caller-provided transport.
    ///
    /// Session headers and the timeout are applied per request, so the
    /// transport's own defaults are only used for what this client does
    /// not set.
    pub fn with_http_client(config: &ApiConfig, inner: Client) -> AtlasResult<Self> {
        config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("Key {}", config.api_key.trim()))
            .map_err(|_| AtlasError::Config("api key contains invalid header characters".into()))?;
        auth.set_sensitive(true);
        let user_agent = HeaderValue::from_str(&constants::user_agent(&config.client_name))
            .map_err(|_| {
                AtlasError::Config("client name contains invalid header characters".into())
            })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(AUTHORIZATION, auth);
        default_headers.insert(USER_AGENT, user_agent);

        let span = tracing::info_span!("atlas_client", name = %config.client_name);

        Ok(Self {
            inner,
            base_url: AppConfig::sanitize_base_url(&config.base_url),
            name: config.client_name.clone(),
            timeout: config.timeout(),
            default_headers,
            span,
        })
    }

    /// Replace the span this client logs under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The caller-supplied client name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The API root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn span(&self) -> &Span {
        &self.span
    }

    /// Build an absolute URL for a resource path such as "/probes/".
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Issue one HTTP request and decode the JSON body.
    ///
    /// `headers` are merged over the session defaults, replacing any key
    /// they share. A status outside 200..=299 is logged with the raw body
    /// and returned as [`AtlasError::Http`].
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&serde_json::Value>,
        headers: &HeaderMap,
    ) -> AtlasResult<serde_json::Value> {
        debug!(parent: &self.span, method = %method, url, params = ?query, "request");

        let mut merged = self.default_headers.clone();
        for (key, value) in headers {
            merged.insert(key.clone(), value.clone());
        }

        let mut builder = self
            .inner
            .request(method, url)
            .headers(merged)
            .timeout(self.timeout);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(b) = body {
            builder = builder.json(b);
        }

        let response = builder.send().await.map_err(classify_error)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_error)?;

        if !status.is_success() {
            error!(parent: &self.span, status = status.as_u16(), body = %text, "request failed");
            return Err(AtlasError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            AtlasError::Serialization(format!("failed to decode response from {url}: {e}"))
        })
    }

    /// GET + decode into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> AtlasResult<T> {
        self.get_json_with_headers(url, query, &HeaderMap::new()).await
    }

    /// GET with header overrides + decode into `T`.
    pub async fn get_json_with_headers<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &HeaderMap,
    ) -> AtlasResult<T> {
        let value = self
            .request(Method::GET, url, query, None, headers)
            .await?;
        decode(url, value)
    }

    /// POST a JSON body + decode into `T`.
    pub async fn post_json<T, B>(&self, url: &str, body: &B) -> AtlasResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let value = self
            .request(Method::POST, url, &[], Some(&body), &HeaderMap::new())
            .await?;
        decode(url, value)
    }
}

fn decode<T: DeserializeOwned>(url: &str, value: serde_json::Value) -> AtlasResult<T> {
    serde_json::from_value(value).map_err(|e| {
        AtlasError::Serialization(format!("unexpected response shape from {url}: {e}"))
    })
}

/// Classify a reqwest error into an AtlasError variant.
fn classify_error(e: reqwest::Error) -> AtlasError {
    if e.is_timeout() {
        AtlasError::Timeout(e.to_string())
    } else if e.is_connect() {
        AtlasError::Transport(format!("connection failed: {e}"))
    } else {
        AtlasError::Transport(e.to_string())
    }
}
