//! Retry-classifying HTTP transport

use std::time::Duration;

use reqwest::{Client, Method, Proxy};
use serde::Deserialize;
use tracing::debug;

use crate::error::{DeliveryError, Result};

/// Status codes reclassified as transient partner unavailability
pub const RETRYABLE_HTTP_STATUS: [u16; 3] = [502, 503, 504];

/// Transport settings for one partner endpoint, immutable after construction
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Partner endpoint URL
    pub base_url: String,

    /// HTTP method
    #[serde(default = "default_method")]
    pub method: String,

    /// Request timeout; every call is issued with this bound
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Optional proxy pair
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,

    /// Optional credential
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_timeout_seconds() -> u64 {
    crate::DEFAULT_REQUEST_TIMEOUT_SECONDS
}

/// Proxy pair
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Proxy for plain HTTP traffic
    #[serde(default)]
    pub http: Option<String>,

    /// Proxy for HTTPS traffic
    #[serde(default)]
    pub https: Option<String>,
}

/// Partner endpoint credential
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    /// HTTP basic auth
    Basic {
        /// Account name
        username: String,
        /// Account password
        password: String,
    },
    /// Bearer token
    Bearer {
        /// Token value
        token: String,
    },
}

/// Completed HTTP exchange
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

/// HTTP submit wrapper that classifies infrastructure failures.
///
/// Classification is purely a transport-layer judgment: it looks at the
/// connection outcome and the status code, never at the payload.
pub struct Transport {
    client: Client,
    method: Method,
    config: TransportConfig,
}

impl Transport {
    /// Build the underlying client once, with a bounded timeout
    pub fn new(config: TransportConfig) -> Result<Self> {
        let method = Method::from_bytes(config.method.as_bytes()).map_err(|_| {
            DeliveryError::Configuration(format!("invalid HTTP method `{}`", config.method))
        })?;

        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_seconds));
        if let Some(proxy) = &config.proxy {
            if let Some(url) = &proxy.http {
                builder = builder.proxy(Proxy::http(url).map_err(|e| {
                    DeliveryError::Configuration(format!("invalid http proxy: {e}"))
                })?);
            }
            if let Some(url) = &proxy.https {
                builder = builder.proxy(Proxy::https(url).map_err(|e| {
                    DeliveryError::Configuration(format!("invalid https proxy: {e}"))
                })?);
            }
        }

        let client = builder
            .build()
            .map_err(|e| DeliveryError::Configuration(format!("http client: {e}")))?;

        Ok(Self {
            client,
            method,
            config,
        })
    }

    /// Perform the call and return the raw response on any completed
    /// exchange.
    ///
    /// Connection failures and timeouts, plus 502/503/504 statuses, surface
    /// as [`DeliveryError::Retryable`]. Every other completed status passes
    /// through for the caller to interpret; failures this layer cannot name
    /// propagate unclassified.
    pub async fn send(&self, body: String) -> anyhow::Result<WireResponse> {
        let mut request = self
            .client
            .request(self.method.clone(), &self.config.base_url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body);

        request = match &self.config.credentials {
            Some(Credentials::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            Some(Credentials::Bearer { token }) => request.bearer_auth(token),
            None => request,
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(DeliveryError::Retryable {
                    detail: format!(
                        "timed out after {}s calling {}",
                        self.config.timeout_seconds, self.config.base_url
                    ),
                }
                .into());
            }
            Err(e) if e.is_connect() => {
                return Err(DeliveryError::Retryable {
                    detail: format!("connection failed: {e}"),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("partner answered HTTP {} ({} bytes)", status, body.len());

        if RETRYABLE_HTTP_STATUS.contains(&status) {
            return Err(DeliveryError::Retryable {
                detail: format!("partner unavailable, HTTP {status}: {body}"),
            }
            .into());
        }

        Ok(WireResponse { status, body })
    }
}
