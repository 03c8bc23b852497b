//! HTTP plumbing shared by the vendor adapters.
//!
//! [`VendorClient`] wraps a `reqwest::Client` with the adapter's rate tracker
//! and audit sink, so every request is quota-checked before it is sent and
//! classified into a [`MarketDataError`]. The audit record is opened as the
//! request goes out and written when it completes or is dropped.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode, Url};

use super::audit::{mask_secret, redact_url, AuditSink, InFlightAudit};
use crate::errors::{ConfigError, MarketDataError};
use crate::registry::{RateLimitConfig, RateTracker};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings common to every vendor.
#[derive(Clone, Debug)]
pub struct VendorSettings {
    /// Registry name of the provider.
    pub name: String,
    /// Vendor endpoint.
    pub base_url: String,
    /// API credential.
    pub api_key: String,
    /// Call quota.
    pub rate_limit: RateLimitConfig,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
}

impl VendorSettings {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            rate_limit: RateLimitConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

/// Rate-limited, audited HTTP access to one vendor.
pub struct VendorClient {
    settings: VendorSettings,
    client: Client,
    tracker: RateTracker,
    audit: Arc<dyn AuditSink>,
}

impl VendorClient {
    pub fn new(
        settings: VendorSettings,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                provider: settings.name.clone(),
                message: e.to_string(),
            })?;
        let tracker = RateTracker::new(settings.name.clone(), settings.rate_limit);

        Ok(Self {
            settings,
            client,
            tracker,
            audit,
        })
    }

    pub fn provider(&self) -> &str {
        &self.settings.name
    }

    pub fn api_key(&self) -> &str {
        &self.settings.api_key
    }

    pub fn tracker(&self) -> &RateTracker {
        &self.tracker
    }

    /// Build a URL from the configured endpoint and query parameters.
    pub fn url(&self, params: &[(&str, &str)]) -> Result<Url, MarketDataError> {
        Url::parse_with_params(&self.settings.base_url, params).map_err(|e| {
            MarketDataError::unavailable(self.provider(), format!("Failed to build URL: {}", e))
        })
    }

    /// Issue a GET request and return the response body.
    ///
    /// The rate tracker is consulted first; a denied slot returns
    /// `RateLimited` without touching the network.
    pub async fn get_text(
        &self,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<String, MarketDataError> {
        if !self.tracker.try_acquire() {
            return Err(MarketDataError::rate_limited(self.provider()));
        }

        let masked_url = redact_url(&url, self.api_key());
        debug!("{} request: GET {}", self.provider(), masked_url);

        let pending = InFlightAudit::start(self.audit.clone(), self.provider(), "GET", masked_url);
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let (status, result) = match request.send().await {
            Ok(response) => {
                let status = response.status();
                (Some(status), self.read_body(status, response).await)
            }
            Err(e) => (e.status(), Err(self.classify_transport(e))),
        };

        pending.complete(
            status.map(|s| s.as_u16()),
            result.as_ref().err().map(ToString::to_string),
        );

        result
    }

    async fn read_body(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> Result<String, MarketDataError> {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::rate_limited(self.provider()));
        }

        if !status.is_success() {
            return Err(MarketDataError::unavailable(
                self.provider(),
                format!("HTTP {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| self.classify_transport(e))
    }

    fn classify_transport(&self, e: reqwest::Error) -> MarketDataError {
        // The URL carries the credential in encoded form
        let e = e.without_url();
        if e.is_timeout() {
            MarketDataError::timeout(self.provider())
        } else {
            MarketDataError::unavailable(
                self.provider(),
                mask_secret(&e.to_string(), self.api_key()),
            )
        }
    }
}
