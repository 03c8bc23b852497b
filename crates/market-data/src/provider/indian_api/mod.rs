//! Indian API market data provider implementation.
//!
//! One call to the `/stock?name={symbol}` endpoint returns the company name,
//! profile, peer list and a per-exchange price object:
//!
//! ```text
//! { "companyName": "...", "industry": "...",
//!   "companyProfile": { "companyDescription": "...", "mgIndustry": "...",
//!                       "peerCompanyList": [ { "tickerId": "...", ... } ] },
//!   "currentPrice": { "BSE": "3500.00", "NSE": "3501.25" } }
//! ```
//!
//! Prices and peer ratios arrive as numbers or numeric text.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{ConfigError, MarketDataError};
use crate::models::{
    clean_text, decimal_from_value, lenient, CompanyProfile, CompanySnapshot, PeerCompany, BSE,
    NSE,
};
use crate::provider::audit::AuditSink;
use crate::provider::http::{VendorClient, VendorSettings};
use crate::provider::MarketDataProvider;
use crate::registry::{PriceValidator, RateTracker};

pub const BASE_URL: &str = "https://stock.indianapi.in/stock";
pub const DISPLAY_NAME: &str = "Indian API";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from the /stock endpoint.
/// Only fields with a canonical mapping are read; the vendor sends many more.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockResponse {
    #[serde(default, deserialize_with = "lenient")]
    company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    industry: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    company_profile: Option<ProfileSection>,
    #[serde(default, deserialize_with = "lenient")]
    current_price: Option<CurrentPrice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileSection {
    #[serde(default, deserialize_with = "lenient")]
    company_description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    mg_industry: Option<String>,
    /// Kept raw so one bad entry does not discard the whole list
    #[serde(default, deserialize_with = "lenient")]
    peer_company_list: Option<Vec<Value>>,
}

/// Per-exchange price object
#[derive(Debug, Default, Deserialize)]
struct CurrentPrice {
    #[serde(rename = "NSE", default)]
    nse: Option<Value>,
    #[serde(rename = "BSE", default)]
    bse: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeerEntry {
    #[serde(default, deserialize_with = "lenient")]
    ticker_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    company_name: Option<String>,
    #[serde(default)]
    market_cap: Option<Value>,
    #[serde(default, alias = "priceEarningRatio")]
    price_to_earnings_value_ratio: Option<Value>,
}

impl PeerEntry {
    fn into_peer(self) -> Option<PeerCompany> {
        let ticker = clean_text(self.ticker_id.as_deref())?;
        Some(PeerCompany {
            ticker,
            name: clean_text(self.company_name.as_deref()),
            market_cap: self.market_cap.as_ref().and_then(decimal_from_value),
            pe_ratio: self
                .price_to_earnings_value_ratio
                .as_ref()
                .and_then(decimal_from_value),
        })
    }
}

// ============================================================================
// IndianApiProvider
// ============================================================================

/// Indian API provider.
///
/// Returns NSE and BSE prices side by side, plus peers.
pub struct IndianApiProvider {
    http: VendorClient,
    validator: PriceValidator,
}

impl IndianApiProvider {
    pub fn new(settings: VendorSettings, audit: Arc<dyn AuditSink>) -> Result<Self, ConfigError> {
        Ok(Self {
            http: VendorClient::new(settings, audit)?,
            validator: PriceValidator::new(),
        })
    }

    pub fn with_validator(mut self, validator: PriceValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn rate_tracker(&self) -> &RateTracker {
        self.http.tracker()
    }

    fn price(&self, symbol: &str, exchange: &str, raw: Option<&Value>) -> Option<Decimal> {
        let price = raw.and_then(decimal_from_value)?;
        if self.validator.is_valid_price(symbol, price) {
            Some(price)
        } else {
            warn!(
                "{}: dropping {} price {} for {}",
                self.id(),
                exchange,
                price,
                symbol
            );
            None
        }
    }

    /// Map a raw payload into the canonical snapshot.
    pub fn normalize(&self, symbol: &str, body: &str) -> Result<CompanySnapshot, MarketDataError> {
        if body.trim().is_empty() {
            return Err(MarketDataError::malformed(
                self.id(),
                format!("empty response for {}", symbol),
            ));
        }

        let response: StockResponse = serde_json::from_str(body).map_err(|e| {
            MarketDataError::malformed(self.id(), format!("Failed to parse response: {}", e))
        })?;

        let name = clean_text(response.company_name.as_deref()).unwrap_or_default();
        let profile = response.company_profile.unwrap_or_default();
        let prices = response.current_price.unwrap_or_default();

        let peers = profile.peer_company_list.map(|list| {
            list.into_iter()
                .filter_map(|raw| serde_json::from_value::<PeerEntry>(raw).ok())
                .filter_map(PeerEntry::into_peer)
                .collect::<Vec<_>>()
        });

        let snapshot = CompanySnapshot::new(name, self.id())?
            .with_industry(clean_text(response.industry.as_deref()))
            .with_profile(CompanyProfile::from_parts(
                clean_text(profile.company_description.as_deref()),
                clean_text(profile.mg_industry.as_deref()),
            ))
            .with_peers(peers)
            .with_price(
                Cow::Borrowed(NSE),
                self.price(symbol, NSE, prices.nse.as_ref()),
            )
            .with_price(
                Cow::Borrowed(BSE),
                self.price(symbol, BSE, prices.bse.as_ref()),
            );

        Ok(snapshot)
    }
}

#[async_trait]
impl MarketDataProvider for IndianApiProvider {
    fn id(&self) -> &str {
        self.http.provider()
    }

    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    async fn fetch(&self, symbol: &str) -> Result<CompanySnapshot, MarketDataError> {
        debug!("Fetching {} from {}", symbol, self.id());

        let url = self.http.url(&[("name", symbol)])?;
        let headers = [
            ("Accept", "application/json"),
            ("x-api-key", self.http.api_key()),
        ];
        let body = self.http.get_text(url, &headers).await?;

        let snapshot = self.normalize(symbol, &body)?;
        info!(
            "{}: fetched {} ({} prices)",
            self.id(),
            snapshot.company_name,
            snapshot.price_by_exchange.len()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::audit::MemoryAuditSink;
    use crate::registry::RateLimitConfig;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TCS_PAYLOAD: &str = r#"{
        "companyName": "Tata Consultancy Services",
        "industry": "IT Services & Consulting",
        "companyProfile": {
            "companyDescription": "Tata Consultancy Services is an IT services company.",
            "mgIndustry": "Software & Programming",
            "isInId": "INE467B01029",
            "peerCompanyList": [
                {
                    "tickerId": "INFY",
                    "companyName": "Infosys Ltd",
                    "marketCap": "620000.5",
                    "priceToEarningsValueRatio": "24.8"
                },
                {
                    "tickerId": "",
                    "companyName": "No Ticker Corp"
                },
                {
                    "tickerId": "WIPRO",
                    "companyName": "Wipro Ltd",
                    "marketCap": 250000,
                    "priceEarningRatio": "None"
                }
            ]
        },
        "currentPrice": { "BSE": "3499.55", "NSE": "3500.00" },
        "stockTechnicalData": [{"days": 5, "bsePrice": "3400"}]
    }"#;

    fn provider(base_url: &str) -> (IndianApiProvider, Arc<MemoryAuditSink>) {
        let audit = Arc::new(MemoryAuditSink::new());
        let settings = VendorSettings::new("indian_api", base_url, "test-key")
            .with_rate_limit(RateLimitConfig::per_minute(60));
        (IndianApiProvider::new(settings, audit.clone()).unwrap(), audit)
    }

    #[test]
    fn test_normalize_full_payload() {
        let (provider, _) = provider(BASE_URL);
        let snapshot = provider.normalize("TCS", TCS_PAYLOAD).unwrap();

        assert_eq!(snapshot.company_name, "Tata Consultancy Services");
        assert_eq!(snapshot.industry.as_deref(), Some("IT Services & Consulting"));
        assert_eq!(snapshot.price_on(NSE), Some(dec!(3500)));
        assert_eq!(snapshot.price_on(BSE), Some(dec!(3499.55)));
        assert_eq!(snapshot.source, "indian_api");

        let profile = snapshot.company_profile.unwrap();
        assert_eq!(
            profile.industry_classification.as_deref(),
            Some("Software & Programming")
        );

        let peers = snapshot.peer_companies.unwrap();
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0].ticker, "INFY");
        assert_eq!(peers[0].market_cap, Some(dec!(620000.5)));
        assert_eq!(peers[0].pe_ratio, Some(dec!(24.8)));
        assert_eq!(peers[1].ticker, "WIPRO");
        assert_eq!(peers[1].market_cap, Some(dec!(250000)));
        assert_eq!(peers[1].pe_ratio, None);
    }

    #[test]
    fn test_normalize_missing_optional_fields() {
        let (provider, _) = provider(BASE_URL);
        let snapshot = provider
            .normalize("TCS", r#"{"companyName": "Tata Consultancy Services"}"#)
            .unwrap();

        assert!(snapshot.industry.is_none());
        assert!(snapshot.company_profile.is_none());
        assert!(snapshot.peer_companies.is_none());
        assert!(snapshot.price_by_exchange.is_empty());
    }

    #[test]
    fn test_unparsable_prices_degrade_to_absent() {
        let (provider, _) = provider(BASE_URL);
        let snapshot = provider
            .normalize(
                "TCS",
                r#"{"companyName": "TCS", "currentPrice": {"NSE": "abc", "BSE": "0"}}"#,
            )
            .unwrap();

        assert_eq!(snapshot.price_on(NSE), None);
        assert_eq!(snapshot.price_on(BSE), None);
    }

    #[test]
    fn test_wrongly_shaped_sections_degrade_to_absent() {
        let (provider, _) = provider(BASE_URL);
        let snapshot = provider
            .normalize(
                "TCS",
                r#"{"companyName": "TCS", "companyProfile": "n/a", "currentPrice": [1, 2]}"#,
            )
            .unwrap();

        assert!(snapshot.company_profile.is_none());
        assert!(snapshot.price_by_exchange.is_empty());
    }

    #[test]
    fn test_missing_company_name_is_malformed() {
        let (provider, _) = provider(BASE_URL);
        let err = provider
            .normalize("TCS", r#"{"currentPrice": {"NSE": "3500"}}"#)
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Malformed { .. }));
    }

    #[test]
    fn test_undecodable_payload_is_malformed() {
        let (provider, _) = provider(BASE_URL);
        assert!(matches!(
            provider.normalize("TCS", "<html>oops</html>"),
            Err(MarketDataError::Malformed { .. })
        ));
        assert!(matches!(
            provider.normalize("TCS", "   "),
            Err(MarketDataError::Malformed { .. })
        ));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let (provider, _) = provider(BASE_URL);
        let first = provider.normalize("TCS", TCS_PAYLOAD).unwrap();
        let second = provider.normalize("TCS", TCS_PAYLOAD).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_key_header_and_symbol() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("name", "TCS"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TCS_PAYLOAD))
            .expect(1)
            .mount(&server)
            .await;

        let (provider, audit) = provider(&format!("{}/stock", server.uri()));
        let snapshot = provider.fetch("TCS").await.unwrap();

        assert_eq!(snapshot.company_name, "Tata Consultancy Services");
        assert_eq!(provider.rate_tracker().used(), 1);

        let records = audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Some(200));
        assert!(records[0].error.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (provider, audit) = provider(&format!("{}/stock", server.uri()));
        let err = provider.fetch("TCS").await.unwrap_err();

        assert_eq!(err, MarketDataError::unavailable("indian_api", "HTTP 503 Service Unavailable"));
        assert_eq!(provider.rate_tracker().used(), 1);
        assert_eq!(audit.records()[0].status, Some(503));
    }

    #[tokio::test]
    async fn test_vendor_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let (provider, _) = provider(&format!("{}/stock", server.uri()));
        let err = provider.fetch("TCS").await.unwrap_err();
        assert_eq!(err, MarketDataError::rate_limited("indian_api"));
    }

    #[tokio::test]
    async fn test_exhausted_tracker_skips_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TCS_PAYLOAD))
            .expect(0)
            .mount(&server)
            .await;

        let audit = Arc::new(MemoryAuditSink::new());
        let settings = VendorSettings::new("indian_api", format!("{}/stock", server.uri()), "k")
            .with_rate_limit(RateLimitConfig::per_minute(0));
        let provider = IndianApiProvider::new(settings, audit.clone()).unwrap();

        let err = provider.fetch("TCS").await.unwrap_err();
        assert_eq!(err, MarketDataError::rate_limited("indian_api"));
        assert!(audit.records().is_empty());
    }

    #[tokio::test]
    async fn test_slow_vendor_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(TCS_PAYLOAD)
                    .set_delay(std::time::Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let audit = Arc::new(MemoryAuditSink::new());
        let settings = VendorSettings::new("indian_api", format!("{}/stock", server.uri()), "k")
            .with_timeout(std::time::Duration::from_millis(100));
        let provider = IndianApiProvider::new(settings, audit).unwrap();

        let err = provider.fetch("TCS").await.unwrap_err();
        assert_eq!(err, MarketDataError::timeout("indian_api"));
        assert_eq!(provider.rate_tracker().used(), 1);
    }
}
