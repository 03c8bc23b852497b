//! Alpha Vantage market data provider implementation.
//!
//! A fetch makes two calls against the query endpoint:
//! - `OVERVIEW` for the company fundamentals (required)
//! - `GLOBAL_QUOTE` for the latest price (optional)
//!
//! The quote is flat, a single price with no exchange attached, so it is
//! filed under the exchange implied by the symbol suffix or the provider's
//! default exchange.
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::{ConfigError, MarketDataError};
use crate::models::{
    clean_text, exchange_from_symbol, lenient, parse_decimal, CompanyProfile, CompanySnapshot,
    ExchangeId, NSE,
};
use crate::provider::audit::AuditSink;
use crate::provider::http::{VendorClient, VendorSettings};
use crate::provider::MarketDataProvider;
use crate::registry::{PriceValidator, RateTracker};

pub const BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DISPLAY_NAME: &str = "Alpha Vantage";

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// Status fields Alpha Vantage mixes into any response body.
#[derive(Debug, Default, Deserialize)]
struct ApiStatus {
    #[serde(rename = "Error Message", default, deserialize_with = "lenient")]
    error_message: Option<String>,
    #[serde(rename = "Note", default, deserialize_with = "lenient")]
    note: Option<String>,
    #[serde(rename = "Information", default, deserialize_with = "lenient")]
    information: Option<String>,
}

/// OVERVIEW response for company fundamentals.
/// Only includes fields that map to the snapshot; API returns many more fields.
#[derive(Debug, Deserialize)]
struct CompanyOverviewResponse {
    #[serde(flatten)]
    status: ApiStatus,
    #[serde(rename = "Name", default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(rename = "Description", default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(rename = "Industry", default, deserialize_with = "lenient")]
    industry: Option<String>,
    #[serde(rename = "Sector", default, deserialize_with = "lenient")]
    sector: Option<String>,
}

/// GLOBAL_QUOTE response for the latest price
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(flatten)]
    status: ApiStatus,
    #[serde(rename = "Global Quote", default, deserialize_with = "lenient")]
    quote: Option<GlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price", default, deserialize_with = "lenient")]
    price: Option<String>,
    #[serde(rename = "07. latest trading day", default, deserialize_with = "lenient")]
    latest_trading_day: Option<String>,
    #[serde(rename = "10. change percent", default, deserialize_with = "lenient")]
    change_percent: Option<String>,
}

fn mentions_rate_limit(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("call frequency") || message.contains("rate limit")
}

// ============================================================================
// AlphaVantageProvider
// ============================================================================

/// Alpha Vantage market data provider.
pub struct AlphaVantageProvider {
    http: VendorClient,
    validator: PriceValidator,
    default_exchange: ExchangeId,
}

impl AlphaVantageProvider {
    pub fn new(settings: VendorSettings, audit: Arc<dyn AuditSink>) -> Result<Self, ConfigError> {
        Ok(Self {
            http: VendorClient::new(settings, audit)?,
            validator: PriceValidator::new(),
            default_exchange: ExchangeId::Borrowed(NSE),
        })
    }

    /// Exchange used for symbols without a recognised suffix.
    pub fn with_default_exchange(mut self, exchange: impl Into<ExchangeId>) -> Self {
        self.default_exchange = exchange.into();
        self
    }

    pub fn with_validator(mut self, validator: PriceValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn rate_tracker(&self) -> &RateTracker {
        self.http.tracker()
    }

    /// Map vendor status fields to an error, if they carry one.
    fn check_api_error(&self, status: &ApiStatus) -> Result<(), MarketDataError> {
        if let Some(ref msg) = status.error_message {
            return Err(MarketDataError::malformed(self.id(), msg.clone()));
        }

        // "Note" usually indicates rate limiting
        if let Some(ref msg) = status.note {
            if mentions_rate_limit(msg) {
                return Err(MarketDataError::rate_limited(self.id()));
            }
            warn!("Alpha Vantage note: {}", msg);
        }

        if let Some(ref msg) = status.information {
            if mentions_rate_limit(msg) {
                return Err(MarketDataError::rate_limited(self.id()));
            }
            warn!("Alpha Vantage info: {}", msg);
        }

        Ok(())
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<String, MarketDataError> {
        let url = self.http.url(&[
            ("function", function),
            ("symbol", symbol),
            ("apikey", self.http.api_key()),
        ])?;
        self.http.get_text(url, &[("Accept", "application/json")]).await
    }

    fn parse_overview(&self, symbol: &str, body: &str) -> Result<CompanySnapshot, MarketDataError> {
        let overview: CompanyOverviewResponse = serde_json::from_str(body).map_err(|e| {
            MarketDataError::malformed(self.id(), format!("Failed to parse OVERVIEW: {}", e))
        })?;
        self.check_api_error(&overview.status)?;

        let name = clean_text(overview.name.as_deref()).ok_or_else(|| {
            MarketDataError::malformed(self.id(), format!("no company name for {}", symbol))
        })?;
        // Sector is coarser; only used when the industry is missing
        let industry = clean_text(overview.industry.as_deref())
            .or_else(|| clean_text(overview.sector.as_deref()));

        Ok(CompanySnapshot::new(name, self.id())?
            .with_industry(industry.clone())
            .with_profile(CompanyProfile::from_parts(
                clean_text(overview.description.as_deref()),
                industry,
            )))
    }

    /// Extract a validated price from a GLOBAL_QUOTE body.
    fn parse_quote(&self, symbol: &str, body: &str) -> Result<Option<Decimal>, MarketDataError> {
        let response: GlobalQuoteResponse = serde_json::from_str(body).map_err(|e| {
            MarketDataError::malformed(self.id(), format!("Failed to parse GLOBAL_QUOTE: {}", e))
        })?;
        self.check_api_error(&response.status)?;

        let Some(quote) = response.quote else {
            return Ok(None);
        };
        let Some(price) = quote.price.as_deref().and_then(parse_decimal) else {
            return Ok(None);
        };

        if !self.validator.is_valid_price(symbol, price) {
            return Ok(None);
        }
        if let Some(day) = quote.latest_trading_day.as_deref() {
            if !self.validator.is_fresh(symbol, day, Utc::now().date_naive()) {
                return Ok(None);
            }
        }
        if !self
            .validator
            .is_reasonable_change(symbol, quote.change_percent.as_deref())
        {
            return Ok(None);
        }

        Ok(Some(price))
    }

    fn attach_price(
        &self,
        snapshot: CompanySnapshot,
        symbol: &str,
        quote: Option<&str>,
    ) -> CompanySnapshot {
        let price = quote.and_then(|body| {
            self.parse_quote(symbol, body).unwrap_or_else(|e| {
                warn!("{}: ignoring quote for {}: {}", self.id(), symbol, e);
                None
            })
        });
        snapshot.with_price(self.exchange_for(symbol), price)
    }

    /// Map raw OVERVIEW and GLOBAL_QUOTE bodies into the canonical snapshot.
    pub fn normalize(
        &self,
        symbol: &str,
        overview: &str,
        quote: Option<&str>,
    ) -> Result<CompanySnapshot, MarketDataError> {
        let snapshot = self.parse_overview(symbol, overview)?;
        Ok(self.attach_price(snapshot, symbol, quote))
    }

    fn exchange_for(&self, symbol: &str) -> ExchangeId {
        exchange_from_symbol(symbol).unwrap_or_else(|| self.default_exchange.clone())
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &str {
        self.http.provider()
    }

    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    async fn fetch(&self, symbol: &str) -> Result<CompanySnapshot, MarketDataError> {
        debug!("Fetching {} from {}", symbol, self.id());

        let body = self.query("OVERVIEW", symbol).await?;
        let snapshot = self.parse_overview(symbol, &body)?;

        let quote = match self.query("GLOBAL_QUOTE", symbol).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("{}: no price for {}: {}", self.id(), symbol, e);
                None
            }
        };

        let snapshot = self.attach_price(snapshot, symbol, quote.as_deref());
        info!(
            "{}: fetched {} ({} prices)",
            self.id(),
            snapshot.company_name,
            snapshot.price_by_exchange.len()
        );
        Ok(snapshot)
    }
}
