use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::profile::{CompanyProfile, PeerCompany};
use super::types::ExchangeId;
use crate::errors::MarketDataError;

/// Canonical company snapshot returned to callers, whatever provider served it.
///
/// `company_name` is always non-empty. Every other field is independently
/// optional: an exchange appears in `price_by_exchange` only when the vendor
/// supplied a usable price for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySnapshot {
    /// Company name (required)
    pub company_name: String,

    /// Industry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    /// Descriptive profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_profile: Option<CompanyProfile>,

    /// Latest price per listing exchange
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub price_by_exchange: BTreeMap<ExchangeId, Decimal>,

    /// Peer companies, in vendor order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_companies: Option<Vec<PeerCompany>>,

    /// Registry name of the provider that produced this snapshot
    pub source: String,
}

impl CompanySnapshot {
    /// Create a snapshot with only the required company name.
    ///
    /// Fails with `Malformed` when the name is empty or blank, so a snapshot
    /// that exists always satisfies the non-empty name invariant.
    pub fn new(
        company_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, MarketDataError> {
        let source = source.into();
        let company_name = company_name.into().trim().to_string();
        if company_name.is_empty() {
            return Err(MarketDataError::malformed(source, "missing company name"));
        }
        Ok(Self {
            company_name,
            industry: None,
            company_profile: None,
            price_by_exchange: BTreeMap::new(),
            peer_companies: None,
            source,
        })
    }

    pub fn with_industry(mut self, industry: Option<String>) -> Self {
        self.industry = industry;
        self
    }

    pub fn with_profile(mut self, profile: Option<CompanyProfile>) -> Self {
        self.company_profile = profile;
        self
    }

    pub fn with_peers(mut self, peers: Option<Vec<PeerCompany>>) -> Self {
        self.peer_companies = peers;
        self
    }

    /// Record a price for an exchange. `None` leaves the exchange absent.
    pub fn with_price(mut self, exchange: ExchangeId, price: Option<Decimal>) -> Self {
        if let Some(price) = price {
            self.price_by_exchange.insert(exchange, price);
        }
        self
    }

    /// Price on a given exchange, if the vendor supplied one.
    pub fn price_on(&self, exchange: &str) -> Option<Decimal> {
        self.price_by_exchange.get(exchange).copied()
    }
}
