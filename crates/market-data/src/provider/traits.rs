//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that every
//! vendor adapter implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::CompanySnapshot;

/// Trait for market data providers.
///
/// Implement this trait to add support for a new vendor. An adapter owns
/// everything vendor-specific: the wire format, the mapping into
/// [`CompanySnapshot`], error classification and its call quota.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use finledger_market_data::{CompanySnapshot, MarketDataError, MarketDataProvider};
///
/// struct MyProvider {
///     name: String,
/// }
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &str {
///         &self.name
///     }
///
///     async fn fetch(&self, symbol: &str) -> Result<CompanySnapshot, MarketDataError> {
///         // check quota, call the vendor, normalize
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique, stable provider name.
    ///
    /// Comes from configuration. Used for registry lookup, rate tracking,
    /// logging and as the `provider` field of every error this adapter returns.
    fn id(&self) -> &str;

    /// Human-readable vendor name. Defaults to the id.
    fn display_name(&self) -> &str {
        self.id()
    }

    /// Fetch company data for a symbol and normalize it.
    ///
    /// # Returns
    ///
    /// A snapshot with a non-empty company name on success, otherwise one of
    /// `Timeout`, `RateLimited`, `Malformed` or `Unavailable`.
    ///
    /// Dropping the returned future cancels any in-flight network call.
    async fn fetch(&self, symbol: &str) -> Result<CompanySnapshot, MarketDataError>;
}
