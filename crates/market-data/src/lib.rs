//! Finledger Market Data Crate
//!
//! This crate fetches company data for an instrument symbol from external
//! market-data vendors and normalizes it into one canonical shape, failing
//! over across vendors when one is rate limited, slow, or broken.
//!
//! # Architecture
//!
//! ```text
//!                          +---------------------+
//!                          | FailoverCoordinator |  (ordered attempts, chain deadline)
//!                          +---------------------+
//!                                    |
//!                                    v
//!                          +---------------------+
//!                          |  ProviderRegistry   |  (built once from FailoverConfig)
//!                          +---------------------+
//!                            |                 |
//!                            v                 v
//!                  +----------------+   +----------------+
//!                  | AlphaVantage   |   | IndianApi      |  (MarketDataProvider)
//!                  +----------------+   +----------------+
//!                            |                 |
//!                            v                 v
//!                  +----------------------------------+
//!                  | VendorClient: RateTracker, audit |
//!                  +----------------------------------+
//!                                    |
//!                                    v
//!                          +---------------------+
//!                          |   CompanySnapshot   |  (canonical response)
//!                          +---------------------+
//! ```
//!
//! # Core Types
//!
//! - [`CompanySnapshot`] - Canonical company response
//! - [`MarketDataProvider`] - Vendor adapter trait
//! - [`RateTracker`] - Fixed-window call quota per provider
//! - [`ProviderRegistry`] - Immutable, priority-ordered provider list
//! - [`FailoverCoordinator`] - Runs the failover chain
//! - [`MarketDataError`] - Typed failures, including `AllProvidersFailed`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use finledger_market_data::{build_coordinator, FailoverConfig, LogAuditSink};
//!
//! let config = FailoverConfig::from_env()?;
//! let coordinator = build_coordinator(&config, Arc::new(LogAuditSink))?;
//! let snapshot = coordinator.fetch_with_failover("TCS").await?;
//! println!("{} trades at {:?}", snapshot.company_name, snapshot.price_on("NSE"));
//! ```

pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

// Re-export configuration
pub use config::{
    build_coordinator, build_registry, FailoverConfig, ProviderConfig, ProviderKind,
    CONFIG_PATH_ENV,
};

// Re-export errors
pub use errors::{ConfigError, FailureKind, MarketDataError, ProviderFailure};

// Re-export all public types from models
pub use models::{CompanyProfile, CompanySnapshot, ExchangeId, PeerCompany, BSE, NSE};

// Re-export provider types
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::indian_api::IndianApiProvider;
pub use provider::{
    AuditSink, LogAuditSink, MarketDataProvider, MemoryAuditSink, RequestAudit, VendorSettings,
};

// Re-export registry types
pub use registry::{
    FailoverCoordinator, FetchDiagnostics, PriceValidationConfig, PriceValidator,
    ProviderAttempt, ProviderRegistry, RateLimitConfig, RateTracker, RegistryEntry,
};
