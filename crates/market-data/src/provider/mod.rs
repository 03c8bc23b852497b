//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Shared HTTP plumbing (quota check, error classification, auditing)
//! - Concrete vendor adapters (Alpha Vantage, Indian API)
//!
//! Adapters are registered under a configured name; the same vendor can be
//! registered twice with different credentials or endpoints.

pub mod audit;
pub mod http;
mod traits;

pub mod alpha_vantage;
pub mod indian_api;

// Re-exports
pub use audit::{AuditSink, LogAuditSink, MemoryAuditSink, RequestAudit};
pub use http::{VendorClient, VendorSettings};
pub use traits::MarketDataProvider;
