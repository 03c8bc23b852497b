//! Provider registry module.
//!
//! This module provides orchestration for market data providers, including:
//! - Provider registration and priority ordering
//! - Failover across providers under an optional chain deadline
//! - Per-provider call quotas
//! - Price data validation

mod coordinator;
mod diagnostics;
mod rate_limiter;
mod registry;
mod validator;

pub use coordinator::FailoverCoordinator;
pub use diagnostics::{
    AttemptOutcome, AttemptReport, DiagnosticsReport, FetchDiagnostics, ProviderAttempt,
};
pub use rate_limiter::{RateLimitConfig, RateTracker};
pub use registry::{ProviderRegistry, RegistryEntry};
pub use validator::{PriceValidationConfig, PriceValidator};
