//! Error types for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: the per-provider failures plus the chain-level
//!   [`MarketDataError::AllProvidersFailed`]
//! - [`FailureKind`]: a flat classification used for logging and diagnostics
//! - [`ConfigError`]: configuration loading and registry construction failures

mod kind;

pub use kind::FailureKind;

use std::fmt;

use thiserror::Error;

/// A single provider failure recorded by the failover coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Registry name of the provider that failed.
    pub provider: String,
    /// The failure it reported.
    pub error: MarketDataError,
}

impl ProviderFailure {
    pub fn new(provider: impl Into<String>, error: MarketDataError) -> Self {
        Self {
            provider: provider.into(),
            error,
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// Errors that can occur while fetching company data.
///
/// The first four variants are reported by individual providers and are never
/// fatal to a failover chain. Only [`AllProvidersFailed`](Self::AllProvidersFailed)
/// is surfaced to callers of the coordinator.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum MarketDataError {
    /// The network call did not complete within its deadline.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider's call quota is exhausted.
    ///
    /// Raised pre-flight by the provider's own rate tracker, or when the
    /// vendor itself reports that its quota was exceeded.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that is rate limited
        provider: String,
    },

    /// The vendor response could not be normalized into even a minimal
    /// canonical shape (undecodable payload or no company name).
    #[error("Malformed response: {provider} - {message}")]
    Malformed {
        /// The provider that returned the payload
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// Any other network-layer failure or non-success status.
    #[error("Provider unavailable: {provider} - {message}")]
    Unavailable {
        /// The provider that failed
        provider: String,
        /// Transport error or HTTP status description
        message: String,
    },

    /// Every provider in the failover chain failed.
    /// Causes are kept in the order the providers were attempted.
    #[error("All providers failed: [{}]", format_causes(.causes))]
    AllProvidersFailed {
        /// Per-provider failures, in attempt order
        causes: Vec<ProviderFailure>,
    },
}

fn format_causes(causes: &[ProviderFailure]) -> String {
    causes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl MarketDataError {
    pub fn timeout(provider: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
        }
    }

    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
        }
    }

    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns the flat classification of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use finledger_market_data::errors::{FailureKind, MarketDataError};
    ///
    /// let error = MarketDataError::rate_limited("alpha");
    /// assert_eq!(error.kind(), FailureKind::RateLimited);
    /// ```
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Malformed { .. } => FailureKind::Malformed,
            Self::Unavailable { .. } => FailureKind::Unavailable,
            Self::AllProvidersFailed { .. } => FailureKind::Exhausted,
        }
    }

    /// True for the four kinds a single provider can report.
    pub fn is_provider_failure(&self) -> bool {
        !matches!(self, Self::AllProvidersFailed { .. })
    }

    /// The ordered causes of a chain failure; empty for provider failures.
    pub fn causes(&self) -> &[ProviderFailure] {
        match self {
            Self::AllProvidersFailed { causes } => causes,
            _ => &[],
        }
    }

    /// The last recorded cause of a chain failure.
    pub fn terminal_cause(&self) -> Option<&ProviderFailure> {
        self.causes().last()
    }
}

/// Configuration loading and registry construction errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse configuration.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// A provider has no usable API credential.
    #[error("no API credential for provider '{0}'")]
    MissingCredential(String),

    /// Two providers share a registry name.
    #[error("duplicate provider name '{0}'")]
    DuplicateProvider(String),

    /// The HTTP client for a provider could not be built.
    #[error("failed to build HTTP client for provider '{provider}': {message}")]
    HttpClient {
        /// Registry name of the provider.
        provider: String,
        /// Builder error.
        message: String,
    },

    /// The provider list is empty.
    #[error("no providers configured")]
    NoProviders,

    /// Environment variable error.
    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
