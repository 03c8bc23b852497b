//! # Configuration
//!
//! Provider chain configuration and the single initialization step that turns
//! it into a [`ProviderRegistry`].
//!
//! Configuration is JSON:
//!
//! ```json
//! {
//!   "chain_deadline_ms": 15000,
//!   "providers": [
//!     { "name": "indian_api", "kind": "indian_api", "api_key_env": "INDIAN_API_KEY" },
//!     { "name": "alpha_vantage", "kind": "alpha_vantage", "api_key_env": "ALPHA_VANTAGE_API_KEY",
//!       "rate_limit": { "capacity": 5, "window_secs": 60 }, "default_exchange": "BSE" }
//!   ]
//! }
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `FINLEDGER_MARKET_DATA_CONFIG` | Path of the JSON configuration file |
//! | any `api_key_env` value | Credential for that provider |

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::models::NSE;
use crate::provider::alpha_vantage::{self, AlphaVantageProvider};
use crate::provider::indian_api::{self, IndianApiProvider};
use crate::provider::{AuditSink, MarketDataProvider, VendorSettings};
use crate::registry::{FailoverCoordinator, ProviderRegistry, RateLimitConfig, RegistryEntry};

/// Environment variable holding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "FINLEDGER_MARKET_DATA_CONFIG";

// ============================================================================
// Provider Configuration
// ============================================================================

/// Which adapter serves a configured provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    AlphaVantage,
    IndianApi,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::AlphaVantage => alpha_vantage::BASE_URL,
            Self::IndianApi => indian_api::BASE_URL,
        }
    }

    /// Published free-tier quota.
    pub fn default_rate_limit(&self) -> RateLimitConfig {
        match self {
            Self::AlphaVantage => RateLimitConfig::per_minute(5),
            Self::IndianApi => RateLimitConfig::default(),
        }
    }
}

/// One entry of the failover chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique registry name.
    pub name: String,

    /// Adapter kind.
    pub kind: ProviderKind,

    /// Vendor endpoint. Defaults to the vendor's public endpoint.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Inline credential.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the credential.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Attempt priority, lower first. Defaults to the list position.
    #[serde(default)]
    pub priority: Option<u32>,

    /// Call quota. Defaults to the vendor's free tier.
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,

    /// Whole-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Exchange for flat prices on symbols without a suffix.
    #[serde(default = "default_exchange")]
    pub default_exchange: String,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base_url: None,
            api_key: None,
            api_key_env: None,
            priority: None,
            rate_limit: None,
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            default_exchange: default_exchange(),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        self.rate_limit
            .unwrap_or_else(|| self.kind.default_rate_limit())
    }

    /// Resolve the credential from `api_key`, then from `api_key_env`.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        let inline = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());
        if let Some(key) = inline {
            return Ok(key.to_string());
        }

        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential(self.name.clone()))
    }

    fn settings(&self) -> Result<VendorSettings, ConfigError> {
        Ok(
            VendorSettings::new(&self.name, self.base_url(), self.resolve_api_key()?)
                .with_rate_limit(self.rate_limit())
                .with_timeout(Duration::from_millis(self.timeout_ms))
                .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms)),
        )
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let field = |name: &str| format!("providers[{}].{}", index, name);

        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: field("name"),
                message: "provider name must not be empty".to_string(),
            });
        }

        Url::parse(self.base_url()).map_err(|e| ConfigError::InvalidValue {
            field: field("base_url"),
            message: format!("'{}' is not a valid URL: {}", self.base_url(), e),
        })?;

        if self.rate_limit().window.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: field("rate_limit.window_secs"),
                message: "rate window must be longer than zero".to_string(),
            });
        }

        if self.timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: field("timeout_ms"),
                message: "timeouts must be longer than zero".to_string(),
            });
        }

        if self.default_exchange.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: field("default_exchange"),
                message: "default exchange must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Failover Configuration
// ============================================================================

/// The ordered provider list plus chain-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverConfig {
    /// Providers, in default attempt order.
    pub providers: Vec<ProviderConfig>,

    /// Time budget for a whole failover chain, in milliseconds.
    #[serde(default)]
    pub chain_deadline_ms: Option<u64>,
}

impl FailoverConfig {
    /// Load from the file named by [`CONFIG_PATH_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)?;
        Self::from_file(path)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty provider list, a duplicate name, or any
    /// provider with an invalid value. Credentials are checked when the
    /// registry is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }

        let mut seen = HashSet::new();
        for (index, provider) in self.providers.iter().enumerate() {
            provider.validate(index)?;
            if !seen.insert(provider.name.as_str()) {
                return Err(ConfigError::DuplicateProvider(provider.name.clone()));
            }
        }

        if self.chain_deadline_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "chain_deadline_ms".to_string(),
                message: "chain deadline must be longer than zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn chain_deadline(&self) -> Option<Duration> {
        self.chain_deadline_ms.map(Duration::from_millis)
    }
}

// ============================================================================
// Registry Construction
// ============================================================================

/// Build the provider registry from configuration.
///
/// Every adapter shares `audit`. Priorities default to list position.
pub fn build_registry(
    config: &FailoverConfig,
    audit: Arc<dyn AuditSink>,
) -> Result<ProviderRegistry, ConfigError> {
    config.validate()?;

    let entries = config
        .providers
        .iter()
        .enumerate()
        .map(|(index, provider_config)| -> Result<RegistryEntry, ConfigError> {
            let settings = provider_config.settings()?;
            let provider: Arc<dyn MarketDataProvider> = match provider_config.kind {
                ProviderKind::AlphaVantage => Arc::new(
                    AlphaVantageProvider::new(settings, audit.clone())?
                        .with_default_exchange(provider_config.default_exchange.trim().to_string()),
                ),
                ProviderKind::IndianApi => {
                    Arc::new(IndianApiProvider::new(settings, audit.clone())?)
                }
            };

            info!(
                "Configured provider '{}' ({}) at {}",
                provider_config.name,
                provider.display_name(),
                provider_config.base_url()
            );

            Ok(RegistryEntry::new(
                provider_config.name.clone(),
                provider,
                provider_config.priority.unwrap_or(index as u32),
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    ProviderRegistry::new(entries)
}

/// Build the registry and wrap it in a coordinator with the configured deadline.
pub fn build_coordinator(
    config: &FailoverConfig,
    audit: Arc<dyn AuditSink>,
) -> Result<FailoverCoordinator, ConfigError> {
    let coordinator = FailoverCoordinator::new(Arc::new(build_registry(config, audit)?));
    Ok(match config.chain_deadline() {
        Some(budget) => coordinator.with_deadline(budget),
        None => coordinator,
    })
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_exchange() -> String {
    NSE.to_string()
}
