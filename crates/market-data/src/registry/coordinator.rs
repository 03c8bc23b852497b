//! Failover across the registered providers.
//!
//! Providers are tried strictly in registry order. The first success wins;
//! any provider failure is recorded and the next provider is tried at once,
//! with no retry and no backoff. When the list runs out, every recorded cause
//! is returned in attempt order inside [`MarketDataError::AllProvidersFailed`].
//!
//! An optional deadline bounds the whole chain. Each attempt runs under
//! [`tokio::time::timeout_at`]; when it fires, the in-flight provider future
//! is dropped (releasing its connection), a `Timeout` is recorded for that
//! provider and no further provider is started.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::{timeout_at, Instant};

use super::diagnostics::FetchDiagnostics;
use super::registry::ProviderRegistry;
use super::validator::PriceValidator;
use crate::errors::{MarketDataError, ProviderFailure};
use crate::models::CompanySnapshot;

/// Runs the failover chain for one symbol at a time.
///
/// Holds no per-request state, so one coordinator can serve any number of
/// concurrent requests.
pub struct FailoverCoordinator {
    registry: Arc<ProviderRegistry>,
    validator: PriceValidator,
    deadline: Option<Duration>,
}

impl FailoverCoordinator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            validator: PriceValidator::new(),
            deadline: None,
        }
    }

    /// Default time budget for the whole chain.
    pub fn with_deadline(mut self, budget: Duration) -> Self {
        self.deadline = Some(budget);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Fetch company data, failing over across providers.
    ///
    /// Uses the default chain budget, if one was configured.
    pub async fn fetch_with_failover(
        &self,
        symbol: &str,
    ) -> Result<CompanySnapshot, MarketDataError> {
        self.fetch_with_diagnostics(symbol).await.0
    }

    /// Fetch company data with the whole chain bounded by `deadline`.
    pub async fn fetch_with_deadline(
        &self,
        symbol: &str,
        deadline: Instant,
    ) -> Result<CompanySnapshot, MarketDataError> {
        self.run(symbol, Some(deadline)).await.0
    }

    /// Same as [`fetch_with_failover`](Self::fetch_with_failover), also
    /// returning a record of every attempt.
    pub async fn fetch_with_diagnostics(
        &self,
        symbol: &str,
    ) -> (Result<CompanySnapshot, MarketDataError>, FetchDiagnostics) {
        let deadline = self.deadline.map(|budget| Instant::now() + budget);
        self.run(symbol, deadline).await
    }

    async fn run(
        &self,
        symbol: &str,
        deadline: Option<Instant>,
    ) -> (Result<CompanySnapshot, MarketDataError>, FetchDiagnostics) {
        let symbol = symbol.trim().to_uppercase();
        if !self.validator.is_valid_symbol(&symbol) {
            warn!("Unexpected symbol format '{}', querying anyway", symbol);
        }

        let started = Instant::now();
        let mut diagnostics = FetchDiagnostics::new(symbol.as_str());
        let mut causes: Vec<ProviderFailure> = Vec::new();

        for entry in self.registry.ordered_providers() {
            let name = entry.name.as_str();

            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(
                    "Chain deadline passed before '{}' could start for {}",
                    name, symbol
                );
                causes.push(ProviderFailure::new(name, MarketDataError::timeout(name)));
                diagnostics.record_not_started(name);
                break;
            }

            debug!("Trying provider '{}' for {}", name, symbol);
            let attempt_started = Instant::now();

            let (result, deadline_hit) = match deadline {
                Some(d) => match timeout_at(d, entry.provider.fetch(&symbol)).await {
                    Ok(result) => (result, false),
                    Err(_) => (Err(MarketDataError::timeout(name)), true),
                },
                None => (entry.provider.fetch(&symbol).await, false),
            };
            let elapsed = attempt_started.elapsed();

            match result {
                Ok(snapshot) => {
                    info!(
                        "Provider '{}' served {} in {}ms",
                        name,
                        symbol,
                        elapsed.as_millis()
                    );
                    diagnostics.record_success(name, elapsed);
                    diagnostics.elapsed = started.elapsed();
                    return (Ok(snapshot), diagnostics);
                }
                Err(error) => {
                    warn!(
                        "Provider '{}' failed for {} ({}): {}",
                        name,
                        symbol,
                        error.kind(),
                        error
                    );
                    diagnostics.record_error(name, error.clone(), elapsed);
                    causes.push(ProviderFailure::new(name, error));

                    if deadline_hit {
                        warn!("Chain deadline exceeded during '{}' for {}", name, symbol);
                        break;
                    }
                }
            }
        }

        diagnostics.elapsed = started.elapsed();
        warn!(
            "All providers failed for {}: {}",
            symbol,
            diagnostics.summary()
        );
        (
            Err(MarketDataError::AllProvidersFailed { causes }),
            diagnostics,
        )
    }
}
