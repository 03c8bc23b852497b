//! Per-attempt tracking for failover diagnostics.

use std::time::Duration;

use serde::Serialize;

use crate::errors::{FailureKind, MarketDataError};

/// How a single provider attempt ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The provider returned a snapshot.
    Success,
    /// The provider was called and failed.
    Failed(MarketDataError),
    /// The chain deadline had passed before the provider was started.
    DeadlineExceeded,
}

/// Record of a single provider attempt during a fetch.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider: String,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

impl ProviderAttempt {
    /// Failure classification, `None` for a success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            AttemptOutcome::Success => None,
            AttemptOutcome::Failed(e) => Some(e.kind()),
            AttemptOutcome::DeadlineExceeded => Some(FailureKind::Timeout),
        }
    }
}

/// Detailed result of a fetch operation.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub symbol: String,
    pub attempts: Vec<ProviderAttempt>,
    pub elapsed: Duration,
}

impl FetchDiagnostics {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            attempts: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn record_success(&mut self, provider: &str, elapsed: Duration) {
        self.push(provider, AttemptOutcome::Success, elapsed);
    }

    pub fn record_error(&mut self, provider: &str, error: MarketDataError, elapsed: Duration) {
        self.push(provider, AttemptOutcome::Failed(error), elapsed);
    }

    pub fn record_not_started(&mut self, provider: &str) {
        self.push(provider, AttemptOutcome::DeadlineExceeded, Duration::ZERO);
    }

    fn push(&mut self, provider: &str, outcome: AttemptOutcome, elapsed: Duration) {
        self.attempts.push(ProviderAttempt {
            provider: provider.to_string(),
            outcome,
            elapsed,
        });
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::Success => {
                    format!("{}: SUCCESS ({}ms)", a.provider, a.elapsed.as_millis())
                }
                AttemptOutcome::Failed(e) => format!(
                    "{}: {} ({}ms)",
                    a.provider,
                    e.kind(),
                    a.elapsed.as_millis()
                ),
                AttemptOutcome::DeadlineExceeded => {
                    format!("{}: NOT STARTED (deadline)", a.provider)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Check if any provider succeeded.
    pub fn has_success(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.outcome == AttemptOutcome::Success)
    }

    /// The provider that served the request, if any.
    pub fn served_by(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.outcome == AttemptOutcome::Success)
            .map(|a| a.provider.as_str())
    }

    /// Providers that were actually called, in order.
    pub fn attempted(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter(|a| a.outcome != AttemptOutcome::DeadlineExceeded)
            .map(|a| a.provider.as_str())
            .collect()
    }

    /// Serializable view for hosts that persist or print diagnostics.
    pub fn report(&self) -> DiagnosticsReport {
        DiagnosticsReport {
            symbol: self.symbol.clone(),
            elapsed_ms: self.elapsed.as_millis() as u64,
            attempts: self
                .attempts
                .iter()
                .map(|a| AttemptReport {
                    provider: a.provider.clone(),
                    outcome: a
                        .failure_kind()
                        .map_or("SUCCESS", |kind| kind.as_str())
                        .to_string(),
                    message: match &a.outcome {
                        AttemptOutcome::Failed(e) => Some(e.to_string()),
                        AttemptOutcome::DeadlineExceeded => {
                            Some("deadline passed before start".to_string())
                        }
                        AttemptOutcome::Success => None,
                    },
                    elapsed_ms: a.elapsed.as_millis() as u64,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub symbol: String,
    pub elapsed_ms: u64,
    pub attempts: Vec<AttemptReport>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReport {
    pub provider: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub elapsed_ms: u64,
}
