use std::fmt;

/// Flat classification of a [`MarketDataError`](super::MarketDataError).
///
/// | Kind | Reported by | Coordinator response |
/// |------|-------------|----------------------|
/// | `Timeout` | provider or chain deadline | next provider, or stop if the chain deadline passed |
/// | `RateLimited` | provider (pre-flight or vendor quota) | next provider, no delay |
/// | `Malformed` | provider | next provider |
/// | `Unavailable` | provider | next provider |
/// | `Exhausted` | coordinator | surfaced to the caller |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FailureKind {
    Timeout,
    RateLimited,
    Malformed,
    Unavailable,
    Exhausted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::RateLimited => "RATE_LIMITED",
            Self::Malformed => "MALFORMED",
            Self::Unavailable => "UNAVAILABLE",
            Self::Exhausted => "ALL_PROVIDERS_FAILED",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
