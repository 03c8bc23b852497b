//! Fixed-window call quota for a single provider.
//!
//! Each adapter owns one [`RateTracker`]. A window admits at most `capacity`
//! calls; once `window` has elapsed since the window opened, the count resets.
//! Exhaustion is reported immediately, never waited out.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Default quota: 60 calls per minute.
const DEFAULT_CAPACITY: u32 = 60;

/// Default window length.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Rate window configuration for a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum calls admitted per window.
    pub capacity: u32,
    /// Window length.
    #[serde(rename = "window_secs", with = "duration_secs")]
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self { capacity, window }
    }

    /// Calls per minute, the way most vendors publish their limits.
    pub fn per_minute(capacity: u32) -> Self {
        Self::new(capacity, Duration::from_secs(60))
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            window: DEFAULT_WINDOW,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Bookkeeping for the current window.
#[derive(Debug)]
struct Window {
    /// When the current window opened.
    started: Instant,
    /// Calls admitted in the current window.
    used: u32,
}

impl Window {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            used: 0,
        }
    }

    /// Open a fresh window if the current one has expired.
    fn roll(&mut self, length: Duration) {
        let now = Instant::now();
        if now.duration_since(self.started) >= length {
            self.started = now;
            self.used = 0;
        }
    }
}

/// Thread-safe fixed-window call counter for one provider.
///
/// [`try_acquire`](Self::try_acquire) is an atomic check-and-increment: two
/// concurrent callers can never both take the last slot.
#[derive(Debug)]
pub struct RateTracker {
    provider: String,
    config: RateLimitConfig,
    window: Mutex<Window>,
}

impl RateTracker {
    pub fn new(provider: impl Into<String>, config: RateLimitConfig) -> Self {
        Self {
            provider: provider.into(),
            config,
            window: Mutex::new(Window::new()),
        }
    }

    /// Lock the window, recovering from poison if necessary.
    ///
    /// The counter stays consistent across a panic (it is only ever
    /// incremented after the capacity check), so the inner value is usable.
    fn lock_window(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(|poisoned| {
            warn!(
                "Rate tracker mutex for '{}' was poisoned, recovering",
                self.provider
            );
            poisoned.into_inner()
        })
    }

    /// Try to take one call slot.
    ///
    /// Returns true if the call may proceed, false if the window's quota is spent.
    pub fn try_acquire(&self) -> bool {
        let mut window = self.lock_window();
        window.roll(self.config.window);

        if window.used < self.config.capacity {
            window.used += 1;
            debug!(
                "Rate tracker: '{}' used {}/{}",
                self.provider, window.used, self.config.capacity
            );
            true
        } else {
            warn!(
                "Rate tracker: quota exhausted for '{}' ({} calls per {:?})",
                self.provider, self.config.capacity, self.config.window
            );
            false
        }
    }

    /// Slots left in the current window.
    pub fn remaining(&self) -> u32 {
        let mut window = self.lock_window();
        window.roll(self.config.window);
        self.config.capacity.saturating_sub(window.used)
    }

    /// Calls admitted in the current window.
    pub fn used(&self) -> u32 {
        let mut window = self.lock_window();
        window.roll(self.config.window);
        window.used
    }

    /// Start a fresh window immediately.
    pub fn reset(&self) {
        *self.lock_window() = Window::new();
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}
