//! Price data validation.
//!
//! Validates vendor price data before it reaches the canonical snapshot:
//! - Price within a sane range
//! - Trading day not stale and not in the future
//! - Daily change within a plausible band
//! - Symbol format
//!
//! Failing values are dropped by the adapters, never replaced with zero.

use chrono::NaiveDate;
use log::{error, warn};
use rust_decimal::Decimal;

use crate::models::{exchange_from_symbol, parse_decimal};

/// Price validator configuration.
#[derive(Clone, Debug)]
pub struct PriceValidationConfig {
    /// Lowest acceptable price.
    pub min_price: Decimal,
    /// Highest acceptable price.
    pub max_price: Decimal,
    /// Oldest acceptable trading day, in days before today.
    pub max_data_age_days: i64,
    /// Largest acceptable absolute daily change, in percent.
    pub max_change_percent: Decimal,
}

impl Default for PriceValidationConfig {
    fn default() -> Self {
        Self {
            min_price: Decimal::new(1, 2),         // 0.01
            max_price: Decimal::from(1_000_000i64), // 10 lakh
            max_data_age_days: 7,
            max_change_percent: Decimal::from(20),
        }
    }
}

/// Price data validator.
#[derive(Clone, Debug, Default)]
pub struct PriceValidator {
    config: PriceValidationConfig,
}

impl PriceValidator {
    /// Create a new validator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: PriceValidationConfig) -> Self {
        Self { config }
    }

    /// Check a price against the configured range.
    pub fn is_valid_price(&self, symbol: &str, price: Decimal) -> bool {
        if price <= Decimal::ZERO {
            error!("Invalid price (<=0) for symbol {}: {}", symbol, price);
            return false;
        }
        if price < self.config.min_price {
            warn!(
                "Price too low for symbol {}: {}. Minimum: {}",
                symbol, price, self.config.min_price
            );
            return false;
        }
        if price > self.config.max_price {
            error!(
                "Price too high for symbol {}: {}. Maximum: {}",
                symbol, price, self.config.max_price
            );
            return false;
        }
        true
    }

    /// Check that a `YYYY-MM-DD` trading day is recent relative to `as_of`.
    pub fn is_fresh(&self, symbol: &str, trading_day: &str, as_of: NaiveDate) -> bool {
        let day = match NaiveDate::parse_from_str(trading_day.trim(), "%Y-%m-%d") {
            Ok(day) => day,
            Err(_) => {
                error!(
                    "Invalid date format for symbol {}: '{}'. Expected: YYYY-MM-DD",
                    symbol, trading_day
                );
                return false;
            }
        };

        let age = (as_of - day).num_days();
        if age < 0 {
            error!("Future trading day for symbol {}: {}", symbol, trading_day);
            return false;
        }
        if age > self.config.max_data_age_days {
            warn!(
                "Stale data for symbol {}: trading day {} is {} days old",
                symbol, trading_day, age
            );
            return false;
        }
        true
    }

    /// Check a `"5.25%"` style change. Missing change data is acceptable.
    pub fn is_reasonable_change(&self, symbol: &str, change_percent: Option<&str>) -> bool {
        let Some(raw) = change_percent else {
            return true;
        };
        let Some(change) = parse_decimal(raw.trim().trim_end_matches('%')) else {
            return true;
        };
        if change.abs() > self.config.max_change_percent {
            warn!(
                "Large price change for symbol {}: {}%. Possible circuit breaker hit or data error",
                symbol, change
            );
            return false;
        }
        true
    }

    /// Check the symbol shape: `RELIANCE`, `M&M`, `RELIANCE.BSE`, `TCS.NS`.
    ///
    /// The suffix must name an exchange the adapters recognise.
    pub fn is_valid_symbol(&self, symbol: &str) -> bool {
        let (base, suffix) = match symbol.rsplit_once('.') {
            Some((base, suffix)) => (base, Some(suffix)),
            None => (symbol, None),
        };

        let base_ok = !base.is_empty()
            && base
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '&' || c == '-');
        let suffix_ok = match suffix {
            Some(suffix) => {
                suffix.chars().all(|c| c.is_ascii_uppercase())
                    && exchange_from_symbol(symbol).is_some()
            }
            None => true,
        };

        base_ok && suffix_ok
    }
}
