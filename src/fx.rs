//! Exchange-rate collaborator
//!
//! The core never looks rates up itself: it calls an injected
//! [`RateSource`]. A cached value may be a few minutes stale; the core does
//! not retry or validate freshness. The TTL cache is an explicitly
//! constructed component owned by the caller, never a module-level
//! singleton.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cached::{Cached, TimedCache};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::money::Currency;

#[derive(Debug, Error, Clone)]
pub enum FxError {
    #[error("No rate available for {from} -> {to}")]
    RateUnavailable { from: Currency, to: Currency },
}

/// Synchronous rate lookup: `rate(from, to)` quoted as units of `to` per
/// one unit of `from`.
pub trait RateSource: Send + Sync {
    fn rate(&self, from: &Currency, to: &Currency) -> Result<Decimal, FxError>;
}

/// Static rate table, used for wiring and tests.
///
/// Quotes are directional; the reverse direction must be listed explicitly.
pub struct FixedRateSource {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl FixedRateSource {
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

impl Default for FixedRateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RateSource for FixedRateSource {
    fn rate(&self, from: &Currency, to: &Currency) -> Result<Decimal, FxError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(&(from.clone(), to.clone()))
            .copied()
            .ok_or_else(|| FxError::RateUnavailable {
                from: from.clone(),
                to: to.clone(),
            })
    }
}

/// TTL cache over any [`RateSource`].
///
/// Owned and injected by the caller; the TTL is stated at construction.
pub struct FxCache {
    inner: Arc<dyn RateSource>,
    cache: Mutex<TimedCache<(Currency, Currency), Decimal>>,
}

impl FxCache {
    pub fn new(inner: Arc<dyn RateSource>, ttl_secs: u64) -> Self {
        Self {
            inner,
            cache: Mutex::new(TimedCache::with_lifespan(ttl_secs)),
        }
    }
}

impl RateSource for FxCache {
    fn rate(&self, from: &Currency, to: &Currency) -> Result<Decimal, FxError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let key = (from.clone(), to.clone());
        {
            let mut cache = self.cache.lock().expect("fx cache poisoned");
            if let Some(rate) = cache.cache_get(&key) {
                return Ok(*rate);
            }
        }
        let rate = self.inner.rate(from, to)?;
        self.cache
            .lock()
            .expect("fx cache poisoned")
            .cache_set(key, rate);
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("USD")
    }

    fn eur() -> Currency {
        Currency::new("EUR")
    }

    #[test]
    fn test_identity_rate() {
        let source = FixedRateSource::new();
        assert_eq!(source.rate(&usd(), &usd()).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_fixed_rate_lookup() {
        let source = FixedRateSource::new().with_rate(usd(), eur(), dec!(0.92));
        assert_eq!(source.rate(&usd(), &eur()).unwrap(), dec!(0.92));
        assert!(matches!(
            source.rate(&eur(), &usd()),
            Err(FxError::RateUnavailable { .. })
        ));
    }

    #[test]
    fn test_cache_serves_stored_rate() {
        let source = Arc::new(FixedRateSource::new().with_rate(usd(), eur(), dec!(0.92)));
        let cache = FxCache::new(source, 60);
        assert_eq!(cache.rate(&usd(), &eur()).unwrap(), dec!(0.92));
        // Second hit comes from the cache
        assert_eq!(cache.rate(&usd(), &eur()).unwrap(), dec!(0.92));
    }

    #[test]
    fn test_cache_misses_propagate() {
        let cache = FxCache::new(Arc::new(FixedRateSource::new()), 60);
        assert!(cache.rate(&usd(), &eur()).is_err());
    }
}
