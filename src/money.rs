//! Money Parsing Module
//!
//! Strict conversion from client-facing string amounts to [`Decimal`].
//! All API amount input MUST go through [`parse_amount`]: validation is an
//! explicit parsing function returning a typed result, not an annotation on
//! a request object.
//!
//! ## Rules
//! - No sign characters (`-1.5` and `+1.5` are both rejected)
//! - Both sides of the decimal point must be present (`.5`, `5.` rejected)
//! - Fractional digits are capped per currency scale
//! - Zero is not a valid funds-movement amount

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum fractional digits accepted for any currency.
pub const MAX_SCALE: u32 = 8;

/// Money validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// ISO-style currency code (`USD`, `EUR`, ...), stored uppercase.
///
/// Equality and hashing are on the normalized code, so `usd` and `USD`
/// name the same currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Currency::new(code)
    }
}

/// Parse a client-provided amount string into a positive [`Decimal`].
///
/// # Arguments
/// * `amount_str` - Client amount string (e.g. `"1.5"`, `"100"`)
/// * `max_scale` - Maximum fractional digits for the target currency
///
/// # Errors
/// * `InvalidFormat` - empty input, sign characters, bare `.5` / `5.`
/// * `PrecisionOverflow` - more fractional digits than `max_scale`
/// * `InvalidAmount` - zero
pub fn parse_amount(amount_str: &str, max_scale: u32) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(MoneyError::InvalidFormat("sign not allowed".into()));
    }

    let parts: Vec<&str> = amount_str.split('.').collect();
    match parts.len() {
        1 => {}
        2 => {
            // Require both sides of the dot to be non-empty.
            // This rejects ambiguous formats like ".5" or "5."
            if parts[0].is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing leading zero (e.g., use 0.5 instead of .5)".into(),
                ));
            }
            if parts[1].is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
                ));
            }
            let provided = parts[1].len() as u32;
            if provided > max_scale {
                return Err(MoneyError::PrecisionOverflow {
                    provided,
                    max: max_scale,
                });
            }
        }
        _ => {
            return Err(MoneyError::InvalidFormat("multiple decimal points".into()));
        }
    }

    let value: Decimal = amount_str
        .parse()
        .map_err(|_| MoneyError::InvalidFormat(amount_str.to_string()))?;

    require_positive(value)
}

/// Validate that an already-typed amount is usable for a funds movement.
pub fn require_positive(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount <= Decimal::ZERO {
        return Err(MoneyError::InvalidAmount);
    }
    if amount.scale() > MAX_SCALE {
        return Err(MoneyError::PrecisionOverflow {
            provided: amount.scale(),
            max: MAX_SCALE,
        });
    }
    Ok(amount)
}
