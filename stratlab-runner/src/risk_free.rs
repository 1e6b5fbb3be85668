//! Risk-free rate resolution.
//!
//! Market-rate lookups are an external concern; this module only defines the
//! seam (`RiskFreeRateProvider`) and the resolution order:
//! explicit rate, then the first plausible provider quote, then the fallback.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Annual risk-free rate used when nothing better is available.
pub const FALLBACK_RISK_FREE_RATE: f64 = 0.02;

/// Provider quotes outside this open interval are treated as bad data.
const PLAUSIBLE_RANGE: (f64, f64) = (0.001, 0.20);

#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("rate source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed rate quote: {0}")]
    Malformed(String),
}

/// A source of the current annual risk-free rate, as a fraction (0.0425).
pub trait RiskFreeRateProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_annual_rate(&self) -> Result<f64, RateFetchError>;
}

/// Converts a yield quoted in percent (4.25) to a fraction (0.0425).
pub fn percent_quote_to_fraction(quote: f64) -> f64 {
    quote / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Supplied,
    Provider(String),
    Fallback,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSource::Supplied => write!(f, "supplied"),
            RateSource::Provider(name) => write!(f, "{name}"),
            RateSource::Fallback => write!(f, "default fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFreeRate {
    pub rate: f64,
    pub source: RateSource,
}

impl RiskFreeRate {
    pub fn fallback() -> Self {
        Self {
            rate: FALLBACK_RISK_FREE_RATE,
            source: RateSource::Fallback,
        }
    }
}

fn is_plausible(rate: f64) -> bool {
    rate.is_finite() && rate > PLAUSIBLE_RANGE.0 && rate < PLAUSIBLE_RANGE.1
}

/// Resolves the rate to use for Sharpe ratios. Never fails.
pub fn resolve_risk_free_rate(
    explicit: Option<f64>,
    providers: &[&dyn RiskFreeRateProvider],
) -> RiskFreeRate {
    if let Some(rate) = explicit {
        if rate.is_finite() {
            return RiskFreeRate {
                rate,
                source: RateSource::Supplied,
            };
        }
        tracing::warn!(rate, "ignoring non-finite supplied risk-free rate");
    }

    for provider in providers {
        match provider.fetch_annual_rate() {
            Ok(rate) if is_plausible(rate) => {
                tracing::debug!(provider = provider.name(), rate, "resolved risk-free rate");
                return RiskFreeRate {
                    rate,
                    source: RateSource::Provider(provider.name().to_string()),
                };
            }
            Ok(rate) => {
                tracing::warn!(provider = provider.name(), rate, "implausible risk-free rate quote");
            }
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "risk-free rate fetch failed");
            }
        }
    }

    tracing::warn!(
        rate = FALLBACK_RISK_FREE_RATE,
        "no risk-free rate source succeeded, using fallback"
    );
    RiskFreeRate::fallback()
}
