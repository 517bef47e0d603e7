//! Reference distributions and tail handling
//!
//! Thin layer over `statrs` so the engines speak in terms of statistics and
//! tails rather than distribution objects.

mod variance;

pub use variance::VarianceCheck;

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::function::erf;
use std::f64::consts::SQRT_2;

use crate::experiment::TestIntent;
use crate::{Error, Result};

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Standard normal CDF.
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erf::erfc(-x / SQRT_2)
}

/// Standard normal survival function P(Z > x).
#[must_use]
pub fn normal_sf(x: f64) -> f64 {
    0.5 * erf::erfc(x / SQRT_2)
}

/// Standard normal quantile (inverse CDF) for `p` in (0, 1).
#[must_use]
pub fn normal_quantile(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    -SQRT_2 * erf::erfc_inv(2.0 * p)
}

/// Which tail(s) of the reference distribution count as evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// H1: statistic large.
    Upper,
    /// H1: statistic small.
    Lower,
    /// H1: statistic far from zero either way.
    Both,
}

impl From<TestIntent> for Tail {
    fn from(intent: TestIntent) -> Self {
        match intent {
            TestIntent::DetectIncrease => Self::Upper,
            TestIntent::DetectDecrease => Self::Lower,
            TestIntent::DetectDifference => Self::Both,
        }
    }
}

impl Tail {
    /// Combine lower/upper tail probabilities into a p-value in [0, 1].
    #[must_use]
    pub fn p_value(self, cdf: f64, sf: f64) -> f64 {
        let p = match self {
            Self::Upper => sf,
            Self::Lower => cdf,
            Self::Both => 2.0 * cdf.min(sf),
        };
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Reference distribution for a two-sample statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference {
    /// Standard normal (large-sample approximation).
    Normal,
    /// Student-T with the given degrees of freedom.
    StudentT(f64),
}

impl Reference {
    /// Oriented p-value of `statistic` under this reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVariant`] if the degrees of freedom are not
    /// a valid Student-T parameter.
    pub fn p_value(self, statistic: f64, tail: Tail) -> Result<f64> {
        match self {
            Self::Normal => Ok(tail.p_value(normal_cdf(statistic), normal_sf(statistic))),
            Self::StudentT(df) => {
                let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| {
                    Error::InvalidVariant(format!("cannot build t distribution (df = {df}): {e}"))
                })?;
                Ok(tail.p_value(dist.cdf(statistic), dist.sf(statistic)))
            }
        }
    }
}

/// 95% normal-approximation interval `value ± 1.96·sd/√n`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn normal_interval(value: f64, std_dev: f64, n: u64) -> (f64, f64) {
    let margin = Z_95 * std_dev / (n.max(1) as f64).sqrt();
    (value - margin, value + margin)
}
