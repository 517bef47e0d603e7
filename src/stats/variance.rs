//! Two-sided F test for equality of variances on summary data

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use super::Tail;
use crate::{Error, Result};

/// Outcome of the variance-equality check that picks pooled vs Welch errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceCheck {
    /// Larger sample variance over smaller (always >= 1).
    pub f_statistic: f64,
    /// Numerator degrees of freedom (arm with the larger variance).
    pub df_numerator: u64,
    /// Denominator degrees of freedom.
    pub df_denominator: u64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// True when H0 (equal variances) is not rejected at `alpha`.
    pub equal_variances: bool,
}

impl VarianceCheck {
    /// Run the F test for two arms given `(n, sd)` each.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVariant`] if either arm has fewer than two
    /// units or a negative standard deviation.
    #[allow(clippy::cast_precision_loss)]
    pub fn run(n1: u64, sd1: f64, n2: u64, sd2: f64, alpha: f64) -> Result<Self> {
        if n1 < 2 || n2 < 2 {
            return Err(Error::InvalidVariant(
                "variance check needs at least 2 units per arm".to_string(),
            ));
        }
        if sd1 < 0.0 || sd2 < 0.0 {
            return Err(Error::InvalidVariant(
                "standard deviations cannot be negative".to_string(),
            ));
        }

        let (var1, var2) = (sd1 * sd1, sd2 * sd2);
        let (f_statistic, df_numerator, df_denominator) = if var1 >= var2 {
            (var1 / var2.max(f64::MIN_POSITIVE), n1 - 1, n2 - 1)
        } else {
            (var2 / var1.max(f64::MIN_POSITIVE), n2 - 1, n1 - 1)
        };

        let dist = FisherSnedecor::new(df_numerator as f64, df_denominator as f64)
            .map_err(|e| Error::InvalidVariant(format!("cannot build F distribution: {e}")))?;
        let p_value = Tail::Both.p_value(dist.cdf(f_statistic), dist.sf(f_statistic));

        Ok(Self {
            f_statistic,
            df_numerator,
            df_denominator,
            p_value,
            equal_variances: p_value >= alpha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_variances_are_equal() {
        let check = VarianceCheck::run(50, 2.0, 80, 2.0, 0.05).unwrap();
        assert!((check.f_statistic - 1.0).abs() < 1e-12);
        assert!(check.equal_variances);
        assert!(check.p_value > 0.5);
    }

    #[test]
    fn test_orientation_puts_larger_variance_on_top() {
        let check = VarianceCheck::run(10, 1.0, 20, 3.0, 0.05).unwrap();
        assert!((check.f_statistic - 9.0).abs() < 1e-12);
        assert_eq!(check.df_numerator, 19);
        assert_eq!(check.df_denominator, 9);
    }

    #[test]
    fn test_large_samples_detect_modest_ratio() {
        // (45/42)^2 ≈ 1.148 is significant with 5000 units per arm.
        let check = VarianceCheck::run(5000, 45.0, 5000, 42.0, 0.05).unwrap();
        assert!(!check.equal_variances);
        assert!(check.p_value < 0.001);
    }

    #[test]
    fn test_rejects_single_unit_arm() {
        assert!(VarianceCheck::run(1, 1.0, 10, 1.0, 0.05).is_err());
    }
}
