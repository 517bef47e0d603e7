//! Alpha-spending functions
//!
//! Each family maps an information fraction `t` to the cumulative alpha
//! available at `t`. All are non-decreasing in `t`, near zero as `t -> 0`,
//! and return exactly `α` at `t = 1`.
//!
//! References:
//! - Lan KKG, DeMets DL (1983). Discrete sequential boundaries for clinical
//!   trials. *Biometrika* 70:659–663.
//! - Kim K, DeMets DL (1987). Design and analysis of group sequential tests
//!   based on the type I error spending rate function. *Biometrika* 74:149–154.

use std::f64::consts::E;

use crate::experiment::SpendingFamily;
use crate::stats::{normal_quantile, normal_sf};

impl SpendingFamily {
    /// Cumulative alpha spent at information fraction `t`.
    ///
    /// `lambda` is only read by the power and exponential families. The
    /// result is clamped to `[0, alpha]`.
    #[must_use]
    pub fn cumulative_alpha(self, t: f64, alpha: f64, lambda: f64) -> f64 {
        if t >= 1.0 {
            return alpha;
        }
        if t <= 0.0 {
            return 0.0;
        }

        let spent = match self {
            Self::Linear => alpha * t,
            Self::Power => alpha * t.powf(lambda),
            Self::Exponential => alpha * (-lambda * t).exp_m1() / (-lambda).exp_m1(),
            Self::Pocock => alpha * (1.0 + (E - 1.0) * t).ln(),
            Self::ObrienFleming => {
                let z = normal_quantile(1.0 - alpha / 2.0);
                2.0 * normal_sf(z / t.sqrt())
            }
        };
        spent.clamp(0.0, alpha)
    }
}
