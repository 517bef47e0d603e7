//! Sample-size inflation factors
//!
//! Ratio of the maximum group-sequential sample size to the fixed-sample
//! size, for two-sided α = 0.05 and 80% power, indexed by the total number
//! of analyses K = interim looks + 1.
//!
//! Pocock designs past the tabled range use the Bonferroni-style
//! approximation `((z* + z_β) / (z_α/2 + z_β))²` with
//! `z* = Φ⁻¹(1 − α / (2√K))`, floored at the last tabled value.
//!
//! References:
//! - Jennison C, Turnbull BW (2000). *Group Sequential Methods with
//!   Applications to Clinical Trials*, Tables 2.1 and 2.3.

use crate::experiment::InflationTechnique;
use crate::stats::normal_quantile;
use crate::{Error, Result};

/// Pocock `R_P(K)` for K = 1..=10.
static POCOCK: [f64; 10] = [
    1.000, 1.110, 1.166, 1.202, 1.229, 1.249, 1.265, 1.279, 1.291, 1.301,
];

/// O'Brien-Fleming `R_B(K)` for K = 1..=5.
static OBRIEN_FLEMING: [f64; 5] = [1.000, 1.008, 1.017, 1.024, 1.028];

/// Design level the tables are computed for.
const TABLE_ALPHA: f64 = 0.05;

/// Design power the tables are computed for.
const TABLE_POWER: f64 = 0.80;

/// Pocock factor for `analyses` beyond the table.
#[allow(clippy::cast_precision_loss)]
fn pocock_extrapolated(analyses: usize) -> f64 {
    let z_beta = normal_quantile(TABLE_POWER);
    let z_fixed = normal_quantile(1.0 - TABLE_ALPHA / 2.0);
    let z_star = normal_quantile(1.0 - TABLE_ALPHA / (2.0 * (analyses as f64).sqrt()));
    let ratio = (z_star + z_beta) / (z_fixed + z_beta);
    (ratio * ratio).max(POCOCK[POCOCK.len() - 1])
}

impl InflationTechnique {
    fn table(self) -> &'static [f64] {
        match self {
            Self::Pocock => &POCOCK,
            Self::ObrienFleming => &OBRIEN_FLEMING,
        }
    }

    /// Largest supported interim look count (final analysis excluded), or
    /// `None` when the technique accepts any count.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn max_looks(self) -> Option<u32> {
        match self {
            Self::Pocock => None,
            Self::ObrienFleming => Some(OBRIEN_FLEMING.len() as u32 - 1),
        }
    }

    /// Check that `looks` interim looks are supported by this technique.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SequentialSchedule`] if `looks` is zero or exceeds
    /// [`Self::max_looks`].
    pub fn check_looks(self, looks: u32) -> Result<()> {
        if looks == 0 {
            return Err(Error::SequentialSchedule(format!(
                "{self:?} inflation needs at least 1 interim look"
            )));
        }
        if let Some(max) = self.max_looks().filter(|&max| looks > max) {
            return Err(Error::SequentialSchedule(format!(
                "{self:?} inflation supports 1 to {max} interim looks, got {looks}"
            )));
        }
        Ok(())
    }

    /// Inflation factor for `looks` interim looks plus the final analysis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SequentialSchedule`] if the look count is unsupported.
    pub fn inflation_factor(self, looks: u32) -> Result<f64> {
        self.check_looks(looks)?;
        let analyses = looks as usize + 1;
        Ok(self
            .table()
            .get(analyses - 1)
            .copied()
            .unwrap_or_else(|| pocock_extrapolated(analyses)))
    }
}
