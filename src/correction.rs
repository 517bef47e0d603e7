//! Correction Engine
//!
//! Multiple-comparison adjustment for the k treatment-vs-control p-values
//! of one experiment.
//!
//! | Method     | Adjusted p                        | Corrected alpha (raw scale) |
//! |------------|-----------------------------------|-----------------------------|
//! | Bonferroni | `min(1, p·k)`                     | `α / k`                     |
//! | Holm       | `max_{j<=i} min(1, p_(j)·(k-j+1))` | `α / (k - i + 1)` at rank i |
//! | Šidák      | `1 - (1 - p)^k`                   | `1 - (1 - α)^(1/k)`         |
//!
//! With k = 1 every method is the identity.

use serde::{Deserialize, Serialize};

use crate::experiment::CorrectionKind;
use crate::{Error, Result};

/// Adjusted p-value and threshold for one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Multiplicity-adjusted p-value in [p, 1].
    pub adjusted_p_value: f64,
    /// Per-comparison threshold on the raw p-value scale.
    pub corrected_alpha: f64,
}

/// Adjust `p_values` (in comparison order) under `kind` at family level `alpha`.
///
/// The output is parallel to the input.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if `p_values` is empty or holds
/// a value outside [0, 1].
pub fn correct(p_values: &[f64], kind: CorrectionKind, alpha: f64) -> Result<Vec<Adjustment>> {
    if p_values.is_empty() {
        return Err(Error::InvalidConfiguration(
            "multiple-comparison correction needs at least one comparison".to_string(),
        ));
    }
    if let Some(p) = p_values.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(Error::InvalidConfiguration(format!(
            "p-values must lie in [0, 1], got {p}"
        )));
    }

    let adjustments = if p_values.len() == 1 {
        vec![Adjustment {
            adjusted_p_value: p_values[0],
            corrected_alpha: alpha,
        }]
    } else {
        match kind {
            CorrectionKind::Bonferroni => bonferroni(p_values, alpha),
            CorrectionKind::HolmBonferroni => holm(p_values, alpha),
            CorrectionKind::Sidak => sidak(p_values, alpha),
        }
    };

    tracing::debug!(
        method = kind.as_str(),
        k = p_values.len(),
        alpha,
        "applied multiple-comparison correction"
    );
    Ok(adjustments)
}

#[allow(clippy::cast_precision_loss)]
fn bonferroni(p_values: &[f64], alpha: f64) -> Vec<Adjustment> {
    let k = p_values.len() as f64;
    p_values
        .iter()
        .map(|&p| Adjustment {
            adjusted_p_value: (p * k).clamp(0.0, 1.0),
            corrected_alpha: alpha / k,
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn sidak(p_values: &[f64], alpha: f64) -> Vec<Adjustment> {
    let k = p_values.len() as f64;
    // 1 - (1 - x)^e computed through ln_1p/exp_m1 so tiny p-values survive.
    let complement_power = |x: f64, e: f64| -(e * (-x).ln_1p()).exp_m1();
    let corrected_alpha = complement_power(alpha, 1.0 / k);
    p_values
        .iter()
        .map(|&p| Adjustment {
            adjusted_p_value: complement_power(p, k).clamp(p, 1.0),
            corrected_alpha,
        })
        .collect()
}

/// Holm step-down: sort ascending, ratchet, scatter back to input order.
fn holm(p_values: &[f64], alpha: f64) -> Vec<Adjustment> {
    let order = ascending_order(p_values);
    let ranked = ratchet(p_values, &order, alpha);
    scatter(&order, ranked)
}

/// Indices of `p_values` sorted by ascending p; ties keep input order.
fn ascending_order(p_values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..p_values.len()).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));
    order
}

/// Monotone step-down pass over p-values visited in `order`.
#[allow(clippy::cast_precision_loss)]
fn ratchet(p_values: &[f64], order: &[usize], alpha: f64) -> Vec<Adjustment> {
    let k = order.len();
    let mut running_max = 0.0_f64;
    order
        .iter()
        .enumerate()
        .map(|(rank, &idx)| {
            let remaining = (k - rank) as f64;
            running_max = running_max.max((p_values[idx] * remaining).clamp(0.0, 1.0));
            Adjustment {
                adjusted_p_value: running_max,
                corrected_alpha: alpha / remaining,
            }
        })
        .collect()
}

/// Put rank-ordered adjustments back at their input positions.
fn scatter(order: &[usize], ranked: Vec<Adjustment>) -> Vec<Adjustment> {
    let mut slots: Vec<Option<Adjustment>> = vec![None; order.len()];
    for (&idx, adjustment) in order.iter().zip(ranked) {
        slots[idx] = Some(adjustment);
    }
    slots.into_iter().flatten().collect()
}
