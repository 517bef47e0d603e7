//! Sequential Engine
//!
//! Group-sequential bookkeeping for one look at an experiment:
//!
//! 1. **Schedule** - weekly interim looks across `[start, end]`
//! 2. **Information fraction** - `t = elapsed_days / total_days`, in (0, 1]
//! 3. **Alpha spending** - cumulative `α(t)` from the chosen family
//! 4. **Inflation** - table lookup by boundary technique and look count,
//!    extrapolated for long Pocock designs
//!
//! The engine never sees variant data; sample-size bookkeeping is attached
//! by the caller through [`SequentialInfo`].

mod inflation;
mod schedule;
mod spending;

pub use schedule::{Schedule, LOOK_INTERVAL_DAYS, MIN_MONITORING_DAYS};

use crate::experiment::{SequentialInfo, SequentialPlan};
use crate::Result;

/// Evaluate `plan` at its as-of date for family-wise level `alpha`.
///
/// # Errors
///
/// Returns [`crate::Error::SequentialSchedule`] if the dates are inconsistent
/// or the look count is unsupported by the inflation technique.
pub fn evaluate(plan: &SequentialPlan, alpha: f64) -> Result<SequentialInfo> {
    let technique = plan.inflation_technique();
    if let Some(looks) = plan.requested_looks() {
        technique.check_looks(looks)?;
    }

    let schedule = Schedule::build(plan)?;
    let inflation_factor = technique.inflation_factor(schedule.planned_looks)?;
    let completeness = schedule.completeness();
    let alpha_spent = plan
        .spending_family()
        .cumulative_alpha(completeness, alpha, plan.lambda_value());

    tracing::debug!(
        spending = ?plan.spending_family(),
        technique = ?technique,
        looks = schedule.planned_looks,
        looks_elapsed = schedule.looks_elapsed,
        completeness,
        alpha_spent,
        inflation_factor,
        "evaluated sequential design"
    );

    Ok(SequentialInfo {
        alpha_spent,
        inflation_factor,
        completeness,
        look_dates: schedule.look_dates,
        looks_elapsed: schedule.looks_elapsed,
        planned_looks: schedule.planned_looks,
        spending: plan.spending_family(),
        technique,
        lambda: plan.lambda_value(),
        start_date: plan.start_date(),
        end_date: plan.end_date(),
        as_of_date: plan.as_of_date(),
        total_days: schedule.total_days,
        planned_sample_size: 0,
        current_sample_size: 0,
        inflated_sample_size: 0.0,
    })
}
