//! Weekly interim-look schedule over the monitoring window

use chrono::{Duration, NaiveDate};

use crate::experiment::SequentialPlan;
use crate::{Error, Result};

/// Days between interim looks.
pub const LOOK_INTERVAL_DAYS: i64 = 7;

/// Shortest monitoring window that leaves room for one interim look.
pub const MIN_MONITORING_DAYS: i64 = 14;

/// Calendar position of the current look within the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Days from start to end.
    pub total_days: i64,
    /// Days from start to the as-of date, capped at `total_days`.
    pub elapsed_days: i64,
    /// Interim looks planned before the final analysis.
    pub planned_looks: u32,
    /// Interim-look dates, ascending, all strictly before the end date.
    pub look_dates: Vec<NaiveDate>,
    /// Looks dated on or before the as-of date.
    pub looks_elapsed: u32,
}

impl Schedule {
    /// Lay out the weekly looks for `plan`.
    ///
    /// The look count is the plan's explicit request, or
    /// `floor(total_days / 7) - 1` with a floor of 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SequentialSchedule`] if the window is shorter than
    /// [`MIN_MONITORING_DAYS`], the as-of date precedes the start, or an
    /// explicit look count is zero or does not fit before the end date.
    pub fn build(plan: &SequentialPlan) -> Result<Self> {
        let (start, end, as_of) = (plan.start_date(), plan.end_date(), plan.as_of_date());
        let total_days = (end - start).num_days();

        if total_days <= 0 {
            return Err(Error::SequentialSchedule(format!(
                "end date {end} must be after start date {start}"
            )));
        }
        if total_days < MIN_MONITORING_DAYS {
            return Err(Error::SequentialSchedule(format!(
                "monitoring window of {total_days} days is shorter than the {MIN_MONITORING_DAYS}-day minimum"
            )));
        }
        if as_of < start {
            return Err(Error::SequentialSchedule(format!(
                "as-of date {as_of} precedes start date {start}"
            )));
        }

        let planned_looks = match plan.requested_looks() {
            Some(0) => {
                return Err(Error::SequentialSchedule(
                    "at least one interim look is required".to_string(),
                ))
            }
            Some(looks) => {
                if i64::from(looks) * LOOK_INTERVAL_DAYS >= total_days {
                    return Err(Error::SequentialSchedule(format!(
                        "{looks} weekly looks do not fit in a {total_days}-day window"
                    )));
                }
                looks
            }
            None => derived_looks(total_days),
        };

        let look_dates: Vec<NaiveDate> = (1..=i64::from(planned_looks))
            .map(|i| start + Duration::days(i * LOOK_INTERVAL_DAYS))
            .collect();
        let looks_elapsed = look_dates.iter().filter(|&&d| d <= as_of).count();

        Ok(Self {
            total_days,
            elapsed_days: (as_of - start).num_days().min(total_days),
            planned_looks,
            look_dates,
            looks_elapsed: u32::try_from(looks_elapsed).unwrap_or(u32::MAX),
        })
    }

    /// Information fraction `elapsed / total`, clamped to (0, 1].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn completeness(&self) -> f64 {
        (self.elapsed_days as f64 / self.total_days as f64).clamp(f64::EPSILON, 1.0)
    }
}

fn derived_looks(total_days: i64) -> u32 {
    let looks = (total_days / LOOK_INTERVAL_DAYS - 1).max(1);
    u32::try_from(looks).unwrap_or(u32::MAX)
}
