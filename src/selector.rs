//! Test Selector
//!
//! Chooses and runs the two-sample test for one (treatment, control) pair:
//!
//! | Metric      | Reference                                     |
//! |-------------|-----------------------------------------------|
//! | conversion  | two-proportion Z, pooled rate                 |
//! | numeric     | Z when effective df >= 30, Student-T otherwise |
//!
//! For numeric metrics an F test on the two variances decides between the
//! pooled standard error (df = n1 + n2 - 2) and the Welch standard error
//! (Welch-Satterthwaite df).
//!
//! The effect is always the absolute signed difference `treatment - control`
//! on the metric's own scale.

use serde::{Deserialize, Serialize};

use crate::experiment::{MetricKind, TestIntent, Variant};
use crate::stats::{normal_cdf, normal_sf, Reference, Tail, VarianceCheck};
use crate::{Error, Result};

/// Effective degrees of freedom from which the Z reference replaces Student-T.
pub const LARGE_SAMPLE_DF: f64 = 30.0;

/// Test actually run for a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Two-sample mean comparison against the standard normal.
    ZTest,
    /// Two-sample mean comparison against Student-T.
    TTest,
    /// Two-proportion Z test with pooled rate.
    TwoProportionZTest,
}

/// Raw result of one two-sample test.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    /// Test that was run.
    pub test: TestKind,
    /// Signed test statistic.
    pub statistic: f64,
    /// Degrees of freedom of the Student-T reference, if used.
    pub degrees_of_freedom: Option<f64>,
    /// Raw p-value oriented by the test intent.
    pub p_value: f64,
    /// `treatment - control` on the metric's natural scale.
    pub effect: f64,
    /// Variance-equality check (numeric metrics only).
    pub variance_check: Option<VarianceCheck>,
}

/// Run the appropriate test of `treatment` against `control`.
///
/// `alpha` is only used by the variance-equality check.
///
/// # Errors
///
/// Returns [`Error::InvalidVariant`] if either variant violates the
/// constraints of `kind`.
pub fn run_test(
    treatment: &Variant,
    control: &Variant,
    kind: MetricKind,
    intent: TestIntent,
    alpha: f64,
) -> Result<TestOutcome> {
    treatment.validate(kind)?;
    control.validate(kind)?;

    let outcome = match kind {
        MetricKind::Conversion => two_proportion_z(treatment, control, intent),
        MetricKind::Numeric => two_sample_means(treatment, control, intent, alpha)?,
    };

    tracing::debug!(
        treatment = treatment.name(),
        control = control.name(),
        test = ?outcome.test,
        statistic = outcome.statistic,
        p_value = outcome.p_value,
        "ran two-sample test"
    );
    Ok(outcome)
}

#[allow(clippy::cast_precision_loss)]
fn two_proportion_z(treatment: &Variant, control: &Variant, intent: TestIntent) -> TestOutcome {
    let (n1, p1) = (control.sample_size() as f64, control.value());
    let (n2, p2) = (treatment.sample_size() as f64, treatment.value());

    let pooled = (p1 * n1 + p2 * n2) / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    let effect = p2 - p1;

    let (statistic, p_value) = if se > 0.0 {
        let z = effect / se;
        (z, Tail::from(intent).p_value(normal_cdf(z), normal_sf(z)))
    } else {
        (0.0, 1.0)
    };

    TestOutcome {
        test: TestKind::TwoProportionZTest,
        statistic,
        degrees_of_freedom: None,
        p_value,
        effect,
        variance_check: None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn two_sample_means(
    treatment: &Variant,
    control: &Variant,
    intent: TestIntent,
    alpha: f64,
) -> Result<TestOutcome> {
    let missing_sd = |v: &Variant| {
        Error::InvalidVariant(format!("variant '{}': missing standard deviation", v.name()))
    };
    let sd1 = control.std_dev().ok_or_else(|| missing_sd(control))?;
    let sd2 = treatment.std_dev().ok_or_else(|| missing_sd(treatment))?;
    let (n1, n2) = (control.sample_size(), treatment.sample_size());

    let check = VarianceCheck::run(n1, sd1, n2, sd2, alpha)?;
    let (se, df) = standard_error(n1 as f64, sd1, n2 as f64, sd2, check.equal_variances);
    let effect = treatment.value() - control.value();

    let (test, reference) = if df >= LARGE_SAMPLE_DF {
        (TestKind::ZTest, Reference::Normal)
    } else {
        (TestKind::TTest, Reference::StudentT(df))
    };

    let (statistic, p_value) = if se > 0.0 {
        let stat = effect / se;
        (stat, reference.p_value(stat, Tail::from(intent))?)
    } else {
        (0.0, 1.0)
    };

    Ok(TestOutcome {
        test,
        statistic,
        degrees_of_freedom: match reference {
            Reference::StudentT(df) => Some(df),
            Reference::Normal => None,
        },
        p_value,
        effect,
        variance_check: Some(check),
    })
}

/// Standard error of the mean difference and its effective df.
fn standard_error(n1: f64, sd1: f64, n2: f64, sd2: f64, pooled: bool) -> (f64, f64) {
    let (v1, v2) = (sd1 * sd1, sd2 * sd2);
    if pooled {
        let df = n1 + n2 - 2.0;
        let sp2 = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
        ((sp2 * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
    } else {
        let (a, b) = (v1 / n1, v2 / n2);
        let df = (a + b).powi(2) / (a.powi(2) / (n1 - 1.0) + b.powi(2) / (n2 - 1.0));
        ((a + b).sqrt(), df)
    }
}
