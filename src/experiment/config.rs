//! Experiment Config - immutable analysis settings passed into every call

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Kind of metric being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Continuous metric summarized by mean and standard deviation.
    #[serde(alias = "mean")]
    Numeric,
    /// Binary outcome summarized by a rate in [0, 1].
    #[serde(alias = "proportion")]
    Conversion,
}

/// What the experiment is trying to show about treatment vs control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestIntent {
    /// H1: treatment > control (one-sided, upper tail).
    DetectIncrease,
    /// H1: treatment < control (one-sided, lower tail).
    DetectDecrease,
    /// H1: treatment != control (two-sided).
    DetectDifference,
}

impl TestIntent {
    /// Whether the intent maps to a one-tailed test.
    #[must_use]
    pub const fn is_one_sided(self) -> bool {
        !matches!(self, Self::DetectDifference)
    }

    /// Whether an observed signed effect agrees with the declared direction.
    ///
    /// Always true for `DetectDifference`.
    #[must_use]
    pub fn agrees_with(self, effect: f64) -> bool {
        match self {
            Self::DetectIncrease => effect > 0.0,
            Self::DetectDecrease => effect < 0.0,
            Self::DetectDifference => true,
        }
    }
}

/// Analysis regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Methodology {
    /// Single fixed-sample frequentist pass.
    Fixed,
    /// Group-sequential monitoring under an alpha-spending function.
    Sequential,
}

/// Multiple-comparison adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    /// Single-step `p * k`.
    Bonferroni,
    /// Holm step-down.
    #[serde(alias = "holm")]
    HolmBonferroni,
    /// Single-step `1 - (1 - p)^k`.
    Sidak,
}

impl CorrectionKind {
    /// Stable method name for reporting.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bonferroni => "bonferroni",
            Self::HolmBonferroni => "holm_bonferroni",
            Self::Sidak => "sidak",
        }
    }
}

/// Alpha-spending function family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingFamily {
    /// `α·t`
    Linear,
    /// Lan-DeMets O'Brien-Fleming type.
    #[serde(alias = "o'brien-fleming", alias = "obrien-fleming")]
    ObrienFleming,
    /// Lan-DeMets Pocock type.
    Pocock,
    /// Normalized exponential, parameterized by lambda.
    Exponential,
    /// `α·t^λ`
    Power,
}

/// Boundary technique used to look up the sample-size inflation factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InflationTechnique {
    /// Constant boundaries; larger inflation.
    Pocock,
    /// Conservative early boundaries; inflation close to 1.
    #[serde(alias = "o'brien-fleming", alias = "obrien-fleming")]
    ObrienFleming,
}

/// Sequential monitoring plan.
///
/// Only consulted when the methodology is [`Methodology::Sequential`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialPlan {
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default)]
    as_of: Option<NaiveDate>,
    spending: SpendingFamily,
    technique: InflationTechnique,
    lambda: f64,
    #[serde(default)]
    planned_looks: Option<u32>,
}

impl SequentialPlan {
    /// Create a plan over `[start_date, end_date]` with linear spending,
    /// Pocock inflation and lambda 1.
    #[must_use]
    pub const fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            as_of: None,
            spending: SpendingFamily::Linear,
            technique: InflationTechnique::Pocock,
            lambda: 1.0,
            planned_looks: None,
        }
    }

    /// Set the alpha-spending family.
    #[must_use]
    pub const fn spending(mut self, spending: SpendingFamily) -> Self {
        self.spending = spending;
        self
    }

    /// Set the inflation-factor technique.
    #[must_use]
    pub const fn technique(mut self, technique: InflationTechnique) -> Self {
        self.technique = technique;
        self
    }

    /// Set lambda for the power and exponential families.
    #[must_use]
    pub fn lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Analyze as of an in-flight date instead of the end date.
    #[must_use]
    pub const fn as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Request an explicit interim look count instead of the weekly default.
    #[must_use]
    pub const fn planned_looks(mut self, looks: u32) -> Self {
        self.planned_looks = Some(looks);
        self
    }

    /// First day of the monitoring window.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day of the monitoring window.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Date of the current look; the end date for a finalized analysis.
    #[must_use]
    pub fn as_of_date(&self) -> NaiveDate {
        self.as_of.unwrap_or(self.end_date)
    }

    /// Alpha-spending family.
    #[must_use]
    pub const fn spending_family(&self) -> SpendingFamily {
        self.spending
    }

    /// Inflation-factor technique.
    #[must_use]
    pub const fn inflation_technique(&self) -> InflationTechnique {
        self.technique
    }

    /// Lambda parameter.
    #[must_use]
    pub const fn lambda_value(&self) -> f64 {
        self.lambda
    }

    /// Explicitly requested interim look count, if any.
    #[must_use]
    pub const fn requested_looks(&self) -> Option<u32> {
        self.planned_looks
    }
}

/// Experiment configuration.
///
/// Built once per analysis and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    metric_name: String,
    metric_kind: MetricKind,
    planned_sample_size: u64,
    intent: TestIntent,
    alpha: f64,
    methodology: Methodology,
    correction: CorrectionKind,
    #[serde(default)]
    sequential: Option<SequentialPlan>,
}

impl ExperimentConfig {
    /// Create a builder with the required fields.
    ///
    /// # Arguments
    ///
    /// * `metric_name` - Label of the target metric (reporting only)
    /// * `metric_kind` - Numeric or conversion
    /// * `planned_sample_size` - Planned total sample size, before inflation
    #[must_use]
    pub fn builder(
        metric_name: impl Into<String>,
        metric_kind: MetricKind,
        planned_sample_size: u64,
    ) -> ExperimentConfigBuilder {
        ExperimentConfigBuilder::new(metric_name, metric_kind, planned_sample_size)
    }

    /// Get the metric name.
    #[must_use]
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// Get the metric kind.
    #[must_use]
    pub const fn metric_kind(&self) -> MetricKind {
        self.metric_kind
    }

    /// Get the planned sample size.
    #[must_use]
    pub const fn planned_sample_size(&self) -> u64 {
        self.planned_sample_size
    }

    /// Get the test intent.
    #[must_use]
    pub const fn intent(&self) -> TestIntent {
        self.intent
    }

    /// Get the global significance level.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Get the methodology.
    #[must_use]
    pub const fn methodology(&self) -> Methodology {
        self.methodology
    }

    /// Get the multiple-comparison correction.
    #[must_use]
    pub const fn correction(&self) -> CorrectionKind {
        self.correction
    }

    /// Get the sequential plan, if configured.
    #[must_use]
    pub const fn sequential(&self) -> Option<&SequentialPlan> {
        self.sequential.as_ref()
    }

    /// Check the configuration for internal consistency.
    ///
    /// Date-range problems are left to the sequential engine, which reports
    /// them as [`Error::SequentialSchedule`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if alpha is outside (0, 1),
    /// the planned sample size is zero, or the methodology is sequential
    /// without a usable plan.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::InvalidConfiguration(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.planned_sample_size == 0 {
            return Err(Error::InvalidConfiguration(
                "planned sample size must be positive".to_string(),
            ));
        }

        match (self.methodology, &self.sequential) {
            (Methodology::Sequential, None) => Err(Error::InvalidConfiguration(
                "sequential methodology requires start date, end date and spending settings"
                    .to_string(),
            )),
            (Methodology::Sequential, Some(plan)) => {
                if !(plan.lambda.is_finite() && plan.lambda > 0.0) {
                    return Err(Error::InvalidConfiguration(format!(
                        "lambda must be a positive number, got {}",
                        plan.lambda
                    )));
                }
                Ok(())
            }
            (Methodology::Fixed, Some(_)) => {
                tracing::warn!(
                    metric = %self.metric_name,
                    "sequential plan supplied under fixed methodology; ignoring it"
                );
                Ok(())
            }
            (Methodology::Fixed, None) => Ok(()),
        }
    }
}

/// Builder for `ExperimentConfig`.
#[derive(Debug)]
pub struct ExperimentConfigBuilder {
    metric_name: String,
    metric_kind: MetricKind,
    planned_sample_size: u64,
    intent: TestIntent,
    alpha: f64,
    methodology: Methodology,
    correction: CorrectionKind,
    sequential: Option<SequentialPlan>,
}

impl ExperimentConfigBuilder {
    /// Create a new builder with required fields and defaults:
    /// `detect_increase`, alpha 0.05, fixed methodology, Bonferroni.
    #[must_use]
    pub fn new(
        metric_name: impl Into<String>,
        metric_kind: MetricKind,
        planned_sample_size: u64,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            metric_kind,
            planned_sample_size,
            intent: TestIntent::DetectIncrease,
            alpha: 0.05,
            methodology: Methodology::Fixed,
            correction: CorrectionKind::Bonferroni,
            sequential: None,
        }
    }

    /// Set the test intent.
    #[must_use]
    pub const fn intent(mut self, intent: TestIntent) -> Self {
        self.intent = intent;
        self
    }

    /// Set the global significance level.
    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the multiple-comparison correction.
    #[must_use]
    pub const fn correction(mut self, correction: CorrectionKind) -> Self {
        self.correction = correction;
        self
    }

    /// Set the methodology without touching the sequential plan.
    #[must_use]
    pub const fn methodology(mut self, methodology: Methodology) -> Self {
        self.methodology = methodology;
        self
    }

    /// Attach a sequential plan and switch to sequential methodology.
    #[must_use]
    pub fn sequential(mut self, plan: SequentialPlan) -> Self {
        self.methodology = Methodology::Sequential;
        self.sequential = Some(plan);
        self
    }

    /// Build the `ExperimentConfig`.
    #[must_use]
    pub fn build(self) -> ExperimentConfig {
        ExperimentConfig {
            metric_name: self.metric_name,
            metric_kind: self.metric_kind,
            planned_sample_size: self.planned_sample_size,
            intent: self.intent,
            alpha: self.alpha,
            methodology: self.methodology,
            correction: self.correction,
            sequential: self.sequential,
        }
    }
}
