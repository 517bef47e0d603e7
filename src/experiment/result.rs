//! Analysis results - comparisons, sequential block and final verdict

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    CorrectionKind, InflationTechnique, Methodology, MetricKind, SpendingFamily, TestIntent,
    VariantSummary,
};
use crate::selector::TestKind;
use crate::stats::VarianceCheck;
use crate::Result;

/// Fixed set of conclusion codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    /// Treatment significantly above control.
    IncreaseDetected,
    /// No significant increase.
    IncreaseNotDetected,
    /// Treatment significantly below control.
    ReductionDetected,
    /// No significant reduction.
    ReductionNotDetected,
    /// Treatment significantly different from control.
    DifferenceDetected,
    /// No significant difference.
    DifferenceNotDetected,
}

impl Conclusion {
    /// Map a (direction-checked) decision to its code.
    #[must_use]
    pub const fn from_decision(intent: TestIntent, rejected: bool) -> Self {
        match (intent, rejected) {
            (TestIntent::DetectIncrease, true) => Self::IncreaseDetected,
            (TestIntent::DetectIncrease, false) => Self::IncreaseNotDetected,
            (TestIntent::DetectDecrease, true) => Self::ReductionDetected,
            (TestIntent::DetectDecrease, false) => Self::ReductionNotDetected,
            (TestIntent::DetectDifference, true) => Self::DifferenceDetected,
            (TestIntent::DetectDifference, false) => Self::DifferenceNotDetected,
        }
    }

    /// Whether the code reports a detected effect.
    #[must_use]
    pub const fn is_detected(self) -> bool {
        matches!(
            self,
            Self::IncreaseDetected | Self::ReductionDetected | Self::DifferenceDetected
        )
    }

    /// Wire code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IncreaseDetected => "increase_detected",
            Self::IncreaseNotDetected => "increase_not_detected",
            Self::ReductionDetected => "reduction_detected",
            Self::ReductionNotDetected => "reduction_not_detected",
            Self::DifferenceDetected => "difference_detected",
            Self::DifferenceNotDetected => "difference_not_detected",
        }
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one treatment-vs-control comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub(crate) comparison: String,
    pub(crate) treatment: String,
    pub(crate) control: String,
    pub(crate) test: TestKind,
    pub(crate) statistic: f64,
    pub(crate) degrees_of_freedom: Option<f64>,
    pub(crate) p_value: f64,
    pub(crate) adjusted_p_value: f64,
    pub(crate) effect: f64,
    pub(crate) corrected_alpha: f64,
    pub(crate) rejected: bool,
    pub(crate) conclusion: Conclusion,
    pub(crate) raw_rejected: bool,
    pub(crate) raw_conclusion: Conclusion,
    pub(crate) variance_check: Option<VarianceCheck>,
}

impl ComparisonResult {
    /// Label `"<treatment> vs <control>"`.
    #[must_use]
    pub fn comparison(&self) -> &str {
        &self.comparison
    }

    /// Treatment variant name.
    #[must_use]
    pub fn treatment(&self) -> &str {
        &self.treatment
    }

    /// Control variant name.
    #[must_use]
    pub fn control(&self) -> &str {
        &self.control
    }

    /// Test that was run.
    #[must_use]
    pub const fn test(&self) -> TestKind {
        self.test
    }

    /// Signed test statistic.
    #[must_use]
    pub const fn statistic(&self) -> f64 {
        self.statistic
    }

    /// Student-T degrees of freedom, if a T reference was used.
    #[must_use]
    pub const fn degrees_of_freedom(&self) -> Option<f64> {
        self.degrees_of_freedom
    }

    /// Raw p-value.
    #[must_use]
    pub const fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Multiplicity-adjusted p-value.
    #[must_use]
    pub const fn adjusted_p_value(&self) -> f64 {
        self.adjusted_p_value
    }

    /// Absolute signed difference `treatment - control`.
    #[must_use]
    pub const fn effect(&self) -> f64 {
        self.effect
    }

    /// Per-comparison threshold on the raw p-value scale.
    #[must_use]
    pub const fn corrected_alpha(&self) -> f64 {
        self.corrected_alpha
    }

    /// Corrected, direction-aware rejection of H0.
    #[must_use]
    pub const fn rejected(&self) -> bool {
        self.rejected
    }

    /// Conclusion after correction.
    #[must_use]
    pub const fn conclusion(&self) -> Conclusion {
        self.conclusion
    }

    /// Direction-aware rejection before multiplicity correction.
    #[must_use]
    pub const fn raw_rejected(&self) -> bool {
        self.raw_rejected
    }

    /// Conclusion before multiplicity correction.
    #[must_use]
    pub const fn raw_conclusion(&self) -> Conclusion {
        self.raw_conclusion
    }

    /// Variance-equality check (numeric metrics only).
    #[must_use]
    pub const fn variance_check(&self) -> Option<&VarianceCheck> {
        self.variance_check.as_ref()
    }
}

/// State of a group-sequential design at the current look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialInfo {
    pub(crate) alpha_spent: f64,
    pub(crate) inflation_factor: f64,
    pub(crate) completeness: f64,
    pub(crate) look_dates: Vec<NaiveDate>,
    pub(crate) looks_elapsed: u32,
    pub(crate) planned_looks: u32,
    pub(crate) spending: SpendingFamily,
    pub(crate) technique: InflationTechnique,
    pub(crate) lambda: f64,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) as_of_date: NaiveDate,
    pub(crate) total_days: i64,
    pub(crate) planned_sample_size: u64,
    pub(crate) current_sample_size: u64,
    pub(crate) inflated_sample_size: f64,
}

impl SequentialInfo {
    /// Attach sample-size bookkeeping from the experiment.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn with_samples(mut self, planned: u64, current: u64) -> Self {
        self.planned_sample_size = planned;
        self.current_sample_size = current;
        self.inflated_sample_size = planned as f64 * self.inflation_factor;
        self
    }

    /// Cumulative alpha available at the current look.
    #[must_use]
    pub const fn alpha_spent(&self) -> f64 {
        self.alpha_spent
    }

    /// Sample-size inflation factor.
    #[must_use]
    pub const fn inflation_factor(&self) -> f64 {
        self.inflation_factor
    }

    /// Information fraction in (0, 1].
    #[must_use]
    pub const fn completeness(&self) -> f64 {
        self.completeness
    }

    /// Scheduled interim-look dates, ascending.
    #[must_use]
    pub fn look_dates(&self) -> &[NaiveDate] {
        &self.look_dates
    }

    /// Interim looks on or before the as-of date.
    #[must_use]
    pub const fn looks_elapsed(&self) -> u32 {
        self.looks_elapsed
    }

    /// Planned interim looks.
    #[must_use]
    pub const fn planned_looks(&self) -> u32 {
        self.planned_looks
    }

    /// Alpha-spending family.
    #[must_use]
    pub const fn spending(&self) -> SpendingFamily {
        self.spending
    }

    /// Inflation technique.
    #[must_use]
    pub const fn technique(&self) -> InflationTechnique {
        self.technique
    }

    /// Lambda parameter.
    #[must_use]
    pub const fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Monitoring window start.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Monitoring window end.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Date of the current look.
    #[must_use]
    pub const fn as_of_date(&self) -> NaiveDate {
        self.as_of_date
    }

    /// Length of the monitoring window in days.
    #[must_use]
    pub const fn total_days(&self) -> i64 {
        self.total_days
    }

    /// Planned sample size before inflation.
    #[must_use]
    pub const fn planned_sample_size(&self) -> u64 {
        self.planned_sample_size
    }

    /// Units observed so far across all variants.
    #[must_use]
    pub const fn current_sample_size(&self) -> u64 {
        self.current_sample_size
    }

    /// Planned sample size times the inflation factor.
    #[must_use]
    pub const fn inflated_sample_size(&self) -> f64 {
        self.inflated_sample_size
    }
}

/// Correction metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionSummary {
    /// Method applied.
    pub method: CorrectionKind,
    /// Number of comparisons (k).
    pub comparisons: usize,
}

/// Complete verdict for one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub(crate) metric_name: String,
    pub(crate) metric_kind: MetricKind,
    pub(crate) intent: TestIntent,
    pub(crate) methodology: Methodology,
    pub(crate) effective_alpha: f64,
    pub(crate) comparisons: Vec<ComparisonResult>,
    pub(crate) sequential: Option<SequentialInfo>,
    pub(crate) correction: CorrectionSummary,
    pub(crate) variants: Vec<VariantSummary>,
    pub(crate) conclusion: Conclusion,
}

impl AnalysisResult {
    /// Metric label.
    #[must_use]
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// Metric kind.
    #[must_use]
    pub const fn metric_kind(&self) -> MetricKind {
        self.metric_kind
    }

    /// Test intent.
    #[must_use]
    pub const fn intent(&self) -> TestIntent {
        self.intent
    }

    /// Methodology.
    #[must_use]
    pub const fn methodology(&self) -> Methodology {
        self.methodology
    }

    /// Family-wise alpha actually used: global alpha, or alpha spent so far.
    #[must_use]
    pub const fn effective_alpha(&self) -> f64 {
        self.effective_alpha
    }

    /// One result per treatment, in input order.
    #[must_use]
    pub fn comparisons(&self) -> &[ComparisonResult] {
        &self.comparisons
    }

    /// Sequential block (sequential methodology only).
    #[must_use]
    pub const fn sequential(&self) -> Option<&SequentialInfo> {
        self.sequential.as_ref()
    }

    /// Correction metadata.
    #[must_use]
    pub const fn correction(&self) -> CorrectionSummary {
        self.correction
    }

    /// Per-variant summaries, in input order.
    #[must_use]
    pub fn variants(&self) -> &[VariantSummary] {
        &self.variants
    }

    /// Experiment-level conclusion.
    #[must_use]
    pub const fn conclusion(&self) -> Conclusion {
        self.conclusion
    }

    /// Encode as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if a value cannot be encoded.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if a value cannot be encoded.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
