//! Decision Aggregator
//!
//! Orchestrates one analysis:
//!
//! ```text
//! config + variants ─> validate ─> [Sequential Engine] ─> family alpha
//!                                                           │
//! Test Selector (per treatment) ─> raw p-values ─> Correction Engine
//!                                                           │
//!                                    direction-aware decisions + verdict
//! ```
//!
//! A comparison is rejected iff its adjusted p-value is below the family
//! alpha (the global alpha, or the alpha spent so far under sequential
//! monitoring) and its effect agrees with a one-sided intent.

use std::cmp::Reverse;

use crate::correction::{self, Adjustment};
use crate::experiment::{
    AnalysisResult, ComparisonResult, Conclusion, CorrectionSummary, ExperimentConfig,
    Methodology, SequentialInfo, TestIntent, Variant, VariantSummary,
};
use crate::selector::{self, TestOutcome};
use crate::sequential;
use crate::{Error, Result};

/// Analyze one experiment.
///
/// Pure function of its arguments: validates everything up front, then
/// runs the test selector per treatment, the sequential engine (if
/// configured) and the correction engine once each.
///
/// # Errors
///
/// - [`Error::InvalidConfiguration`] for an inconsistent configuration
/// - [`Error::InvalidVariant`] for bad variant statistics, fewer than two
///   variants, or not exactly one control
/// - [`Error::SequentialSchedule`] for an unusable monitoring window
///
/// # Examples
///
/// ```rust
/// use ab_verdict::experiment::{
///     Conclusion, CorrectionKind, ExperimentConfig, MetricKind, TestIntent, Variant,
/// };
///
/// let config = ExperimentConfig::builder("latency_ms", MetricKind::Numeric, 10_000)
///     .intent(TestIntent::DetectDecrease)
///     .correction(CorrectionKind::HolmBonferroni)
///     .build();
/// let variants = [
///     Variant::builder("control", 5000, 220.0).std_dev(45.0).control().build(),
///     Variant::builder("cache", 5000, 210.0).std_dev(42.0).build(),
/// ];
///
/// let result = ab_verdict::analyze(&config, &variants)?;
/// assert_eq!(result.conclusion(), Conclusion::ReductionDetected);
/// # Ok::<(), ab_verdict::Error>(())
/// ```
pub fn analyze(config: &ExperimentConfig, variants: &[Variant]) -> Result<AnalysisResult> {
    config.validate()?;
    let (control, treatments) = split_control(variants)?;
    for variant in variants {
        variant.validate(config.metric_kind())?;
    }

    // validate() guarantees a plan under sequential methodology
    let sequential = match config.methodology() {
        Methodology::Sequential => config
            .sequential()
            .map(|plan| {
                sequential::evaluate(plan, config.alpha()).map(|info| {
                    info.with_samples(config.planned_sample_size(), total_sample_size(variants))
                })
            })
            .transpose()?,
        Methodology::Fixed => None,
    };
    let family_alpha = sequential
        .as_ref()
        .map_or(config.alpha(), SequentialInfo::alpha_spent);

    let outcomes = treatments
        .iter()
        .map(|treatment| {
            selector::run_test(
                treatment,
                control,
                config.metric_kind(),
                config.intent(),
                config.alpha(),
            )
        })
        .collect::<Result<Vec<TestOutcome>>>()?;

    let p_values: Vec<f64> = outcomes.iter().map(|o| o.p_value).collect();
    let adjustments = correction::correct(&p_values, config.correction(), family_alpha)?;

    let comparisons: Vec<ComparisonResult> = treatments
        .iter()
        .zip(outcomes)
        .zip(adjustments)
        .map(|((treatment, outcome), adjustment)| {
            decide(
                treatment,
                control,
                outcome,
                adjustment,
                config.intent(),
                family_alpha,
            )
        })
        .collect();

    let conclusion = overall_conclusion(config.intent(), &comparisons);
    tracing::info!(
        metric = config.metric_name(),
        methodology = ?config.methodology(),
        k = comparisons.len(),
        effective_alpha = family_alpha,
        %conclusion,
        "analysis complete"
    );

    Ok(AnalysisResult {
        metric_name: config.metric_name().to_string(),
        metric_kind: config.metric_kind(),
        intent: config.intent(),
        methodology: config.methodology(),
        effective_alpha: family_alpha,
        correction: CorrectionSummary {
            method: config.correction(),
            comparisons: comparisons.len(),
        },
        comparisons,
        sequential,
        variants: variants
            .iter()
            .map(|v| VariantSummary::new(v, config.metric_kind()))
            .collect(),
        conclusion,
    })
}

/// Exactly one control among at least two variants; treatments keep input order.
fn split_control(variants: &[Variant]) -> Result<(&Variant, Vec<&Variant>)> {
    if variants.len() < 2 {
        return Err(Error::InvalidVariant(format!(
            "at least 2 variants are required, got {}",
            variants.len()
        )));
    }

    let (controls, treatments): (Vec<&Variant>, Vec<&Variant>) =
        variants.iter().partition(|v| v.is_control());
    match controls.as_slice() {
        [control] => Ok((control, treatments)),
        _ => Err(Error::InvalidVariant(format!(
            "exactly one control variant is required, got {}",
            controls.len()
        ))),
    }
}

fn total_sample_size(variants: &[Variant]) -> u64 {
    variants.iter().map(Variant::sample_size).sum()
}

/// Direction-aware rejection: significant and, for one-sided intents,
/// pointing the declared way.
fn directional_rejection(significant: bool, intent: TestIntent, effect: f64) -> bool {
    significant && intent.agrees_with(effect)
}

fn decide(
    treatment: &Variant,
    control: &Variant,
    outcome: TestOutcome,
    adjustment: Adjustment,
    intent: TestIntent,
    family_alpha: f64,
) -> ComparisonResult {
    let significant = adjustment.adjusted_p_value < family_alpha;
    let rejected = directional_rejection(significant, intent, outcome.effect);
    if significant && !rejected {
        tracing::warn!(
            treatment = treatment.name(),
            effect = outcome.effect,
            ?intent,
            "significant effect opposes the test intent; reporting as not rejected"
        );
    }
    let raw_rejected =
        directional_rejection(outcome.p_value < family_alpha, intent, outcome.effect);

    ComparisonResult {
        comparison: format!("{} vs {}", treatment.name(), control.name()),
        treatment: treatment.name().to_string(),
        control: control.name().to_string(),
        test: outcome.test,
        statistic: outcome.statistic,
        degrees_of_freedom: outcome.degrees_of_freedom,
        p_value: outcome.p_value,
        adjusted_p_value: adjustment.adjusted_p_value,
        effect: outcome.effect,
        corrected_alpha: adjustment.corrected_alpha,
        rejected,
        conclusion: Conclusion::from_decision(intent, rejected),
        raw_rejected,
        raw_conclusion: Conclusion::from_decision(intent, raw_rejected),
        variance_check: outcome.variance_check,
    }
}

/// Most eventful per-comparison conclusion; the first one wins ties.
fn overall_conclusion(intent: TestIntent, comparisons: &[ComparisonResult]) -> Conclusion {
    comparisons
        .iter()
        .map(ComparisonResult::conclusion)
        .min_by_key(|c| Reverse(c.is_detected()))
        .unwrap_or_else(|| Conclusion::from_decision(intent, false))
}
