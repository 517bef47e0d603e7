//! Property-based tests for ab-verdict
//!
//! - Test mathematical invariants of correction and spending
//! - Test symmetry of the two-sample tests
//! - Run with ProptestConfig::with_cases(100)

use ab_verdict::analyze;
use ab_verdict::correction::correct;
use ab_verdict::experiment::{
    CorrectionKind, ExperimentConfig, MetricKind, SpendingFamily, TestIntent, Variant,
};
use proptest::prelude::*;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate 1..=8 raw p-values
fn arb_p_values() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.0f64..=1.0, 1..=8)
}

fn arb_correction() -> impl Strategy<Value = CorrectionKind> {
    prop_oneof![
        Just(CorrectionKind::Bonferroni),
        Just(CorrectionKind::HolmBonferroni),
        Just(CorrectionKind::Sidak),
    ]
}

fn arb_spending() -> impl Strategy<Value = SpendingFamily> {
    prop_oneof![
        Just(SpendingFamily::Linear),
        Just(SpendingFamily::ObrienFleming),
        Just(SpendingFamily::Pocock),
        Just(SpendingFamily::Exponential),
        Just(SpendingFamily::Power),
    ]
}

/// Generate a numeric arm (n, mean, sd)
fn arb_numeric_arm() -> impl Strategy<Value = (u64, f64, f64)> {
    (2u64..5000, -100.0f64..100.0, 0.1f64..50.0)
}

// ============================================================================
// Correction Engine
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: adjusted p-values lie in [raw p, 1]
    #[test]
    fn prop_adjusted_bounded(p_values in arb_p_values(), method in arb_correction()) {
        let adjusted = correct(&p_values, method, 0.05).unwrap();
        prop_assert_eq!(adjusted.len(), p_values.len());
        for (p, a) in p_values.iter().zip(&adjusted) {
            prop_assert!(a.adjusted_p_value >= *p);
            prop_assert!((0.0..=1.0).contains(&a.adjusted_p_value));
            prop_assert!(a.corrected_alpha > 0.0 && a.corrected_alpha <= 0.05);
        }
    }

    /// Property: Holm adjusted p-values are non-decreasing in raw p order
    #[test]
    fn prop_holm_monotone(p_values in arb_p_values()) {
        let adjusted = correct(&p_values, CorrectionKind::HolmBonferroni, 0.05).unwrap();
        let mut pairs: Vec<(f64, f64)> = p_values
            .iter()
            .zip(&adjusted)
            .map(|(p, a)| (*p, a.adjusted_p_value))
            .collect();
        pairs.sort_by(|x, y| x.0.total_cmp(&y.0));
        for w in pairs.windows(2) {
            prop_assert!(w[1].1 >= w[0].1);
        }
    }

    /// Property: k = 1 is the identity for every method
    #[test]
    fn prop_single_comparison_identity(
        p in 0.0f64..=1.0,
        alpha in 0.001f64..0.5,
        method in arb_correction(),
    ) {
        let adjusted = correct(&[p], method, alpha).unwrap();
        prop_assert_eq!(adjusted[0].adjusted_p_value, p);
        prop_assert_eq!(adjusted[0].corrected_alpha, alpha);
    }

    /// Property: Holm never adjusts above Bonferroni
    #[test]
    fn prop_holm_dominates_bonferroni(p_values in arb_p_values()) {
        let holm = correct(&p_values, CorrectionKind::HolmBonferroni, 0.05).unwrap();
        let bonf = correct(&p_values, CorrectionKind::Bonferroni, 0.05).unwrap();
        for (h, b) in holm.iter().zip(&bonf) {
            prop_assert!(h.adjusted_p_value <= b.adjusted_p_value);
        }
    }
}

// ============================================================================
// Sequential Engine
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: spending is non-decreasing in t and bounded by alpha
    #[test]
    fn prop_spending_monotone(
        family in arb_spending(),
        t1 in 0.0f64..=1.0,
        t2 in 0.0f64..=1.0,
        alpha in 0.001f64..0.2,
        lambda in 0.1f64..5.0,
    ) {
        let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let a_lo = family.cumulative_alpha(lo, alpha, lambda);
        let a_hi = family.cumulative_alpha(hi, alpha, lambda);
        prop_assert!(a_lo <= a_hi * (1.0 + 1e-12));
        prop_assert!((0.0..=alpha).contains(&a_hi));
    }

    /// Property: full information spends exactly alpha
    #[test]
    fn prop_spending_endpoint(
        family in arb_spending(),
        alpha in 0.001f64..0.2,
        lambda in 0.1f64..5.0,
    ) {
        prop_assert_eq!(family.cumulative_alpha(1.0, alpha, lambda), alpha);
    }
}

// ============================================================================
// Test Selector symmetry
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: swapping roles flips effect and statistic, keeps two-sided p
    #[test]
    fn prop_numeric_swap_symmetry(a in arb_numeric_arm(), b in arb_numeric_arm()) {
        let config = ExperimentConfig::builder("m", MetricKind::Numeric, 100)
            .intent(TestIntent::DetectDifference)
            .build();
        let forward = [
            Variant::builder("x", a.0, a.1).std_dev(a.2).control().build(),
            Variant::builder("y", b.0, b.1).std_dev(b.2).build(),
        ];
        let backward = [
            Variant::builder("x", a.0, a.1).std_dev(a.2).build(),
            Variant::builder("y", b.0, b.1).std_dev(b.2).control().build(),
        ];

        let f = analyze(&config, &forward).unwrap();
        let r = analyze(&config, &backward).unwrap();
        let (f, r) = (&f.comparisons()[0], &r.comparisons()[0]);

        prop_assert!((f.effect() + r.effect()).abs() <= 1e-9 * (1.0 + f.effect().abs()));
        prop_assert!((f.statistic() + r.statistic()).abs() <= 1e-9 * (1.0 + f.statistic().abs()));
        prop_assert!((f.p_value() - r.p_value()).abs() < 1e-9);
    }

    /// Property: conversion swap symmetry
    #[test]
    fn prop_conversion_swap_symmetry(
        n1 in 1u64..10_000,
        n2 in 1u64..10_000,
        p1 in 0.0f64..=1.0,
        p2 in 0.0f64..=1.0,
    ) {
        let config = ExperimentConfig::builder("m", MetricKind::Conversion, 100)
            .intent(TestIntent::DetectDifference)
            .build();
        let forward = [
            Variant::builder("x", n1, p1).control().build(),
            Variant::new("y", n2, p2),
        ];
        let backward = [
            Variant::new("x", n1, p1),
            Variant::builder("y", n2, p2).control().build(),
        ];

        let f = analyze(&config, &forward).unwrap();
        let r = analyze(&config, &backward).unwrap();
        let (f, r) = (&f.comparisons()[0], &r.comparisons()[0]);

        prop_assert!((f.effect() + r.effect()).abs() < 1e-12);
        prop_assert!((f.p_value() - r.p_value()).abs() < 1e-9);
    }

    /// Property: a one-sided rejection always agrees with the intent
    #[test]
    fn prop_rejection_agrees_with_intent(
        p1 in 0.01f64..0.99,
        p2 in 0.01f64..0.99,
        increase in any::<bool>(),
    ) {
        let intent = if increase { TestIntent::DetectIncrease } else { TestIntent::DetectDecrease };
        let config = ExperimentConfig::builder("m", MetricKind::Conversion, 100)
            .intent(intent)
            .alpha(0.5)
            .build();
        let variants = [
            Variant::builder("control", 500, p1).control().build(),
            Variant::new("t", 500, p2),
        ];
        let result = analyze(&config, &variants).unwrap();
        let cmp = &result.comparisons()[0];
        if cmp.rejected() {
            prop_assert!(intent.agrees_with(cmp.effect()));
        }
    }
}
