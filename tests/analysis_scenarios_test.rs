//! End-to-end analysis scenarios
//!
//! Each test drives the public `analyze` entry point with literal
//! summary statistics and checks the verdict a reviewer would expect.

use ab_verdict::correction;
use ab_verdict::experiment::{
    Conclusion, CorrectionKind, ExperimentConfig, MetricKind, TestIntent, Variant,
};
use ab_verdict::selector::TestKind;
use ab_verdict::analyze;

fn numeric(name: &str, n: u64, mean: f64, sd: f64) -> Variant {
    Variant::builder(name, n, mean).std_dev(sd).build()
}

fn numeric_control(n: u64, mean: f64, sd: f64) -> Variant {
    Variant::builder("control", n, mean)
        .std_dev(sd)
        .control()
        .build()
}

// =============================================================================
// Single comparison (k = 1)
// =============================================================================

#[test]
fn test_latency_reduction_detected() {
    let config = ExperimentConfig::builder("latency_ms", MetricKind::Numeric, 10_000)
        .intent(TestIntent::DetectDecrease)
        .alpha(0.05)
        .correction(CorrectionKind::HolmBonferroni)
        .build();
    let variants = [
        numeric_control(5000, 220.0, 45.0),
        numeric("cache", 5000, 210.0, 42.0),
    ];

    let result = analyze(&config, &variants).unwrap();

    assert_eq!(result.comparisons().len(), 1);
    let cmp = &result.comparisons()[0];
    assert_eq!(cmp.comparison(), "cache vs control");
    assert_eq!(cmp.test(), TestKind::ZTest);
    assert!(cmp.p_value() < 0.001);
    assert!((cmp.adjusted_p_value() - cmp.p_value()).abs() < f64::EPSILON);
    assert!((cmp.corrected_alpha() - 0.05).abs() < f64::EPSILON);
    assert!((cmp.effect() + 10.0).abs() < 1e-12);
    assert!(cmp.rejected());
    assert_eq!(cmp.conclusion(), Conclusion::ReductionDetected);
    assert_eq!(result.conclusion(), Conclusion::ReductionDetected);
    assert_eq!(result.correction().method, CorrectionKind::HolmBonferroni);
    assert_eq!(result.correction().comparisons, 1);
}

#[test]
fn test_single_comparison_identity_for_every_method() {
    let variants = [
        Variant::builder("control", 4000, 0.10).control().build(),
        Variant::new("treatment", 4000, 0.112),
    ];
    for method in [
        CorrectionKind::Bonferroni,
        CorrectionKind::HolmBonferroni,
        CorrectionKind::Sidak,
    ] {
        let config = ExperimentConfig::builder("ctr", MetricKind::Conversion, 8000)
            .correction(method)
            .build();
        let result = analyze(&config, &variants).unwrap();
        let cmp = &result.comparisons()[0];
        assert!((cmp.adjusted_p_value() - cmp.p_value()).abs() < f64::EPSILON);
        assert!((cmp.corrected_alpha() - 0.05).abs() < f64::EPSILON);
        assert_eq!(cmp.rejected(), cmp.raw_rejected());
    }
}

#[test]
fn test_null_effect_not_detected() {
    let config = ExperimentConfig::builder("ctr", MetricKind::Conversion, 2000)
        .intent(TestIntent::DetectDifference)
        .build();
    let variants = [
        Variant::builder("control", 1000, 0.2).control().build(),
        Variant::new("same", 1000, 0.2),
    ];
    let result = analyze(&config, &variants).unwrap();
    let cmp = &result.comparisons()[0];
    assert!(cmp.statistic().abs() < f64::EPSILON);
    assert!((cmp.p_value() - 1.0).abs() < 1e-12);
    assert_eq!(result.conclusion(), Conclusion::DifferenceNotDetected);
}

#[test]
fn test_degenerate_rates_give_unit_p_value() {
    let config = ExperimentConfig::builder("ctr", MetricKind::Conversion, 200).build();
    let variants = [
        Variant::builder("control", 100, 0.0).control().build(),
        Variant::new("zero", 100, 0.0),
    ];
    let cmp = analyze(&config, &variants).unwrap().comparisons()[0].clone();
    assert!(cmp.statistic().abs() < f64::EPSILON);
    assert!((cmp.p_value() - 1.0).abs() < f64::EPSILON);
    assert!(!cmp.rejected());
}

#[test]
fn test_conversion_std_dev_has_no_effect() {
    let config = ExperimentConfig::builder("ctr", MetricKind::Conversion, 4000).build();
    let plain = [
        Variant::builder("control", 2000, 0.10).control().build(),
        Variant::new("t", 2000, 0.12),
    ];
    let with_sd = [
        Variant::builder("control", 2000, 0.10).std_dev(0.5).control().build(),
        Variant::builder("t", 2000, 0.12).std_dev(0.5).build(),
    ];
    let a = analyze(&config, &plain).unwrap().comparisons()[0].clone();
    let b = analyze(&config, &with_sd).unwrap().comparisons()[0].clone();
    assert_eq!(a.test(), b.test());
    assert!((a.statistic() - b.statistic()).abs() < f64::EPSILON);
    assert!((a.p_value() - b.p_value()).abs() < f64::EPSILON);
    assert_eq!(a.rejected(), b.rejected());
}

// =============================================================================
// Multiple comparisons
// =============================================================================

#[test]
fn test_bonferroni_reference_values() {
    let adjusted = correction::correct(&[0.01, 0.04], CorrectionKind::Bonferroni, 0.05).unwrap();
    assert!((adjusted[0].adjusted_p_value - 0.02).abs() < 1e-15);
    assert!((adjusted[1].adjusted_p_value - 0.08).abs() < 1e-15);
    for a in &adjusted {
        assert!((a.corrected_alpha - 0.025).abs() < 1e-15);
    }
    assert!(adjusted[0].adjusted_p_value < 0.05);
    assert!(adjusted[1].adjusted_p_value >= 0.05);
}

#[test]
fn test_three_variants_bonferroni() {
    let config = ExperimentConfig::builder("checkout_rate", MetricKind::Conversion, 15_000)
        .intent(TestIntent::DetectIncrease)
        .correction(CorrectionKind::Bonferroni)
        .build();
    let variants = [
        Variant::builder("control", 5000, 0.100).control().build(),
        Variant::new("strong", 5000, 0.115),
        Variant::new("weak", 5000, 0.109),
    ];

    let result = analyze(&config, &variants).unwrap();
    let [strong, weak] = result.comparisons() else {
        panic!("expected two comparisons");
    };

    for cmp in [strong, weak] {
        let expected = (cmp.p_value() * 2.0).min(1.0);
        assert!((cmp.adjusted_p_value() - expected).abs() < 1e-15);
        assert!((cmp.corrected_alpha() - 0.025).abs() < 1e-15);
        assert_eq!(cmp.rejected(), cmp.p_value() < 0.025);
    }

    assert!(strong.rejected());
    assert_eq!(strong.conclusion(), Conclusion::IncreaseDetected);
    assert!(!weak.rejected());
    assert_eq!(weak.conclusion(), Conclusion::IncreaseNotDetected);
    assert_eq!(result.conclusion(), Conclusion::IncreaseDetected);
}

#[test]
fn test_correction_can_overturn_raw_rejection() {
    // raw p ~ 0.03 for each arm: significant alone, not after Bonferroni with k = 3
    let config = ExperimentConfig::builder("ctr", MetricKind::Conversion, 40_000)
        .intent(TestIntent::DetectIncrease)
        .build();
    let variants = [
        Variant::builder("control", 10_000, 0.100).control().build(),
        Variant::new("a", 10_000, 0.1078),
        Variant::new("b", 10_000, 0.1078),
        Variant::new("c", 10_000, 0.1078),
    ];
    let result = analyze(&config, &variants).unwrap();
    for cmp in result.comparisons() {
        assert!(cmp.p_value() > 0.05 / 3.0 && cmp.p_value() < 0.05);
        assert!(cmp.raw_rejected());
        assert_eq!(cmp.raw_conclusion(), Conclusion::IncreaseDetected);
        assert!(!cmp.rejected());
        assert_eq!(cmp.conclusion(), Conclusion::IncreaseNotDetected);
    }
}

#[test]
fn test_holm_rejects_at_least_as_much_as_bonferroni() {
    let variants = [
        Variant::builder("control", 6000, 0.100).control().build(),
        Variant::new("a", 6000, 0.113),
        Variant::new("b", 6000, 0.111),
    ];
    let run = |method| {
        let config = ExperimentConfig::builder("ctr", MetricKind::Conversion, 18_000)
            .correction(method)
            .build();
        analyze(&config, &variants).unwrap()
    };
    let bonferroni = run(CorrectionKind::Bonferroni);
    let holm = run(CorrectionKind::HolmBonferroni);

    for (b, h) in bonferroni.comparisons().iter().zip(holm.comparisons()) {
        assert!(h.adjusted_p_value() <= b.adjusted_p_value() + 1e-15);
        assert!(h.rejected() || !b.rejected());
    }
}

// =============================================================================
// Symmetry and reporting
// =============================================================================

#[test]
fn test_swapping_roles_flips_sign_only() {
    let config = ExperimentConfig::builder("revenue", MetricKind::Numeric, 400)
        .intent(TestIntent::DetectDifference)
        .build();
    let forward = [numeric_control(200, 31.0, 9.0), numeric("b", 180, 33.5, 11.0)];
    let backward = [
        numeric("control", 200, 31.0, 9.0),
        Variant::builder("b", 180, 33.5).std_dev(11.0).control().build(),
    ];

    let f = analyze(&config, &forward).unwrap().comparisons()[0].clone();
    let b = analyze(&config, &backward).unwrap().comparisons()[0].clone();

    assert!((f.effect() + b.effect()).abs() < 1e-12);
    assert!((f.statistic() + b.statistic()).abs() < 1e-12);
    assert!((f.p_value() - b.p_value()).abs() < 1e-12);
    assert_eq!(f.test(), b.test());
}

#[test]
fn test_small_samples_use_student_t_with_variance_check() {
    let config = ExperimentConfig::builder("session_len", MetricKind::Numeric, 24)
        .intent(TestIntent::DetectIncrease)
        .build();
    let variants = [numeric_control(12, 5.0, 1.0), numeric("b", 12, 6.2, 1.1)];
    let result = analyze(&config, &variants).unwrap();
    let cmp = &result.comparisons()[0];

    assert_eq!(cmp.test(), TestKind::TTest);
    let check = cmp.variance_check().unwrap();
    assert!(check.equal_variances);
    assert!((cmp.degrees_of_freedom().unwrap() - 22.0).abs() < 1e-12);
}

#[test]
fn test_variant_summaries_follow_input_order() {
    let config = ExperimentConfig::builder("ctr", MetricKind::Conversion, 300).build();
    let variants = [
        Variant::new("b", 100, 0.3),
        Variant::builder("control", 100, 0.2).control().build(),
        Variant::new("c", 5, 0.4),
    ];
    let result = analyze(&config, &variants).unwrap();
    let names: Vec<&str> = result.variants().iter().map(|v| v.name()).collect();
    assert_eq!(names, vec!["b", "control", "c"]);
    assert!(result.variants()[1].is_control());
    assert!(result.variants()[0].approximately_normal());
    assert!(!result.variants()[2].approximately_normal());
}

#[test]
fn test_result_serializes_with_stable_field_names() {
    let config = ExperimentConfig::builder("ctr", MetricKind::Conversion, 2000)
        .correction(CorrectionKind::Sidak)
        .build();
    let variants = [
        Variant::builder("control", 1000, 0.10).control().build(),
        Variant::new("blue", 1000, 0.13),
    ];
    let json = analyze(&config, &variants).unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["metric_name"], "ctr");
    assert_eq!(value["methodology"], "fixed");
    assert_eq!(value["correction"]["method"], "sidak");
    assert_eq!(value["correction"]["comparisons"], 1);
    assert_eq!(value["comparisons"][0]["test"], "two_proportion_z_test");
    assert_eq!(value["comparisons"][0]["conclusion"], "increase_detected");
    assert!(value["sequential"].is_null());
}
