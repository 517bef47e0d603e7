//! Experiment records
//!
//! Plain values passed into and returned from [`crate::analyze`]. Nothing
//! here is cached or mutated across calls.
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentConfig ──┬── SequentialPlan (sequential only)
//!                    │
//! Variant (N >= 2) ──┴─> AnalysisResult
//!                           ├──< ComparisonResult (N - 1)
//!                           ├──< VariantSummary (N)
//!                           ├─── SequentialInfo (sequential only)
//!                           └─── CorrectionSummary
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ab_verdict::experiment::{ExperimentConfig, MetricKind, TestIntent, Variant};
//!
//! let config = ExperimentConfig::builder("checkout_rate", MetricKind::Conversion, 20_000)
//!     .intent(TestIntent::DetectIncrease)
//!     .build();
//!
//! let control = Variant::builder("control", 10_000, 0.100).control().build();
//! let treatment = Variant::new("new_button", 10_000, 0.112);
//!
//! let result = ab_verdict::analyze(&config, &[control, treatment])?;
//! assert_eq!(result.comparisons().len(), 1);
//! # Ok::<(), ab_verdict::Error>(())
//! ```

mod config;
mod result;
mod variant;

pub use config::{
    CorrectionKind, ExperimentConfig, ExperimentConfigBuilder, InflationTechnique, Methodology,
    MetricKind, SequentialPlan, SpendingFamily, TestIntent,
};
pub use result::{AnalysisResult, ComparisonResult, Conclusion, CorrectionSummary, SequentialInfo};
pub use variant::{Variant, VariantBuilder, VariantSummary};
