//! # ab-verdict: A/B/n Experiment Analysis Engine
//!
//! **Version**: 0.1.0
//!
//! ab-verdict turns per-variant summary statistics into statistically
//! defensible, direction-aware verdicts: one two-sample test per
//! treatment, a multiple-comparison correction across treatments, and
//! optional group-sequential monitoring with alpha spending.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke safety**: All inputs validated before any result exists
//! - **Jidoka**: Direction-aware decisions never report an effect that opposes the intent
//! - **Genchi Genbutsu**: Closed-form spending functions and published inflation tables
//! - **Muda elimination**: Pure functions, no caches, no shared state
//!
//! ## Pipeline
//!
//! ```text
//! config + variants ─> Test Selector (xN-1) ─> Correction Engine ─┐
//!                  └─> Sequential Engine (sequential only) ───────┴─> Decision Aggregator
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use ab_verdict::experiment::{ExperimentConfig, MetricKind, TestIntent, Variant};
//!
//! let config = ExperimentConfig::builder("signup_rate", MetricKind::Conversion, 20_000)
//!     .intent(TestIntent::DetectDifference)
//!     .build();
//! let variants = [
//!     Variant::builder("control", 10_000, 0.10).control().build(),
//!     Variant::new("short_form", 10_000, 0.10),
//! ];
//!
//! let result = ab_verdict::analyze(&config, &variants)?;
//! assert!(!result.comparisons()[0].rejected());
//! println!("{}", result.to_json_pretty()?);
//! # Ok::<(), ab_verdict::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

#[cfg(feature = "rayon")]
pub mod batch;
pub mod correction;
pub mod decision;
pub mod error;
pub mod experiment;
pub mod request;
pub mod selector;
pub mod sequential;
pub mod stats;

pub use decision::analyze;
pub use error::{Error, Result};
