//! Request envelope
//!
//! Decodes the flat JSON shape a transport layer sends and folds it into
//! the typed [`ExperimentConfig`] / [`Variant`] records:
//!
//! ```json
//! {
//!   "config": {
//!     "metric_name": "checkout_rate",
//!     "metric_kind": "conversion",
//!     "planned_sample_size": 20000,
//!     "intent": "detect_increase",
//!     "methodology": "sequential",
//!     "start_date": "2024-03-01",
//!     "end_date": "05/04/2024",
//!     "alpha_spending": "obrien_fleming"
//!   },
//!   "variants": [
//!     { "name": "control", "sample_size": 10000, "value": 0.10, "control": true },
//!     { "name": "new_button", "sample_size": 10000, "value": 0.112 }
//!   ]
//! }
//! ```

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::experiment::{
    AnalysisResult, CorrectionKind, ExperimentConfig, InflationTechnique, Methodology, MetricKind,
    SequentialPlan, SpendingFamily, TestIntent, Variant,
};
use crate::{Error, Result};

/// Accepted calendar-date layouts, tried in order.
pub const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%Y.%m.%d",
];

/// Parse a calendar date in any of [`DATE_FORMATS`].
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if no layout matches.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "unrecognized date '{raw}'; expected YYYY-MM-DD or DD/MM/YYYY"
            ))
        })
}

/// Flat configuration block of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigInput {
    /// Metric label.
    pub metric_name: String,
    /// Numeric or conversion.
    pub metric_kind: MetricKind,
    /// Planned total sample size.
    pub planned_sample_size: u64,
    /// Test intent.
    #[serde(default = "default_intent")]
    pub intent: TestIntent,
    /// Global significance level.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Fixed or sequential.
    #[serde(default = "default_methodology")]
    pub methodology: Methodology,
    /// Multiple-comparison correction.
    #[serde(default = "default_correction", alias = "correction_method")]
    pub correction: CorrectionKind,
    /// Monitoring start (sequential only).
    #[serde(default)]
    pub start_date: Option<String>,
    /// Monitoring end (sequential only).
    #[serde(default)]
    pub end_date: Option<String>,
    /// Evaluation date; defaults to the end date.
    #[serde(default)]
    pub as_of_date: Option<String>,
    /// Alpha-spending family.
    #[serde(default = "default_spending")]
    pub alpha_spending: SpendingFamily,
    /// Boundary technique for the inflation factor.
    #[serde(default = "default_technique")]
    pub inflation_technique: InflationTechnique,
    /// Shape parameter for power/exponential spending.
    #[serde(default = "default_lambda")]
    pub lambda: f64,
    /// Explicit interim look count.
    #[serde(default)]
    pub planned_looks: Option<u32>,
}

const fn default_alpha() -> f64 {
    0.05
}

const fn default_lambda() -> f64 {
    1.0
}

const fn default_intent() -> TestIntent {
    TestIntent::DetectIncrease
}

const fn default_methodology() -> Methodology {
    Methodology::Fixed
}

const fn default_correction() -> CorrectionKind {
    CorrectionKind::Bonferroni
}

const fn default_spending() -> SpendingFamily {
    SpendingFamily::Linear
}

const fn default_technique() -> InflationTechnique {
    InflationTechnique::Pocock
}

impl ConfigInput {
    /// Fold the flat fields into an [`ExperimentConfig`].
    ///
    /// Sequential fields are only read under sequential methodology.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a date is malformed or
    /// start/end are missing under sequential methodology.
    pub fn to_config(&self) -> Result<ExperimentConfig> {
        let builder =
            ExperimentConfig::builder(&self.metric_name, self.metric_kind, self.planned_sample_size)
                .intent(self.intent)
                .alpha(self.alpha)
                .correction(self.correction);

        match self.methodology {
            Methodology::Fixed => {
                if self.start_date.is_some() || self.end_date.is_some() {
                    tracing::warn!(
                        metric = %self.metric_name,
                        "sequential dates supplied under fixed methodology; ignoring them"
                    );
                }
                Ok(builder.methodology(Methodology::Fixed).build())
            }
            Methodology::Sequential => Ok(builder.sequential(self.to_plan()?).build()),
        }
    }

    fn to_plan(&self) -> Result<SequentialPlan> {
        let required = |field: &Option<String>, name: &str| {
            field.as_deref().map(parse_date).unwrap_or_else(|| {
                Err(Error::InvalidConfiguration(format!(
                    "sequential methodology requires {name}"
                )))
            })
        };
        let start = required(&self.start_date, "start_date")?;
        let end = required(&self.end_date, "end_date")?;

        let mut plan = SequentialPlan::new(start, end)
            .spending(self.alpha_spending)
            .technique(self.inflation_technique)
            .lambda(self.lambda);
        if let Some(raw) = &self.as_of_date {
            plan = plan.as_of(parse_date(raw)?);
        }
        if let Some(looks) = self.planned_looks {
            plan = plan.planned_looks(looks);
        }
        Ok(plan)
    }
}

/// One analysis request: configuration plus variant statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Configuration block.
    pub config: ConfigInput,
    /// Variants in input order.
    pub variants: Vec<Variant>,
}

impl AnalyzeRequest {
    /// Decode a request from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the document does not match the envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Split into typed config and variants.
    ///
    /// # Errors
    ///
    /// See [`ConfigInput::to_config`].
    pub fn to_parts(&self) -> Result<(ExperimentConfig, &[Variant])> {
        Ok((self.config.to_config()?, &self.variants))
    }

    /// Run the analysis described by this request.
    ///
    /// # Errors
    ///
    /// Any error from [`ConfigInput::to_config`] or [`crate::analyze`].
    pub fn analyze(&self) -> Result<AnalysisResult> {
        let (config, variants) = self.to_parts()?;
        crate::analyze(&config, variants)
    }
}

/// Decode a JSON request and analyze it.
///
/// # Errors
///
/// Returns [`Error::Json`] for an undecodable document, otherwise any
/// error from [`AnalyzeRequest::analyze`].
///
/// # Examples
///
/// ```rust
/// let json = r#"{
///     "config": {"metric_name": "ctr", "metric_kind": "conversion", "planned_sample_size": 2000},
///     "variants": [
///         {"name": "control", "sample_size": 1000, "value": 0.10, "control": true},
///         {"name": "blue", "sample_size": 1000, "value": 0.15}
///     ]
/// }"#;
/// let result = ab_verdict::request::analyze_json(json)?;
/// assert!(result.comparisons()[0].rejected());
/// # Ok::<(), ab_verdict::Error>(())
/// ```
pub fn analyze_json(json: &str) -> Result<AnalysisResult> {
    AnalyzeRequest::from_json(json)?.analyze()
}

/// Read a request document from `path`, or from stdin when `path` is `-`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the source cannot be read as UTF-8 text.
pub fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
