//! Variant - per-arm aggregate statistics

use serde::{Deserialize, Serialize};

use super::MetricKind;
use crate::stats;
use crate::{Error, Result};

/// One arm of the experiment, described only by summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    name: String,
    sample_size: u64,
    #[serde(alias = "mean", alias = "rate")]
    value: f64,
    #[serde(default, alias = "std", alias = "standard_deviation")]
    std_dev: Option<f64>,
    #[serde(default, alias = "is_control")]
    control: bool,
}

impl Variant {
    /// Create a treatment variant with no standard deviation.
    ///
    /// # Arguments
    ///
    /// * `name` - Variant label
    /// * `sample_size` - Number of units observed
    /// * `value` - Observed mean (numeric) or rate (conversion)
    #[must_use]
    pub fn new(name: impl Into<String>, sample_size: u64, value: f64) -> Self {
        Self {
            name: name.into(),
            sample_size,
            value,
            std_dev: None,
            control: false,
        }
    }

    /// Create a builder for a variant with optional fields.
    #[must_use]
    pub fn builder(name: impl Into<String>, sample_size: u64, value: f64) -> VariantBuilder {
        VariantBuilder::new(name, sample_size, value)
    }

    /// Get the variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the sample size.
    #[must_use]
    pub const fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// Get the observed mean or rate.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Get the standard deviation, if given.
    #[must_use]
    pub const fn std_dev(&self) -> Option<f64> {
        self.std_dev
    }

    /// Whether this variant is the control.
    #[must_use]
    pub const fn is_control(&self) -> bool {
        self.control
    }

    /// Check the variant against the constraints of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVariant`] if the sample size is zero, the value
    /// is not finite, a numeric variant has fewer than two units or lacks a
    /// positive standard deviation, or a conversion rate lies outside [0, 1].
    /// A standard deviation on a conversion variant is logged and ignored.
    pub fn validate(&self, kind: MetricKind) -> Result<()> {
        if self.sample_size == 0 {
            return Err(Error::InvalidVariant(format!(
                "variant '{}': sample size must be positive",
                self.name
            )));
        }
        if !self.value.is_finite() {
            return Err(Error::InvalidVariant(format!(
                "variant '{}': value must be finite, got {}",
                self.name, self.value
            )));
        }

        match kind {
            MetricKind::Numeric => {
                let sd = self.std_dev.ok_or_else(|| {
                    Error::InvalidVariant(format!(
                        "variant '{}': numeric metrics require a standard deviation",
                        self.name
                    ))
                })?;
                if !(sd.is_finite() && sd > 0.0) {
                    return Err(Error::InvalidVariant(format!(
                        "variant '{}': standard deviation must be positive, got {sd}",
                        self.name
                    )));
                }
                if self.sample_size < 2 {
                    return Err(Error::InvalidVariant(format!(
                        "variant '{}': numeric metrics need at least 2 units to estimate variance",
                        self.name
                    )));
                }
            }
            MetricKind::Conversion => {
                if !(0.0..=1.0).contains(&self.value) {
                    return Err(Error::InvalidVariant(format!(
                        "variant '{}': conversion rate must be in [0, 1], got {}",
                        self.name, self.value
                    )));
                }
                if let Some(sd) = self.std_dev {
                    tracing::warn!(
                        variant = %self.name,
                        std_dev = sd,
                        "standard deviation supplied for a conversion metric; ignoring it"
                    );
                }
            }
        }
        Ok(())
    }

    /// Standard deviation used for reporting: the given one for numeric
    /// metrics, the binomial standard error `sqrt(p(1-p)/n)` for conversions.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn effective_std_dev(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Numeric => self.std_dev.unwrap_or(0.0),
            MetricKind::Conversion => {
                (self.value * (1.0 - self.value) / self.sample_size.max(1) as f64).sqrt()
            }
        }
    }
}

/// Builder for `Variant`.
#[derive(Debug)]
pub struct VariantBuilder {
    name: String,
    sample_size: u64,
    value: f64,
    std_dev: Option<f64>,
    control: bool,
}

impl VariantBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, sample_size: u64, value: f64) -> Self {
        Self {
            name: name.into(),
            sample_size,
            value,
            std_dev: None,
            control: false,
        }
    }

    /// Set the standard deviation (required for numeric metrics).
    #[must_use]
    pub fn std_dev(mut self, std_dev: f64) -> Self {
        self.std_dev = Some(std_dev);
        self
    }

    /// Mark this variant as the control.
    #[must_use]
    pub const fn control(mut self) -> Self {
        self.control = true;
        self
    }

    /// Build the `Variant`.
    #[must_use]
    pub fn build(self) -> Variant {
        Variant {
            name: self.name,
            sample_size: self.sample_size,
            value: self.value,
            std_dev: self.std_dev,
            control: self.control,
        }
    }
}

/// Descriptive summary of one variant, reported alongside the comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    name: String,
    control: bool,
    sample_size: u64,
    value: f64,
    std_dev: f64,
    approximately_normal: bool,
    confidence_interval: (f64, f64),
}

impl VariantSummary {
    /// Summarize a validated variant.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn new(variant: &Variant, kind: MetricKind) -> Self {
        let n = variant.sample_size;
        let std_dev = variant.effective_std_dev(kind);
        // For conversions `std_dev` is already a standard error, so the
        // interval uses n = 1 to avoid dividing by sqrt(n) twice.
        let interval_n = match kind {
            MetricKind::Numeric => n,
            MetricKind::Conversion => 1,
        };
        let approximately_normal = match kind {
            MetricKind::Numeric => n >= 30,
            MetricKind::Conversion => {
                let n = n as f64;
                n * variant.value >= 10.0 && n * (1.0 - variant.value) >= 10.0
            }
        };

        Self {
            name: variant.name.clone(),
            control: variant.control,
            sample_size: n,
            value: variant.value,
            std_dev,
            approximately_normal,
            confidence_interval: stats::normal_interval(variant.value, std_dev, interval_n),
        }
    }

    /// Get the variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this variant is the control.
    #[must_use]
    pub const fn is_control(&self) -> bool {
        self.control
    }

    /// Get the sample size.
    #[must_use]
    pub const fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// Get the observed mean or rate.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Get the reported standard deviation.
    #[must_use]
    pub const fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// CLT heuristic: whether a normal approximation is reasonable.
    #[must_use]
    pub const fn approximately_normal(&self) -> bool {
        self.approximately_normal
    }

    /// 95% normal-approximation interval for the value.
    #[must_use]
    pub const fn confidence_interval(&self) -> (f64, f64) {
        self.confidence_interval
    }
}
