use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sigma thresholds for two-sided comparisons.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SigmaThresholds {
    /// Deviations at or below this value pass.
    pub pass: f64,
    /// Deviations at or below this value (and above `pass`) need checking.
    pub check: f64,
}

impl Default for SigmaThresholds {
    fn default() -> Self {
        Self {
            pass: 2.0,
            check: 5.0,
        }
    }
}

/// Relative-error thresholds for references without an uncertainty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RelativeThresholds {
    /// Largest relative error that still passes.
    pub pass: f64,
    /// Largest relative error that needs checking rather than failing.
    pub check: f64,
}

impl Default for RelativeThresholds {
    fn default() -> Self {
        Self {
            pass: 0.01,
            check: 0.05,
        }
    }
}

/// Tolerance policy controlling validation verdicts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    /// Rounding granularity applied to reported deviations.
    ///
    /// Verdicts are always computed from unrounded values.
    #[serde(default = "Policy::default_rounding")]
    pub rounding: f64,
    /// Default sigma thresholds for measurements.
    #[serde(default)]
    pub sigma: SigmaThresholds,
    /// Thresholds for `kind: relative` references.
    #[serde(default)]
    pub relative: RelativeThresholds,
    /// Per-citation overrides of the sigma thresholds.
    #[serde(default)]
    pub sources: BTreeMap<String, SigmaThresholds>,
}

impl Policy {
    const fn default_rounding() -> f64 {
        1e-9
    }

    /// Rounds the provided value according to the policy granularity.
    pub fn round(&self, value: f64) -> f64 {
        if self.rounding <= 0.0 {
            return value;
        }
        (value / self.rounding).round() * self.rounding
    }

    /// Sigma thresholds applying to a reference from `source`.
    pub fn sigma_for(&self, source: &str) -> SigmaThresholds {
        self.sources.get(source).copied().unwrap_or(self.sigma)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            rounding: Self::default_rounding(),
            sigma: SigmaThresholds::default(),
            relative: RelativeThresholds::default(),
            sources: BTreeMap::new(),
        }
    }
}
