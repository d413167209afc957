//! Validation record schema shared by the engine, the checker and the exporter.

use serde::{Deserialize, Serialize};

use crate::errors::{CanonError, ErrorInfo};
use crate::model::{BoundKind, EntityRef};

/// Verdict assigned to a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    /// Within the pass threshold, or an exact identity that holds.
    Pass,
    /// Between the pass and check thresholds.
    Check,
    /// Outside the check threshold, a violated bound or a broken identity.
    Fail,
    /// No reference value exists yet.
    Speculative,
}

impl ValidationStatus {
    /// Upper-case name as serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationStatus::Pass => "PASS",
            ValidationStatus::Check => "CHECK",
            ValidationStatus::Fail => "FAIL",
            ValidationStatus::Speculative => "SPECULATIVE",
        }
    }
}

/// Deviation between computed and reference value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Deviation {
    /// Standard deviations of the reference uncertainty.
    Sigma(f64),
    /// `|computed - reference| / |reference|`.
    Relative(f64),
    /// `|computed - reference|`, used when the reference is zero.
    Absolute(f64),
}

impl Deviation {
    /// Numeric value regardless of unit.
    pub fn magnitude(&self) -> f64 {
        match self {
            Deviation::Sigma(value) | Deviation::Relative(value) | Deviation::Absolute(value) => {
                *value
            }
        }
    }

    /// Whether the deviation is expressed in standard deviations.
    pub fn is_sigma(&self) -> bool {
        matches!(self, Deviation::Sigma(_))
    }
}

/// Bound summary carried by records produced from one-sided bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundCheck {
    /// Lower or upper.
    pub kind: BoundKind,
    /// Bound value.
    pub bound: f64,
    /// Required fractional margin.
    pub margin: f64,
    /// `computed / bound`; absent when the bound is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
}

/// Result of comparing a computed value to a reference or bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    /// Validated entity.
    pub subject: EntityRef,
    /// Value under test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<f64>,
    /// Reference value, or the bound value for bound-only records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<f64>,
    /// Uncertainty of the reference, as declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
    /// Deviation rounded for reporting; `None` for bound-only and speculative records.
    pub deviation: Option<Deviation>,
    /// Bound evaluation, when a bound is declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound: Option<BoundCheck>,
    /// Verdict.
    pub status: ValidationStatus,
    /// Set when the reference is an exact mathematical identity.
    #[serde(default)]
    pub exact: bool,
    /// Units of the comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Citation of the reference or bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_citation: Option<String>,
    /// Why a verdict is not a plain pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ValidationRecord {
    /// Status as reported to readers, marking passes against exact identities.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            ValidationStatus::Pass if self.exact => "PASS (exact)",
            status => status.as_str(),
        }
    }

    /// Verifies the structural invariants of a record.
    ///
    /// PASS/CHECK/FAIL need both a computed and a reference value; SPECULATIVE
    /// never carries a sigma deviation.
    pub fn check_invariants(&self) -> Result<(), CanonError> {
        let id = self.subject.id.as_str();
        match self.status {
            ValidationStatus::Speculative => {
                if self.deviation.is_some_and(|deviation| deviation.is_sigma()) {
                    return Err(CanonError::Data(
                        ErrorInfo::new(
                            "canon.validation.speculative_sigma",
                            "speculative record carries a sigma deviation",
                        )
                        .with_context("id", id),
                    ));
                }
            }
            _ => {
                if self.computed.is_none() || self.reference.is_none() {
                    return Err(CanonError::Data(
                        ErrorInfo::new(
                            "canon.validation.verdict_without_values",
                            format!(
                                "{} verdict requires both computed and reference values",
                                self.status.as_str()
                            ),
                        )
                        .with_context("id", id),
                    ));
                }
            }
        }
        Ok(())
    }
}
