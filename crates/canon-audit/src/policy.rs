use serde::{Deserialize, Serialize};

/// Severity given to a disclosure tier that is neither present nor
/// declared absent by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TierOmission {
    #[default]
    Warning,
    Blocking,
}

/// Knobs controlling the consistency checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPolicy {
    /// Relative tolerance under which two literals of one quantity agree.
    #[serde(default = "AuditPolicy::default_rel_tol")]
    pub value_agreement_rel_tol: f64,
    #[serde(default)]
    pub tier_omission: TierOmission,
    /// Emit a warning for every mutually derived pair.
    #[serde(default = "AuditPolicy::default_report_mutual")]
    pub report_mutual_cycles: bool,
}

impl AuditPolicy {
    const fn default_rel_tol() -> f64 {
        1e-9
    }

    const fn default_report_mutual() -> bool {
        true
    }

    /// Whether two literals agree within the configured tolerance.
    pub fn agrees(&self, a: f64, b: f64) -> bool {
        if a == b {
            return true;
        }
        let scale = a.abs().max(b.abs());
        (a - b).abs() <= self.value_agreement_rel_tol * scale
    }
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            value_agreement_rel_tol: Self::default_rel_tol(),
            tier_omission: TierOmission::default(),
            report_mutual_cycles: Self::default_report_mutual(),
        }
    }
}
