#![deny(missing_docs)]
#![doc = "Numeric validation of formulas and parameters against experimental references and bounds."]

/// Comparison engine producing validation records.
pub mod engine;
/// Policy definitions controlling tolerance discipline.
pub mod policies;

pub use engine::{
    is_validation_subject, validate, validate_all, validate_formula, validate_parameter,
    StatusCounts, ValidationRun,
};
pub use policies::{Policy, RelativeThresholds, SigmaThresholds};
