#![deny(missing_docs)]
#![doc = "Entity model, error taxonomy, addressing and canonical serialisation for the canon formula registry."]

/// Consumer addressing scheme.
pub mod address;
pub mod errors;
/// Canonical hashing helpers.
pub mod hash;
/// Formula, parameter and link definitions.
pub mod model;
pub mod provenance;
/// Canonical JSON helpers.
pub mod serde;
/// Validation record schema.
pub mod validation;

pub use address::Address;
pub use errors::{CanonError, ErrorInfo};
pub use hash::stable_hash_string;
pub use model::{
    Bound, BoundKind, Derivation, DisclosureTier, Entity, EntityKind, EntityRef,
    ExperimentalComparison, Formula, FormulaCategory, Link, LinkKind, Parameter,
    ParameterStatus, ReferenceKind, SimulationResult, Term,
};
pub use provenance::{ExportProvenance, SchemaVersion};
pub use validation::{BoundCheck, Deviation, ValidationRecord, ValidationStatus};
