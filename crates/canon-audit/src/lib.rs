//! Consistency checker for the canon registry.
//!
//! The checker is the one place that decides whether a problem blocks
//! publication. It consumes the registry, the graph build outcome and the
//! validation run, and reports [`Finding`]s instead of failing.

mod agreement;
pub mod checker;
mod contract;
pub mod findings;
mod numbering;
pub mod policy;
mod references;

pub use checker::{check, AuditInputs};
pub use findings::{has_blocking, Finding, FindingCounts, Severity};
pub use policy::{AuditPolicy, TierOmission};
