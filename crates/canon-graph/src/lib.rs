//! Derivation graph construction for the canon registry.
//!
//! The graph is built from declared `parent_formulas`, `uses_parameters`,
//! `outputs_parameters` and `formula_id` links. Inverse edges are never
//! authored; they are accumulated while links are resolved.

pub mod cycles;
pub mod error;
pub mod graph;

pub use cycles::{find_cycles, DependencyCycles};
pub use error::{CycleReport, GraphBuildError, Unresolved, UnresolvedReference};
pub use graph::{build, Adjacency, DerivationGraph, EdgeKind, GraphEdge};
