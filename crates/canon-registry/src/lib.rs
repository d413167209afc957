//! Write-once registry of formulas and parameters.
//!
//! The registry is rebuilt from authoritative definitions on every run; it
//! performs no I/O of its own; [`definitions`] handles reading authoring
//! files.

pub mod definitions;
pub mod registry;

pub use definitions::{
    load_definitions, DefinitionFile, Definitions, LoadPlan, RegistryBuild, SourceFile,
};
pub use registry::Registry;
