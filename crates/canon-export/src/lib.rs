//! Export stage of the canon pipeline.
//!
//! [`export`] turns a checked registry into the canonical document,
//! [`publish`] writes it atomically, and [`ConsumerDocument`] is the
//! fail-soft reader used by presentation consumers.

pub mod document;
pub mod exporter;
pub mod loader;
pub mod pipeline;
pub mod publish;

pub use document::{
    ExportDocument, ExportSummary, FormulaRecord, GraphSection, ParameterRecord,
    PublishedValidation, SCHEMA_VERSION,
};
pub use exporter::{export, ExportContext, ExportOptions};
pub use loader::{ConsumerDocument, ElementView, PrimaryTier, Resolution, SummaryTier};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineRun};
pub use publish::{publish, read_document, write_atomic};
