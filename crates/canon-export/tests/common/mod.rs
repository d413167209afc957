#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use canon_export::{run_pipeline, ExportDocument, PipelineConfig, PipelineRun};

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .canonicalize()
        .unwrap()
}

pub fn fixture_roots() -> Vec<PathBuf> {
    vec![workspace_root().join("fixtures/definitions")]
}

pub fn fixture_config() -> PipelineConfig {
    PipelineConfig::load(&workspace_root().join("fixtures/config/pipeline.yaml")).unwrap()
}

pub fn fixture_run() -> PipelineRun {
    run_pipeline(&fixture_roots(), &fixture_config()).unwrap()
}

pub fn fixture_document() -> ExportDocument {
    fixture_run().export(&fixture_config()).unwrap()
}

pub fn fixture_bytes() -> Vec<u8> {
    fixture_document().to_bytes(false).unwrap()
}

/// Writes one definitions file into `dir` and returns the root to load.
pub fn write_definitions(dir: &Path, yaml: &str) -> Vec<PathBuf> {
    let root = dir.join("definitions");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("entities.yaml"), yaml).unwrap();
    vec![root]
}

pub const ORPHAN_DERIVATION: &str = r#"
formulas:
  - id: F1
    label: "Orphaned relation (2.1)"
    latex: "y = 2 x"
    mathml: "<math><mi>y</mi><mo>=</mo><mn>2</mn><mi>x</mi></math>"
    plain: "y = 2 x"
    category: DERIVED
    description: "Derived from a parent that was never registered."
    terms:
      y:
        name: "Output"
        description: "Derived quantity"
    derivation:
      parent_formulas: [F0]
      steps:
        - "Double the parent."
"#;
