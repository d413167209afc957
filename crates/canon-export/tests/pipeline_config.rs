mod common;

use canon_audit::TierOmission;
use canon_export::{ExportOptions, PipelineConfig};
use common::{fixture_config, workspace_root};

#[test]
fn fixture_config_loads_every_section() {
    let config = fixture_config();
    assert!(config.export.pretty);
    assert_eq!(
        config.export.generated_at.as_deref(),
        Some("2026-01-01T00:00:00+00:00")
    );
    assert_eq!(config.audit.tier_omission, TierOmission::Warning);
    assert!(config.validation.sources.contains_key("closed form"));
}

#[test]
fn empty_config_uses_defaults() {
    let config: PipelineConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config, PipelineConfig::default());
    assert!(!config.definitions.include.is_empty());
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = PipelineConfig::load(&workspace_root().join("fixtures/config/absent.yaml"))
        .unwrap_err();
    assert_eq!(err.info().code, "canon_export.config");
}

#[test]
fn timestamps_are_normalised() {
    let options = ExportOptions {
        generated_at: Some("2026-03-04T05:06:07.891Z".to_string()),
        pretty: false,
    };
    assert_eq!(options.timestamp().unwrap(), "2026-03-04T05:06:07+00:00");
}

#[test]
fn malformed_timestamps_are_rejected() {
    let options = ExportOptions {
        generated_at: Some("yesterday".to_string()),
        pretty: false,
    };
    assert_eq!(
        options.timestamp().unwrap_err().info().code,
        "canon_export.timestamp"
    );
}
