use std::fs;
use std::path::PathBuf;

use cli_support::ModelArgs;
use efficientnet::Variant;
use efficientnet_tools::RunConfig;

fn write_temp_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("efficientnet.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent.toml");
    assert!(RunConfig::from_path(&absent).unwrap().is_none());
    assert_eq!(RunConfig::load_with(Some(&absent)), RunConfig::default());
}

#[test]
fn loads_minimal_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_config(&dir, "variant = \"b0\"\nnum_classes = 10\n");
    let cfg = RunConfig::from_path(&path).unwrap().expect("load config");
    assert_eq!(cfg.variant, Variant::B0);
    assert_eq!(cfg.num_classes, 10);
    assert_eq!(cfg.batch_size, 64);
    assert_eq!(cfg.image_size, 224);
    assert_eq!(cfg.model_config(), Variant::B0.config(10));
}

#[test]
fn overrides_replace_variant_coefficients() {
    let cfg = RunConfig::from_toml(
        r#"
variant = "efficientnet-b2"

[overrides]
depth_coef = 1.0
dropout = 0.1
"#,
    )
    .unwrap();
    let model = cfg.model_config();
    assert_eq!(model.width_coef, 1.1);
    assert_eq!(model.depth_coef, 1.0);
    assert_eq!(model.dropout, 0.1);
    assert_eq!(model.se_ratio, 0.25);
}

#[test]
fn unknown_variant_is_rejected() {
    assert!(RunConfig::from_toml("variant = \"b9\"").is_err());
    assert!(RunConfig::from_toml("batch_size = \"many\"").is_err());
}

#[test]
fn report_path_expands_environment() {
    std::env::set_var("EFFNET_REPORT_ROOT", "/tmp/effnet-reports");
    let cfg = RunConfig::from_toml("report_path = \"${EFFNET_REPORT_ROOT}/b3.txt\"").unwrap();
    assert_eq!(
        cfg.report_path,
        Some(PathBuf::from("/tmp/effnet-reports/b3.txt"))
    );
}

#[test]
fn cli_values_win() {
    let cfg = RunConfig::from_toml("variant = \"b1\"\nnum_classes = 7").unwrap();
    let cfg = cfg.apply_cli(&ModelArgs {
        variant: Some(Variant::B6),
        num_classes: None,
    });
    assert_eq!(cfg.variant, Variant::B6);
    assert_eq!(cfg.num_classes, 7);
}
