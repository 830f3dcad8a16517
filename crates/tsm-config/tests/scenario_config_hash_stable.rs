//! Config hash stability.
//!
//! GREEN when:
//! - Loading the same documents twice yields the same hash.
//! - Key order inside a document does not change the hash.
//! - An overlay that changes a value changes the hash, and the merged
//!   document keeps base keys the overlay does not mention.
//! - The path loader agrees with the string loader.

use std::io::Write;

use tsm_config::{load_layered_yaml, load_layered_yaml_from_strings};

const BASE_YAML: &str = r#"
defaults:
  market: XNYS
  interval_minutes: 5
session:
  open: "09:30"
  cutoff: "15:59"
  open_offset_minutes: 2
markets:
  DEMO:
    extends: XNYS
    holidays: ["2024-01-03"]
"#;

const BASE_YAML_REORDERED: &str = r#"
markets:
  DEMO:
    holidays: ["2024-01-03"]
    extends: XNYS
session:
  open_offset_minutes: 2
  cutoff: "15:59"
  open: "09:30"
defaults:
  interval_minutes: 5
  market: XNYS
"#;

const OVERLAY_YAML: &str = r#"
defaults:
  interval_minutes: 15
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
    assert_eq!(a.config_hash.len(), 64, "sha256 hex is 64 chars");
}

#[test]
fn key_order_does_not_change_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_changes_hash_and_keeps_base_keys() {
    let base = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let merged = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(base.config_hash, merged.config_hash);

    let s = merged.settings().unwrap();
    assert_eq!(s.defaults.interval_minutes, 15);
    assert_eq!(s.defaults.market, "XNYS");
    assert_eq!(s.session.cutoff, "15:59");
}

#[test]
fn path_loader_matches_string_loader() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let overlay = dir.path().join("overlay.yaml");
    std::fs::File::create(&base)
        .unwrap()
        .write_all(BASE_YAML.as_bytes())
        .unwrap();
    std::fs::File::create(&overlay)
        .unwrap()
        .write_all(OVERLAY_YAML.as_bytes())
        .unwrap();

    let base_s = base.to_str().unwrap();
    let overlay_s = overlay.to_str().unwrap();
    let from_paths = load_layered_yaml(&[base_s, overlay_s]).unwrap();
    let from_strings = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(from_paths.config_hash, from_strings.config_hash);
}

#[test]
fn missing_path_is_reported() {
    let err = load_layered_yaml(&["/definitely/not/here.yaml"]).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read yaml path"));
}
