use std::path::PathBuf;

use super::*;
use crate::inventory::{Package, PluginStatus, ScanOutcome};

fn sample_result() -> ScanResult {
    let mut flask = Package::new("flask", "2.3.2");
    flask.locations.push(PathBuf::from("web/requirements.txt"));
    flask.extractor = "python/requirements".to_string();
    ScanResult {
        inventory: vec![flask],
        statuses: vec![
            PluginStatus {
                name: "python/requirements".to_string(),
                found_inventory: true,
                outcome: ScanOutcome::Success,
            },
            PluginStatus {
                name: "rust/cargo-lock".to_string(),
                found_inventory: false,
                outcome: ScanOutcome::Failed {
                    reasons: vec!["Cargo.lock: parse error".to_string()],
                },
            },
        ],
    }
}

#[test]
fn lists_packages_and_statuses() {
    let output = TextFormatter::new(ColorMode::Never)
        .format(&sample_result())
        .unwrap();

    assert!(output.contains("Inventory (1 package(s)):"));
    assert!(output.contains("flask 2.3.2"));
    assert!(output.contains("web/requirements.txt"));
    assert!(output.contains("python/requirements: found inventory"));
    assert!(output.contains("rust/cargo-lock: 1 error(s)"));
    assert!(output.contains("Cargo.lock: parse error"));
}

#[test]
fn no_ansi_codes_without_colors() {
    let output = TextFormatter::new(ColorMode::Never)
        .format(&sample_result())
        .unwrap();
    assert!(!output.contains("\x1b["));
}

#[test]
fn ansi_codes_when_forced() {
    let output = TextFormatter::new(ColorMode::Always)
        .format(&sample_result())
        .unwrap();
    assert!(output.contains("\x1b[32m"));
    assert!(output.contains("\x1b[31m"));
}

#[test]
fn verbose_shows_extractor_per_package() {
    let output = TextFormatter::with_verbose(ColorMode::Never, 1)
        .format(&sample_result())
        .unwrap();
    assert!(output.contains("extractor: python/requirements"));
}

#[test]
fn empty_result_still_renders() {
    let output = TextFormatter::new(ColorMode::Never)
        .format(&ScanResult::default())
        .unwrap();
    assert!(output.contains("Inventory (0 package(s)):"));
}
