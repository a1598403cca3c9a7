use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::*;
use crate::extractor::default_registry;
use crate::vfs::MemFs;

fn config_for(root: &Path) -> ScanConfig {
    ScanConfig {
        roots: vec![root.to_path_buf()],
        ..Default::default()
    }
}

#[test]
fn scans_a_real_tree_with_builtin_extractors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Cargo.lock"),
        "[[package]]\nname = \"serde\"\nversion = \"1.0.200\"\n",
    )
    .unwrap();
    fs::create_dir(dir.path().join("web")).unwrap();
    fs::write(
        dir.path().join("web/requirements.txt"),
        "flask==2.3.2\n",
    )
    .unwrap();

    let scanner = Scanner::new(config_for(dir.path())).unwrap();
    let result = scanner.run(&default_registry()).unwrap();

    assert_eq!(result.inventory.len(), 2);
    let serde = result
        .inventory
        .iter()
        .find(|p| p.name == "serde")
        .unwrap();
    assert_eq!(serde.extractor, "rust/cargo-lock");
    assert_eq!(serde.locations, vec![PathBuf::from("Cargo.lock")]);

    // One status row per registered extractor, in registration order.
    let names: Vec<&str> = result.statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "rust/cargo-lock",
            "javascript/package-lock",
            "python/requirements",
        ]
    );
    assert!(result.all_succeeded());
    let npm = &result.statuses[1];
    assert!(!npm.found_inventory);
    assert!(npm.outcome.is_success());
}

#[test]
fn failed_extractor_is_reported_but_scan_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Cargo.lock"), "not valid toml [[[").unwrap();
    fs::write(dir.path().join("requirements.txt"), "flask==2.3.2\n").unwrap();

    let scanner = Scanner::new(config_for(dir.path())).unwrap();
    let result = scanner.run(&default_registry()).unwrap();

    assert_eq!(result.inventory.len(), 1);
    assert_eq!(result.inventory[0].name, "flask");

    let cargo = &result.statuses[0];
    assert!(!cargo.outcome.is_success());
    match &cargo.outcome {
        ScanOutcome::Failed { reasons } => {
            assert_eq!(reasons.len(), 1);
            assert!(reasons[0].contains("Cargo.lock"));
        }
        ScanOutcome::Success => unreachable!(),
    }
    let python = &result.statuses[2];
    assert!(python.outcome.is_success());
    assert!(python.found_inventory);
}

#[test]
fn virtual_root_scan_filters_direct_fs_extractors() {
    use crate::extractor::{
        ExtractError, Extractor, LazyStat, Requirements, ScanInput,
    };

    struct DiskOnly;
    impl Extractor for DiskOnly {
        fn name(&self) -> &'static str {
            "test/disk-only"
        }
        fn requirements(&self) -> Requirements {
            Requirements {
                direct_fs: true,
                os: None,
            }
        }
        fn file_required(&self, _path: &Path, _stat: &LazyStat<'_>) -> bool {
            true
        }
        fn extract(
            &self,
            _input: &mut ScanInput<'_>,
        ) -> std::result::Result<Vec<crate::inventory::Package>, ExtractError> {
            Ok(vec![crate::inventory::Package::new("should-not-run", "0")])
        }
    }

    let mut mem = MemFs::new();
    mem.add_file("requirements.txt", "django==4.2.1\n");

    let mut registry = default_registry();
    registry.register("test/disk-only", || Box::new(DiskOnly));

    let config = ScanConfig {
        roots: Vec::new(),
        ..Default::default()
    };
    let mut scanner = Scanner::new(config).unwrap();
    scanner.add_virtual_root("mem", Arc::new(mem));
    let result = scanner.run(&registry).unwrap();

    assert_eq!(result.inventory.len(), 1);
    assert_eq!(result.inventory[0].name, "django");
    // The filtered extractor still gets a (success, nothing-found) row.
    let disk = result
        .statuses
        .iter()
        .find(|s| s.name == "test/disk-only")
        .unwrap();
    assert!(disk.outcome.is_success());
    assert!(!disk.found_inventory);
}

#[test]
fn multiple_roots_concatenate_in_configuration_order() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    fs::write(dir_a.path().join("requirements.txt"), "first==1.0.0\n").unwrap();
    fs::write(dir_b.path().join("requirements.txt"), "second==2.0.0\n").unwrap();

    let config = ScanConfig {
        roots: vec![dir_a.path().to_path_buf(), dir_b.path().to_path_buf()],
        ..Default::default()
    };
    let scanner = Scanner::new(config).unwrap();
    let result = scanner.run(&default_registry()).unwrap();

    let names: Vec<&str> = result.inventory.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn explicit_file_list_mode_skips_unlisted_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("requirements.txt"), "listed==1.0.0\n").unwrap();
    fs::write(
        dir.path().join("Cargo.lock"),
        "[[package]]\nname = \"unlisted\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();

    let config = ScanConfig {
        roots: vec![dir.path().to_path_buf()],
        files_to_extract: vec![PathBuf::from("requirements.txt")],
        ..Default::default()
    };
    let scanner = Scanner::new(config).unwrap();
    let result = scanner.run(&default_registry()).unwrap();

    assert_eq!(result.inventory.len(), 1);
    assert_eq!(result.inventory[0].name, "listed");
}

#[test]
fn explicit_file_mode_applies_to_the_whole_scan() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    fs::write(dir_a.path().join("requirements.txt"), "listed==1.0.0\n").unwrap();
    fs::write(dir_b.path().join("requirements.txt"), "unlisted==2.0.0\n").unwrap();

    let config = ScanConfig {
        roots: vec![dir_a.path().to_path_buf(), dir_b.path().to_path_buf()],
        files_to_extract: vec![dir_a.path().join("requirements.txt")],
        ..Default::default()
    };
    let scanner = Scanner::new(config).unwrap();
    let result = scanner.run(&default_registry()).unwrap();

    // The second root was assigned no files, so it is never walked.
    let names: Vec<&str> = result.inventory.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["listed"]);
}

#[test]
fn absolute_configured_path_outside_all_roots_fails_before_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();

    let config = ScanConfig {
        roots: vec![dir.path().to_path_buf()],
        skip_dirs: vec![outside.path().join("vendor")],
        ..Default::default()
    };
    let err = Scanner::new(config).unwrap_err();
    assert!(matches!(err, PkgscoutError::PathNotUnderRoot { .. }));
}

#[test]
fn absolute_skip_dir_is_normalized_to_its_root() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("vendor")).unwrap();
    fs::write(
        dir.path().join("vendor/requirements.txt"),
        "skipped==0.0.1\n",
    )
    .unwrap();
    fs::write(dir.path().join("requirements.txt"), "kept==1.0.0\n").unwrap();

    let config = ScanConfig {
        roots: vec![dir.path().to_path_buf()],
        skip_dirs: vec![dir.path().join("vendor")],
        ..Default::default()
    };
    let scanner = Scanner::new(config).unwrap();
    let result = scanner.run(&default_registry()).unwrap();

    assert_eq!(result.inventory.len(), 1);
    assert_eq!(result.inventory[0].name, "kept");
}

#[test]
fn missing_root_is_a_config_time_error() {
    let config = ScanConfig {
        roots: vec![PathBuf::from("/definitely/not/a/real/root")],
        ..Default::default()
    };
    assert!(Scanner::new(config).is_err());
}

#[test]
fn no_roots_at_all_is_an_error_at_run_time() {
    let config = ScanConfig {
        roots: Vec::new(),
        ..Default::default()
    };
    let scanner = Scanner::new(config).unwrap();
    let err = scanner.run(&default_registry()).unwrap_err();
    assert!(matches!(err, PkgscoutError::Config(_)));
}

#[test]
fn inode_budget_propagates_as_scan_error() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..10 {
        fs::write(dir.path().join(format!("f{i}.txt")), "x").unwrap();
    }
    let config = ScanConfig {
        roots: vec![dir.path().to_path_buf()],
        max_inodes: 3,
        ..Default::default()
    };
    let scanner = Scanner::new(config).unwrap();
    let err = scanner.run(&default_registry()).unwrap_err();
    assert!(matches!(err, PkgscoutError::InodeLimit { limit: 3, .. }));
}

#[test]
fn cancellation_token_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("requirements.txt"), "x==1\n").unwrap();

    let scanner = Scanner::new(config_for(dir.path())).unwrap();
    scanner
        .cancel_token()
        .store(true, std::sync::atomic::Ordering::Relaxed);
    let err = scanner.run(&default_registry()).unwrap_err();
    assert!(matches!(err, PkgscoutError::Cancelled));
}

#[test]
fn gitignore_mode_respects_root_patterns() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".gitignore"), "ignored/\n").unwrap();
    fs::create_dir(dir.path().join("ignored")).unwrap();
    fs::write(
        dir.path().join("ignored/requirements.txt"),
        "hidden==0.0.1\n",
    )
    .unwrap();
    fs::write(dir.path().join("requirements.txt"), "visible==1.0.0\n").unwrap();

    let config = ScanConfig {
        roots: vec![dir.path().to_path_buf()],
        use_gitignore: true,
        ..Default::default()
    };
    let scanner = Scanner::new(config).unwrap();
    let result = scanner.run(&default_registry()).unwrap();

    assert_eq!(result.inventory.len(), 1);
    assert_eq!(result.inventory[0].name, "visible");
}

#[cfg(unix)]
#[test]
fn symlinked_files_are_candidates_only_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("elsewhere")).unwrap();
    fs::write(
        dir.path().join("elsewhere/requirements-real.txt"),
        "linked==3.0.0\n",
    )
    .unwrap();
    std::os::unix::fs::symlink(
        dir.path().join("elsewhere/requirements-real.txt"),
        dir.path().join("requirements.txt"),
    )
    .unwrap();

    let mut config = config_for(dir.path());
    let scanner = Scanner::new(config.clone()).unwrap();
    let result = scanner.run(&default_registry()).unwrap();
    // Disabled by default: the symlink is ignored, only the real file counts.
    assert_eq!(result.inventory.len(), 1);
    assert_eq!(
        result.inventory[0].locations,
        vec![PathBuf::from("elsewhere/requirements-real.txt")]
    );

    config.read_symlinks = true;
    let scanner = Scanner::new(config).unwrap();
    let result = scanner.run(&default_registry()).unwrap();
    assert_eq!(result.inventory.len(), 2);
}
