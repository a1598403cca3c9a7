use std::path::Path;

use super::*;
use crate::vfs::{EntryKind, FileInfo, FileSystem, MemFs};

fn extract_from(content: &str) -> Result<Vec<Package>, ExtractError> {
    let mut fs = MemFs::new();
    fs.add_file("package-lock.json", content);
    let info = fs.stat(Path::new("package-lock.json")).unwrap();
    let mut reader = fs.open(Path::new("package-lock.json")).unwrap();
    let mut input = ScanInput {
        path: Path::new("package-lock.json"),
        info: &info,
        reader: &mut *reader,
        fs: &fs,
    };
    NpmLockExtractor.extract(&mut input)
}

fn file_info(size: u64) -> FileInfo {
    FileInfo {
        kind: EntryKind::File,
        size,
        modified: None,
    }
}

#[test]
fn matches_only_package_lock() {
    let stat = LazyStat::seeded(Path::new("x"), file_info(10));
    assert!(NpmLockExtractor.file_required(Path::new("app/package-lock.json"), &stat));
    assert!(!NpmLockExtractor.file_required(Path::new("package.json"), &stat));
}

#[test]
fn oversized_lockfile_is_not_required() {
    let stat = LazyStat::seeded(Path::new("x"), file_info(MAX_LOCKFILE_SIZE + 1));
    assert!(!NpmLockExtractor.file_required(Path::new("package-lock.json"), &stat));
}

#[test]
fn parses_v3_packages_map() {
    let content = r#"{
        "name": "my-app",
        "lockfileVersion": 3,
        "packages": {
            "": { "name": "my-app", "version": "1.0.0" },
            "node_modules/lodash": { "version": "4.17.21", "integrity": "sha512-x" },
            "node_modules/@babel/core": { "version": "7.24.0", "dev": true },
            "node_modules/linked": {}
        }
    }"#;
    let mut packages = extract_from(content).unwrap();
    packages.sort_by(|a, b| a.name.cmp(&b.name));

    // The root entry and the versionless entry are skipped.
    assert_eq!(packages.len(), 2);
    assert_eq!(packages[0].name, "@babel/core");
    assert_eq!(packages[0].metadata.0["dev"], serde_json::json!(true));
    assert_eq!(packages[1].name, "lodash");
    assert_eq!(packages[1].version, "4.17.21");
}

#[test]
fn nested_node_modules_keys_keep_leaf_name() {
    assert_eq!(
        package_name("node_modules/foo/node_modules/@scope/bar"),
        "@scope/bar"
    );
    assert_eq!(package_name("node_modules/plain"), "plain");
}

#[test]
fn malformed_json_is_an_extract_error() {
    let err = extract_from("{ not json").unwrap_err();
    assert!(err.to_string().contains("invalid JSON"));
}
