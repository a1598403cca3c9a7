//! `package-lock.json` (v2/v3) extractor.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::{file_name_is, ExtractError, Extractor, LazyStat, ScanInput};
use crate::inventory::Package;

/// Lockfiles larger than this are implausible and skipped up front; size
/// ceilings are each extractor's own call, enforced in `file_required`.
const MAX_LOCKFILE_SIZE: u64 = 64 * 1024 * 1024;

pub struct NpmLockExtractor;

#[derive(Deserialize)]
struct NpmLockFile {
    #[serde(default)]
    packages: HashMap<String, NpmPackageEntry>,
}

#[derive(Deserialize)]
struct NpmPackageEntry {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    integrity: Option<String>,
    #[serde(default)]
    dev: Option<bool>,
}

/// `packages` keys look like `node_modules/@scope/name`; the package name
/// is everything after the last `node_modules/`.
fn package_name(key: &str) -> &str {
    key.rsplit_once("node_modules/").map_or(key, |(_, name)| name)
}

impl Extractor for NpmLockExtractor {
    fn name(&self) -> &'static str {
        "javascript/package-lock"
    }

    fn file_required(&self, path: &Path, stat: &LazyStat<'_>) -> bool {
        file_name_is(path, "package-lock.json")
            && stat.get().is_none_or(|info| info.size <= MAX_LOCKFILE_SIZE)
    }

    fn extract(&self, input: &mut ScanInput<'_>) -> Result<Vec<Package>, ExtractError> {
        let content = input.read_to_string()?;
        let lock: NpmLockFile = serde_json::from_str(&content)?;

        let mut packages = Vec::new();
        for (key, entry) in &lock.packages {
            // The root package has an empty key; entries without a version
            // (e.g. link targets) carry no inventory.
            if key.is_empty() {
                continue;
            }
            let Some(version) = &entry.version else {
                continue;
            };
            let mut record = Package::new(package_name(key), version.clone());
            if entry.integrity.is_some() || entry.dev.is_some() {
                record = record.with_metadata(serde_json::json!({
                    "integrity": entry.integrity,
                    "dev": entry.dev.unwrap_or(false),
                }));
            }
            packages.push(record);
        }
        Ok(packages)
    }
}

#[cfg(test)]
#[path = "npm_lock_tests.rs"]
mod tests;
