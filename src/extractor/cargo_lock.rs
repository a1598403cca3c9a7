//! `Cargo.lock` extractor.

use std::path::Path;

use serde::Deserialize;

use super::{file_name_is, ExtractError, Extractor, LazyStat, ScanInput};
use crate::inventory::Package;

pub struct CargoLockExtractor;

#[derive(Deserialize)]
struct CargoLockFile {
    #[serde(default)]
    package: Vec<CargoPackage>,
}

#[derive(Deserialize)]
struct CargoPackage {
    name: String,
    version: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    checksum: Option<String>,
}

impl Extractor for CargoLockExtractor {
    fn name(&self) -> &'static str {
        "rust/cargo-lock"
    }

    fn file_required(&self, path: &Path, _stat: &LazyStat<'_>) -> bool {
        file_name_is(path, "Cargo.lock")
    }

    fn extract(&self, input: &mut ScanInput<'_>) -> Result<Vec<Package>, ExtractError> {
        let content = input.read_to_string()?;
        let lock: CargoLockFile = toml::from_str(&content)?;

        let packages = lock
            .package
            .into_iter()
            .map(|pkg| {
                let mut record = Package::new(pkg.name, pkg.version);
                if pkg.source.is_some() || pkg.checksum.is_some() {
                    record = record.with_metadata(serde_json::json!({
                        "source": pkg.source,
                        "checksum": pkg.checksum,
                    }));
                }
                record
            })
            .collect();
        Ok(packages)
    }
}

#[cfg(test)]
#[path = "cargo_lock_tests.rs"]
mod tests;
