//! `requirements.txt` extractor.
//!
//! Only exactly-pinned requirements (`name==version`) carry inventory;
//! ranges and bare names are skipped. Comments, pip options and environment
//! markers are stripped.

use std::path::Path;

use super::{ExtractError, Extractor, LazyStat, ScanInput};
use crate::inventory::Package;

pub struct RequirementsTxtExtractor;

fn is_requirements_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            name == "requirements.txt"
                || (name.ends_with(".txt") && name.starts_with("requirements-"))
        })
}

/// Parse one logical requirement line into `(name, version)`.
fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }
    // Environment markers follow a semicolon.
    let spec = line.split(';').next().unwrap_or("").trim();
    let (name_part, version) = spec.split_once("==")?;
    // Extras like `name[extra]` are not part of the package name.
    let name = name_part.split('[').next().unwrap_or("").trim();
    let version = version.trim();
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name.to_string(), version.to_string()))
}

impl Extractor for RequirementsTxtExtractor {
    fn name(&self) -> &'static str {
        "python/requirements"
    }

    fn file_required(&self, path: &Path, _stat: &LazyStat<'_>) -> bool {
        is_requirements_file(path)
    }

    fn extract(&self, input: &mut ScanInput<'_>) -> Result<Vec<Package>, ExtractError> {
        let content = input.read_to_string()?;

        let mut packages = Vec::new();
        let mut pending = String::new();
        for raw in content.lines() {
            // Backslash continuations join into one logical line.
            if let Some(stripped) = raw.trim_end().strip_suffix('\\') {
                pending.push_str(stripped);
                continue;
            }
            pending.push_str(raw);
            if let Some((name, version)) = parse_line(&pending) {
                packages.push(Package::new(name, version));
            }
            pending.clear();
        }
        if let Some((name, version)) = parse_line(&pending) {
            packages.push(Package::new(name, version));
        }
        Ok(packages)
    }
}

#[cfg(test)]
#[path = "requirements_txt_tests.rs"]
mod tests;
