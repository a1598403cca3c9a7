//! Result types produced by a scan: packages, per-extractor statuses, and
//! the combined scan result.

use std::path::PathBuf;

use serde::Serialize;

/// Ecosystem-specific payload attached to a package. Opaque to the scan
/// engine; only the originating extractor and downstream consumers interpret
/// it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata(pub serde_json::Value);

impl Metadata {
    #[must_use]
    pub const fn none() -> Self {
        Self(serde_json::Value::Null)
    }
}

impl From<serde_json::Value> for Metadata {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// One finding emitted by an extractor.
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Paths (scan-root relative) this package was derived from.
    pub locations: Vec<PathBuf>,
    #[serde(skip_serializing_if = "metadata_is_null")]
    pub metadata: Metadata,
    /// Name of the extractor that produced this record.
    pub extractor: String,
}

fn metadata_is_null(metadata: &Metadata) -> bool {
    metadata.0.is_null()
}

impl Package {
    /// Convenience constructor for the common name+version case; the
    /// dispatch fills in `locations` and `extractor` when merging.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            locations: Vec::new(),
            metadata: Metadata::none(),
            extractor: String::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<Metadata>) -> Self {
        self.metadata = metadata.into();
        self
    }
}

/// Final outcome for one extractor over a whole scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanOutcome {
    Success,
    Failed { reasons: Vec<String> },
}

impl ScanOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Per-extractor status row reported next to the inventory.
#[derive(Debug, Clone, Serialize)]
pub struct PluginStatus {
    pub name: String,
    /// Whether this extractor produced at least one record. Reported
    /// alongside the outcome; it never flips success into failure.
    pub found_inventory: bool,
    #[serde(flatten)]
    pub outcome: ScanOutcome,
}

/// Everything a scan returns: the inventory plus one status per registered
/// extractor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    pub inventory: Vec<Package>,
    pub statuses: Vec<PluginStatus>,
}

impl ScanResult {
    /// True when no extractor recorded an error.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.statuses.iter().all(|s| s.outcome.is_success())
    }
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
