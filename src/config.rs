//! Scan configuration: loadable from TOML, overridable from the CLI.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PkgscoutError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Scan roots on the real filesystem. Virtual roots are added through
    /// the [`crate::scanner::Scanner`] API instead.
    pub roots: Vec<PathBuf>,

    /// When non-empty, only these files are stat'd and offered to
    /// extractors; no directory listing happens at all.
    pub files_to_extract: Vec<PathBuf>,

    /// Exact (root-relative) directory paths whose subtrees are skipped.
    pub skip_dirs: Vec<PathBuf>,

    /// Regex matched against root-relative directory paths; matches are
    /// skipped silently.
    pub skip_dir_regex: Option<String>,

    /// Offer symlinked files to extractors instead of ignoring them.
    pub read_symlinks: bool,

    /// Hard cap on filesystem entries visited per scan. Zero means
    /// unlimited; exceeding a positive budget aborts the scan.
    pub max_inodes: u64,

    /// Honor `.gitignore` files found between the scan root and each
    /// candidate.
    pub use_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            files_to_extract: Vec::new(),
            skip_dirs: Vec::new(),
            skip_dir_regex: None,
            read_symlinks: false,
            max_inodes: 0,
            use_gitignore: false,
        }
    }
}

impl ScanConfig {
    /// Load a config from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PkgscoutError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that don't need filesystem access. Root emptiness
    /// is not checked here: virtual roots can be added through the scanner
    /// API after loading a config.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if the skip regex does not compile.
    pub fn validate(&self) -> Result<()> {
        self.compile_skip_regex()?;
        Ok(())
    }

    /// Compile the skip regex, if configured.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if the regex does not compile.
    pub fn compile_skip_regex(&self) -> Result<Option<Regex>> {
        match &self.skip_dir_regex {
            None => Ok(None),
            Some(pattern) => Regex::new(pattern).map(Some).map_err(|e| {
                PkgscoutError::InvalidPattern {
                    pattern: pattern.clone(),
                    source: e,
                }
            }),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
