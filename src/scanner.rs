//! Scan orchestration: resolves roots, drives one walk (or one explicit
//! file list) per root, merges per-root results and reduces per-extractor
//! statuses.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info};

use crate::config::ScanConfig;
use crate::dispatch::{RunState, ScanContext};
use crate::error::{PkgscoutError, Result};
use crate::extractor::{Capabilities, Registry};
use crate::gitignore::{ancestor_patterns, is_ignored};
use crate::inventory::{PluginStatus, ScanOutcome, ScanResult};
use crate::path_utils::{normalize_separators, relative_to_root};
use crate::stats::{NoopStats, StatsCollector};
use crate::vfs::{FileSystem, OsFs};
use crate::walker::walk;

#[derive(Debug)]
enum RootFs {
    Os(OsFs),
    Virtual(Arc<dyn FileSystem>),
}

impl RootFs {
    fn as_fs(&self) -> &dyn FileSystem {
        match self {
            Self::Os(fs) => fs,
            Self::Virtual(fs) => fs.as_ref(),
        }
    }

    const fn capabilities(&self) -> Capabilities {
        match self {
            Self::Os(_) => Capabilities::host(),
            Self::Virtual(_) => Capabilities::virtual_root(),
        }
    }
}

#[derive(Debug)]
struct ScanRoot {
    label: String,
    fs: RootFs,
    /// Skip paths assigned to this root specifically (from absolute
    /// configuration entries).
    own_skip_dirs: HashSet<PathBuf>,
    /// Explicit files assigned to this root specifically.
    own_files: Vec<PathBuf>,
}

/// Drives a whole scan over one or more roots.
#[derive(Debug)]
pub struct Scanner {
    config: ScanConfig,
    skip_regex: Option<Regex>,
    roots: Vec<ScanRoot>,
    /// Skip paths given relative; they apply under every root.
    shared_skip_dirs: Vec<PathBuf>,
    /// Explicit files given relative; they apply under every root.
    shared_files: Vec<PathBuf>,
    cancel: Arc<AtomicBool>,
}

impl Scanner {
    /// Build a scanner from a validated config. All configuration errors —
    /// unresolvable roots, paths outside every root, bad regex — surface
    /// here, before any traversal.
    ///
    /// # Errors
    /// Returns config/IO errors; never starts walking.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let skip_regex = config.compile_skip_regex()?;

        let mut roots = Vec::new();
        for path in &config.roots {
            let base = path.canonicalize().map_err(|e| PkgscoutError::FileRead {
                path: path.clone(),
                source: e,
            })?;
            roots.push(ScanRoot {
                label: base.display().to_string(),
                fs: RootFs::Os(OsFs::new(base)),
                own_skip_dirs: HashSet::new(),
                own_files: Vec::new(),
            });
        }

        let mut scanner = Self {
            skip_regex,
            roots,
            shared_skip_dirs: Vec::new(),
            shared_files: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            config,
        };
        scanner.assign_configured_paths()?;
        Ok(scanner)
    }

    /// Add a virtual (in-memory) root. Extractors requiring direct
    /// filesystem access are filtered out for this root.
    pub fn add_virtual_root(&mut self, label: impl Into<String>, fs: Arc<dyn FileSystem>) {
        self.roots.push(ScanRoot {
            label: label.into(),
            fs: RootFs::Virtual(fs),
            own_skip_dirs: HashSet::new(),
            own_files: Vec::new(),
        });
    }

    /// Flag that cancels the scan at the next visited entry.
    #[must_use]
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Normalize configured skip-dirs and explicit files: absolute paths
    /// must fall under exactly one real root, relative paths apply under
    /// every root.
    fn assign_configured_paths(&mut self) -> Result<()> {
        let skip_dirs = self.config.skip_dirs.clone();
        for path in skip_dirs {
            match self.assign(&path)? {
                Assigned::Shared(rel) => self.shared_skip_dirs.push(rel),
                Assigned::Root(index, rel) => {
                    self.roots[index].own_skip_dirs.insert(rel);
                }
            }
        }
        let files = self.config.files_to_extract.clone();
        for path in files {
            match self.assign(&path)? {
                Assigned::Shared(rel) => self.shared_files.push(rel),
                Assigned::Root(index, rel) => self.roots[index].own_files.push(rel),
            }
        }
        Ok(())
    }

    fn assign(&self, path: &Path) -> Result<Assigned> {
        if !path.is_absolute() {
            return Ok(Assigned::Shared(normalize_separators(path)));
        }
        for (index, root) in self.roots.iter().enumerate() {
            if let RootFs::Os(fs) = &root.fs {
                if let Some(rel) = relative_to_root(fs.base(), path) {
                    return Ok(Assigned::Root(index, rel));
                }
            }
        }
        Err(PkgscoutError::PathNotUnderRoot {
            path: path.to_path_buf(),
        })
    }

    /// Run the scan with no stats collector.
    ///
    /// # Errors
    /// Returns fatal scan errors (budget, cancellation, unrecovered walk
    /// failures); per-extractor failures land in the statuses instead.
    pub fn run(&self, registry: &Registry) -> Result<ScanResult> {
        self.run_with(registry, &NoopStats)
    }

    /// Run the scan, reporting into `stats`.
    ///
    /// Roots are scanned in parallel (they are independent); results are
    /// merged in configuration order.
    ///
    /// # Errors
    /// Same as [`Scanner::run`].
    pub fn run_with(&self, registry: &Registry, stats: &dyn StatsCollector) -> Result<ScanResult> {
        if self.roots.is_empty() {
            return Err(PkgscoutError::Config(
                "no scan roots configured".to_string(),
            ));
        }
        let states: Vec<RunState> = self
            .roots
            .par_iter()
            .map(|root| self.scan_root(root, registry, stats))
            .collect::<Result<_>>()?;

        let mut inventory = Vec::new();
        let mut errors: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut found: IndexMap<String, bool> = IndexMap::new();
        for name in registry.names() {
            errors.insert(name.to_string(), Vec::new());
            found.insert(name.to_string(), false);
        }
        for mut state in states {
            inventory.append(&mut state.inventory);
            for (name, mut reasons) in state.errors {
                errors.entry(name).or_default().append(&mut reasons);
            }
            for (name, hit) in state.found {
                *found.entry(name).or_default() |= hit;
            }
        }

        let statuses = reduce_statuses(&errors, &found);
        info!(
            packages = inventory.len(),
            failed = statuses.iter().filter(|s| !s.outcome.is_success()).count(),
            "scan finished"
        );
        Ok(ScanResult {
            inventory,
            statuses,
        })
    }

    fn scan_root(
        &self,
        root: &ScanRoot,
        registry: &Registry,
        stats: &dyn StatsCollector,
    ) -> Result<RunState> {
        let extractors = registry.resolve_for(&root.fs.capabilities());
        let fs = root.fs.as_fs();

        let mut skip_dirs: HashSet<PathBuf> = root.own_skip_dirs.clone();
        skip_dirs.extend(self.shared_skip_dirs.iter().cloned());

        let mut explicit: Vec<PathBuf> = self.shared_files.clone();
        explicit.extend(root.own_files.iter().cloned());

        debug!(root = %root.label, extractors = extractors.len(), "scanning root");

        let mut ctx = ScanContext::new(
            fs,
            &extractors,
            &skip_dirs,
            self.skip_regex.as_ref(),
            self.config.read_symlinks,
            self.config.max_inodes,
            self.config.use_gitignore,
            &self.cancel,
            stats,
        );

        // The two traversal modes are mutually exclusive for the whole
        // scan: with any configured files, roots that were assigned none
        // perform zero visits instead of falling back to a full walk.
        if self.config.files_to_extract.is_empty() {
            walk(fs, Path::new(""), &mut ctx)?;
        } else {
            for path in &explicit {
                if self.config.use_gitignore {
                    let sets = ancestor_patterns(fs, path);
                    if is_ignored(&sets, path, false) {
                        continue;
                    }
                }
                ctx.process_explicit(path)?;
            }
        }
        Ok(ctx.into_state())
    }
}

enum Assigned {
    /// Relative path: applies under every root.
    Shared(PathBuf),
    /// Absolute path resolved against one real root.
    Root(usize, PathBuf),
}

/// Collapse the per-extractor error/found state into final statuses, one
/// per registered extractor, in registration order.
fn reduce_statuses(
    errors: &IndexMap<String, Vec<String>>,
    found: &IndexMap<String, bool>,
) -> Vec<PluginStatus> {
    errors
        .iter()
        .map(|(name, reasons)| PluginStatus {
            name: name.clone(),
            found_inventory: found.get(name).copied().unwrap_or(false),
            outcome: if reasons.is_empty() {
                ScanOutcome::Success
            } else {
                ScanOutcome::Failed {
                    reasons: reasons.clone(),
                }
            },
        })
        .collect()
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
