//! Extraction dispatch: the visitor that sits between the walker and the
//! extractors.
//!
//! Per visited entry: cancellation check, inode budget, directory skip
//! rules, then every extractor's `file_required` independently; each match
//! gets its own read handle and one `extract` call. Extractor failures are
//! recorded per extractor and never stop the walk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use ignore::gitignore::Gitignore;
use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{PkgscoutError, Result};
use crate::extractor::{Extractor, LazyStat, ScanInput};
use crate::gitignore::{is_ignored, parse_patterns, GITIGNORE_FILE};
use crate::inventory::Package;
use crate::stats::StatsCollector;
use crate::vfs::{EntryKind, FileInfo, FileSystem};
use crate::walker::{VisitFlow, Visitor};

/// Mutable per-root run state. Written only from the root's single walk
/// thread; read once after traversal to build the report.
#[derive(Debug, Default)]
pub struct RunState {
    pub inodes_visited: u64,
    pub extract_calls: u64,
    /// Discrete error reasons per extractor, appended in encounter order.
    pub errors: IndexMap<String, Vec<String>>,
    /// Whether each extractor produced at least one record.
    pub found: IndexMap<String, bool>,
    pub inventory: Vec<Package>,
}

impl RunState {
    fn for_extractors(extractors: &[Box<dyn Extractor>]) -> Self {
        let mut state = Self::default();
        for extractor in extractors {
            state.errors.insert(extractor.name().to_string(), Vec::new());
            state.found.insert(extractor.name().to_string(), false);
        }
        state
    }
}

/// Dispatch context for one scan root.
pub struct ScanContext<'a> {
    fs: &'a dyn FileSystem,
    extractors: &'a [Box<dyn Extractor>],
    skip_dirs: &'a HashSet<PathBuf>,
    skip_regex: Option<&'a Regex>,
    read_symlinks: bool,
    max_inodes: u64,
    use_gitignore: bool,
    cancel: &'a AtomicBool,
    stats: &'a dyn StatsCollector,
    /// One pattern set per ancestor directory that carries a `.gitignore`,
    /// pushed on entry and popped in post-visit.
    gitignore_stack: Vec<(PathBuf, Option<Gitignore>)>,
    state: RunState,
}

impl<'a> ScanContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fs: &'a dyn FileSystem,
        extractors: &'a [Box<dyn Extractor>],
        skip_dirs: &'a HashSet<PathBuf>,
        skip_regex: Option<&'a Regex>,
        read_symlinks: bool,
        max_inodes: u64,
        use_gitignore: bool,
        cancel: &'a AtomicBool,
        stats: &'a dyn StatsCollector,
    ) -> Self {
        Self {
            fs,
            extractors,
            skip_dirs,
            skip_regex,
            read_symlinks,
            max_inodes,
            use_gitignore,
            cancel,
            stats,
            gitignore_stack: Vec::new(),
            state: RunState::for_extractors(extractors),
        }
    }

    /// Take the accumulated state after the walk finished.
    #[must_use]
    pub fn into_state(self) -> RunState {
        self.state
    }

    /// Budget and cancellation gate, applied once per visited entry before
    /// any extractor filtering.
    fn account_entry(&mut self, path: &Path) -> Result<()> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(PkgscoutError::Cancelled);
        }
        self.state.inodes_visited += 1;
        self.stats.after_inode_visited(path);
        if self.max_inodes > 0 && self.state.inodes_visited > self.max_inodes {
            return Err(PkgscoutError::InodeLimit {
                limit: self.max_inodes,
                visited: self.state.inodes_visited,
            });
        }
        Ok(())
    }

    fn should_skip_dir(&self, path: &Path) -> bool {
        if self.skip_dirs.contains(path) {
            return true;
        }
        if let Some(regex) = self.skip_regex {
            let text = path.to_string_lossy().replace('\\', "/");
            if regex.is_match(&text) {
                return true;
            }
        }
        false
    }

    fn gitignored(&self, path: &Path, is_dir: bool) -> bool {
        if !self.use_gitignore {
            return false;
        }
        let sets = self.gitignore_stack.iter().filter_map(|(_, set)| set.as_ref());
        is_ignored(sets, path, is_dir)
    }

    /// On entering a directory, load its `.gitignore` (if any) so it governs
    /// everything beneath.
    fn push_gitignore(&mut self, dir: &Path) {
        if !self.use_gitignore {
            return;
        }
        let gitignore_path = if dir.as_os_str().is_empty() {
            PathBuf::from(GITIGNORE_FILE)
        } else {
            dir.join(GITIGNORE_FILE)
        };
        let set = read_patterns(self.fs, dir, &gitignore_path);
        self.gitignore_stack.push((dir.to_path_buf(), set));
    }

    fn pop_gitignore(&mut self, dir: &Path) {
        if self
            .gitignore_stack
            .last()
            .is_some_and(|(top, _)| top == dir)
        {
            self.gitignore_stack.pop();
        }
    }

    /// Offer one regular file to every extractor, independently; one open
    /// and at most one `extract` per matching extractor.
    fn dispatch_file(&mut self, path: &Path, info: &FileInfo) {
        let stat = LazyStat::seeded(path, info.clone());
        let extractors = self.extractors;
        for extractor in extractors {
            if extractor.file_required(path, &stat) {
                self.run_extractor(extractor.as_ref(), path, info);
            }
        }
    }

    fn run_extractor(&mut self, extractor: &dyn Extractor, path: &Path, info: &FileInfo) {
        let name = extractor.name();

        let mut reader = match self.fs.open(path) {
            Ok(reader) => reader,
            Err(e) => {
                self.record_error(name, format!("{}: open failed: {e}", path.display()));
                return;
            }
        };

        let started = Instant::now();
        self.state.extract_calls += 1;
        let mut input = ScanInput {
            path,
            info,
            reader: &mut *reader,
            fs: self.fs,
        };
        let outcome = extractor.extract(&mut input);
        self.stats
            .after_extract(name, path, started.elapsed(), outcome.is_ok());

        match outcome {
            Ok(packages) => self.merge(name, path, packages),
            Err(err) => {
                // Partial success: salvage what the extractor parsed before
                // failing, and record the failure.
                let message = format!("{}: {err}", path.display());
                self.merge(name, path, err.partial);
                self.record_error(name, message);
            }
        }
    }

    fn merge(&mut self, extractor: &str, path: &Path, packages: Vec<Package>) {
        if packages.is_empty() {
            return;
        }
        *self.state.found.entry(extractor.to_string()).or_default() = true;
        for mut package in packages {
            package.extractor = extractor.to_string();
            if !package.locations.iter().any(|loc| loc == path) {
                package.locations.push(path.to_path_buf());
            }
            self.state.inventory.push(package);
        }
    }

    fn record_error(&mut self, extractor: &str, message: String) {
        self.state
            .errors
            .entry(extractor.to_string())
            .or_default()
            .push(message);
    }

    fn visit_symlink(&mut self, path: &Path) {
        if !self.read_symlinks {
            return;
        }
        // The target stat is deferred: a symlink no predicate matches is
        // never resolved. A symlinked file becomes a candidate, a symlinked
        // directory is still never descended into.
        let stat = LazyStat::deferred(self.fs, path);
        let extractors = self.extractors;
        for extractor in extractors {
            if !extractor.file_required(path, &stat) {
                continue;
            }
            match stat.get() {
                Some(target) if target.kind.is_file() => {
                    let info = target.clone();
                    self.run_extractor(extractor.as_ref(), path, &info);
                }
                Some(_) => {}
                None => debug!(path = %path.display(), "dangling symlink"),
            }
        }
    }

    /// Explicit-file mode: stat one pre-enumerated path directly and offer
    /// it to the extractors, without any directory listing.
    pub fn process_explicit(&mut self, path: &Path) -> Result<()> {
        self.account_entry(path)?;
        let info = match self.fs.symlink_stat(path) {
            Ok(info) => info,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat explicit file");
                return Ok(());
            }
        };
        match info.kind {
            EntryKind::File => self.dispatch_file(path, &info),
            EntryKind::Symlink => self.visit_symlink(path),
            EntryKind::Dir | EntryKind::Other => {
                debug!(path = %path.display(), "explicit path is not a regular file");
            }
        }
        Ok(())
    }
}

fn read_patterns(fs: &dyn FileSystem, dir: &Path, gitignore_path: &Path) -> Option<Gitignore> {
    use std::io::Read;

    let mut handle = fs.open(gitignore_path).ok()?;
    let mut content = String::new();
    handle.read_to_string(&mut content).ok()?;
    match parse_patterns(dir, &content) {
        Ok(set) => Some(set),
        Err(e) => {
            debug!(path = %gitignore_path.display(), error = %e, "bad gitignore, skipping");
            None
        }
    }
}

impl Visitor for ScanContext<'_> {
    fn visit(
        &mut self,
        path: &Path,
        info: Option<&FileInfo>,
        err: Option<&std::io::Error>,
    ) -> Result<VisitFlow> {
        if let Some(err) = err {
            // A single directory's listing (or a child's stat) failed.
            // Permission errors are expected on real filesystems; everything
            // else is loggable but non-fatal.
            if err.kind() == std::io::ErrorKind::PermissionDenied {
                debug!(path = %path.display(), "permission denied, skipping");
            } else {
                warn!(path = %path.display(), error = %err, "read error, skipping");
            }
            return Ok(VisitFlow::SkipDir);
        }
        let Some(info) = info else {
            return Ok(VisitFlow::Continue);
        };

        // Skipped directories are entirely absent from the inode counter,
        // so the skip check comes before accounting.
        if info.kind.is_dir()
            && !path.as_os_str().is_empty()
            && (self.should_skip_dir(path) || self.gitignored(path, true))
        {
            return Ok(VisitFlow::SkipDir);
        }

        self.account_entry(path)?;

        match info.kind {
            EntryKind::Dir => {
                self.push_gitignore(path);
                Ok(VisitFlow::Continue)
            }
            EntryKind::File => {
                if !self.gitignored(path, false) {
                    self.dispatch_file(path, info);
                }
                Ok(VisitFlow::Continue)
            }
            EntryKind::Symlink => {
                self.visit_symlink(path);
                Ok(VisitFlow::Continue)
            }
            EntryKind::Other => Ok(VisitFlow::Continue),
        }
    }

    fn post_visit(&mut self, path: &Path, _info: &FileInfo) {
        self.pop_gitignore(path);
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
