//! Gitignore-format exclusion.
//!
//! Pattern files are parsed through the `ignore` crate, fed line by line so
//! they can come from any [`FileSystem`] (including virtual ones). A
//! candidate is excluded when any collected pattern set matches it.

use std::io::Read;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{PkgscoutError, Result};
use crate::vfs::FileSystem;

pub const GITIGNORE_FILE: &str = ".gitignore";

/// Parse gitignore-format `content` into a matcher anchored at `base_dir`
/// (scan-root relative). Comment and blank lines are dropped by the parser;
/// individually malformed lines are skipped the way git skips them.
///
/// # Errors
/// Returns an error if the combined pattern set cannot be built.
pub fn parse_patterns(base_dir: &Path, content: &str) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(base_dir);
    for line in content.lines() {
        let _ = builder.add_line(None, line);
    }
    builder
        .build()
        .map_err(|e| PkgscoutError::Config(format!("invalid gitignore patterns: {e}")))
}

/// Collect the pattern sets governing a candidate: one per ancestor from the
/// scan root down to (but excluding) the candidate itself, skipping ancestors
/// without a `.gitignore`, silently.
#[must_use]
pub fn ancestor_patterns(fs: &dyn FileSystem, path: &Path) -> Vec<Gitignore> {
    let mut sets = Vec::new();
    // ancestors() yields the candidate itself first and the scan root ("")
    // last; drop the candidate, then reverse to go root-downward.
    let mut ancestors: Vec<&Path> = path.ancestors().skip(1).collect();
    ancestors.reverse();

    for ancestor in ancestors {
        let gitignore_path = if ancestor.as_os_str().is_empty() {
            PathBuf::from(GITIGNORE_FILE)
        } else {
            ancestor.join(GITIGNORE_FILE)
        };
        let Ok(mut handle) = fs.open(&gitignore_path) else {
            continue;
        };
        let mut content = String::new();
        if handle.read_to_string(&mut content).is_err() {
            tracing::debug!(path = %gitignore_path.display(), "unreadable gitignore, skipping");
            continue;
        }
        match parse_patterns(ancestor, &content) {
            Ok(set) => sets.push(set),
            Err(e) => tracing::debug!(path = %gitignore_path.display(), error = %e, "bad gitignore, skipping"),
        }
    }
    sets
}

/// Whether the pattern sets exclude the candidate. `sets` must be ordered
/// scan-root first; deeper sets take precedence, so a nested `!pattern` can
/// re-include a file an ancestor excluded.
pub fn is_ignored<'a, I>(sets: I, path: &Path, is_dir: bool) -> bool
where
    I: IntoIterator<Item = &'a Gitignore>,
{
    let mut ignored = false;
    for set in sets {
        let matched = set.matched(path, is_dir);
        if matched.is_ignore() {
            ignored = true;
        } else if matched.is_whitelist() {
            ignored = false;
        }
    }
    ignored
}

#[cfg(test)]
#[path = "gitignore_tests.rs"]
mod tests;
