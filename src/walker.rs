//! Single-pass depth-first traversal over a [`FileSystem`].
//!
//! The walker visits the root and every descendant exactly once, in the
//! backing store's native listing order, holding only the current directory's
//! listing in memory (O(depth), not O(file count)). Child symlinks are never
//! followed; a symlink root is resolved to its target.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::vfs::{FileInfo, FileSystem};

/// Signal returned by a visitor for each entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitFlow {
    /// Keep walking.
    Continue,
    /// Do not descend into this directory (or the rest of its parent's
    /// entries when returned for a file).
    SkipDir,
    /// End the whole walk now, successfully.
    SkipAll,
}

/// Callback pair driving a walk.
///
/// `visit` is called once per entry. When listing a directory's children
/// fails, `visit` is called a second time for that directory with the error
/// set; returning any flow recovers (the subtree is skipped), while
/// returning an error aborts the walk. `post_visit` fires after a
/// directory's subtree has finished, including when the subtree was skipped
/// or its listing failed.
pub trait Visitor {
    /// Visit one entry.
    ///
    /// # Errors
    /// Any error aborts the walk and is returned to the caller verbatim.
    fn visit(
        &mut self,
        path: &Path,
        info: Option<&FileInfo>,
        err: Option<&std::io::Error>,
    ) -> Result<VisitFlow>;

    /// Post-order hook for directories.
    fn post_visit(&mut self, _path: &Path, _info: &FileInfo) {}
}

/// Walk `root` and every descendant, invoking `visitor` per entry.
///
/// # Errors
/// Propagates any error the visitor returns, verbatim.
pub fn walk(fs: &dyn FileSystem, root: &Path, visitor: &mut dyn Visitor) -> Result<()> {
    // A plain stat so a symlink root is walked through to its target.
    let info = match fs.stat(root) {
        Ok(info) => info,
        Err(e) => {
            visitor.visit(root, None, Some(&e))?;
            return Ok(());
        }
    };

    match visitor.visit(root, Some(&info), None)? {
        VisitFlow::SkipAll => return Ok(()),
        VisitFlow::SkipDir => {
            if info.kind.is_dir() {
                visitor.post_visit(root, &info);
            }
            return Ok(());
        }
        VisitFlow::Continue => {}
    }

    if info.kind.is_dir() {
        walk_dir(fs, root, &info, visitor)?;
    }
    Ok(())
}

/// Returns `false` when the walk should end (`SkipAll`).
fn walk_dir(
    fs: &dyn FileSystem,
    path: &Path,
    info: &FileInfo,
    visitor: &mut dyn Visitor,
) -> Result<bool> {
    let children = match fs.read_dir(path) {
        Ok(children) => children,
        Err(e) => {
            // Second visit for the same directory, carrying the error.
            let flow = visitor.visit(path, Some(info), Some(&e))?;
            visitor.post_visit(path, info);
            return Ok(flow != VisitFlow::SkipAll);
        }
    };

    for child in children {
        let child_path = join_child(path, &child.name);
        // No-follow stat: symlinked children are reported as symlinks and
        // never descended into.
        let child_info = match fs.symlink_stat(&child_path) {
            Ok(child_info) => child_info,
            Err(e) => {
                if visitor.visit(&child_path, None, Some(&e))? == VisitFlow::SkipAll {
                    return Ok(false);
                }
                continue;
            }
        };

        match visitor.visit(&child_path, Some(&child_info), None)? {
            VisitFlow::SkipAll => return Ok(false),
            VisitFlow::SkipDir => {
                if child_info.kind.is_dir() {
                    visitor.post_visit(&child_path, &child_info);
                    continue;
                }
                // For a file, skip the rest of this directory's entries.
                break;
            }
            VisitFlow::Continue => {
                if child_info.kind.is_dir() && !walk_dir(fs, &child_path, &child_info, visitor)? {
                    return Ok(false);
                }
            }
        }
    }

    visitor.post_visit(path, info);
    Ok(true)
}

fn join_child(parent: &Path, name: &str) -> PathBuf {
    if parent.as_os_str().is_empty() {
        PathBuf::from(name)
    } else {
        parent.join(name)
    }
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
