//! Filesystem abstraction the scan engine walks over.
//!
//! All paths crossing this trait are relative to the scan root; the root
//! itself is the empty path. [`OsFs`] backs a scan with a real directory,
//! [`MemFs`] backs virtual roots and tests.

use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use indexmap::{IndexMap, IndexSet};

/// Read handle returned by [`FileSystem::open`].
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

impl std::fmt::Debug for dyn ReadSeek + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ReadSeek")
    }
}

impl std::fmt::Debug for dyn FileSystem + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FileSystem")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other,
}

impl EntryKind {
    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Dir)
    }

    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// One child of a directory listing. `name` is a single path component.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Trait for filesystem operations (real or virtual).
///
/// Listing order is whatever the backing store yields natively; callers
/// must not rely on it being sorted.
pub trait FileSystem: Send + Sync {
    /// Open a file for reading, positioned at the start.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    fn open(&self, path: &Path) -> std::io::Result<Box<dyn ReadSeek>>;

    /// List the immediate children of a directory.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read.
    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<DirEntry>>;

    /// Stat a path, following symlinks.
    ///
    /// # Errors
    /// Returns an error if the path cannot be stat'd.
    fn stat(&self, path: &Path) -> std::io::Result<FileInfo>;

    /// Stat a path without following symlinks.
    ///
    /// # Errors
    /// Returns an error if the path cannot be stat'd.
    fn symlink_stat(&self, path: &Path) -> std::io::Result<FileInfo>;
}

fn kind_of(ft: std::fs::FileType) -> EntryKind {
    if ft.is_dir() {
        EntryKind::Dir
    } else if ft.is_file() {
        EntryKind::File
    } else if ft.is_symlink() {
        EntryKind::Symlink
    } else {
        EntryKind::Other
    }
}

fn info_of(meta: &std::fs::Metadata) -> FileInfo {
    FileInfo {
        kind: kind_of(meta.file_type()),
        size: meta.len(),
        modified: meta.modified().ok(),
    }
}

/// Real filesystem rooted at an absolute base directory.
#[derive(Debug, Clone)]
pub struct OsFs {
    base: PathBuf,
}

impl OsFs {
    #[must_use]
    pub const fn new(base: PathBuf) -> Self {
        Self { base }
    }

    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.as_os_str().is_empty() {
            self.base.clone()
        } else {
            self.base.join(path)
        }
    }
}

impl FileSystem for OsFs {
    fn open(&self, path: &Path) -> std::io::Result<Box<dyn ReadSeek>> {
        let file = std::fs::File::open(self.resolve(path))?;
        Ok(Box::new(file))
    }

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<DirEntry>> {
        let mut children = Vec::new();
        for entry in std::fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            // file_type() does not follow symlinks, so symlinked children
            // surface as EntryKind::Symlink.
            let kind = kind_of(entry.file_type()?);
            children.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(children)
    }

    fn stat(&self, path: &Path) -> std::io::Result<FileInfo> {
        std::fs::metadata(self.resolve(path)).map(|m| info_of(&m))
    }

    fn symlink_stat(&self, path: &Path) -> std::io::Result<FileInfo> {
        std::fs::symlink_metadata(self.resolve(path)).map(|m| info_of(&m))
    }
}

/// In-memory filesystem for virtual scan roots and tests.
///
/// Directories are inferred from file paths; empty directories can be added
/// explicitly. Listing order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemFs {
    files: IndexMap<PathBuf, Vec<u8>>,
    dirs: IndexSet<PathBuf>,
}

impl MemFs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating implied parent directories.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> &mut Self {
        let path = path.into();
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() {
                self.dirs.insert(ancestor.to_path_buf());
            }
        }
        self.files.insert(path, content.into());
        self
    }

    /// Add an (empty) directory.
    pub fn add_dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        let path = path.into();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                self.dirs.insert(ancestor.to_path_buf());
            }
        }
        self
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || self.dirs.contains(path)
    }

    fn not_found(path: &Path) -> std::io::Error {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no such path: {}", path.display()),
        )
    }
}

impl FileSystem for MemFs {
    fn open(&self, path: &Path) -> std::io::Result<Box<dyn ReadSeek>> {
        let content = self.files.get(path).ok_or_else(|| Self::not_found(path))?;
        Ok(Box::new(Cursor::new(content.clone())))
    }

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<DirEntry>> {
        if !self.is_dir(path) {
            return Err(Self::not_found(path));
        }
        let mut seen = IndexSet::new();
        let mut children = Vec::new();
        let mut push = |name: String, kind: EntryKind| {
            if seen.insert(name.clone()) {
                children.push(DirEntry { name, kind });
            }
        };
        for dir in &self.dirs {
            if dir.parent().is_some_and(|p| p == path) {
                if let Some(name) = dir.file_name() {
                    push(name.to_string_lossy().into_owned(), EntryKind::Dir);
                }
            }
        }
        for file in self.files.keys() {
            if file.parent().is_some_and(|p| p == path) {
                if let Some(name) = file.file_name() {
                    push(name.to_string_lossy().into_owned(), EntryKind::File);
                }
            }
        }
        Ok(children)
    }

    fn stat(&self, path: &Path) -> std::io::Result<FileInfo> {
        if let Some(content) = self.files.get(path) {
            return Ok(FileInfo {
                kind: EntryKind::File,
                size: content.len() as u64,
                modified: None,
            });
        }
        if self.is_dir(path) {
            return Ok(FileInfo {
                kind: EntryKind::Dir,
                size: 0,
                modified: None,
            });
        }
        Err(Self::not_found(path))
    }

    fn symlink_stat(&self, path: &Path) -> std::io::Result<FileInfo> {
        // MemFs has no symlinks, so the no-follow stat is the plain stat.
        self.stat(path)
    }
}

#[cfg(test)]
#[path = "vfs_tests.rs"]
mod tests;
