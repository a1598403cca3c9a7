//! The extractor plugin boundary.
//!
//! Every format parser implements [`Extractor`]: a cheap filename predicate
//! ([`Extractor::file_required`]) consulted for every visited file, and a
//! full parse ([`Extractor::extract`]) invoked at most once per
//! (file, extractor) pair. The engine has no knowledge of any format.

mod cargo_lock;
mod npm_lock;
mod registry;
mod requirements_txt;

pub use cargo_lock::CargoLockExtractor;
pub use npm_lock::NpmLockExtractor;
pub use registry::{default_registry, ExtractorFactory, Registry};
pub use requirements_txt::RequirementsTxtExtractor;

use std::cell::OnceCell;
use std::path::Path;

use thiserror::Error;

use crate::inventory::Package;
use crate::vfs::{FileInfo, FileSystem, ReadSeek};

/// Operating systems an extractor can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsKind {
    Linux,
    Macos,
    Windows,
}

impl OsKind {
    #[must_use]
    pub const fn current() -> Option<Self> {
        if cfg!(target_os = "linux") {
            Some(Self::Linux)
        } else if cfg!(target_os = "macos") {
            Some(Self::Macos)
        } else if cfg!(target_os = "windows") {
            Some(Self::Windows)
        } else {
            None
        }
    }
}

/// Environment prerequisites an extractor declares up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Needs a real on-disk filesystem (virtual roots won't do).
    pub direct_fs: bool,
    /// Only runs on a specific OS.
    pub os: Option<OsKind>,
}

/// What the current run can offer; extractors whose [`Requirements`] are not
/// satisfied are filtered out before the walk starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub direct_fs: bool,
    pub os: Option<OsKind>,
}

impl Capabilities {
    /// Capabilities of a scan over the host filesystem.
    #[must_use]
    pub const fn host() -> Self {
        Self {
            direct_fs: true,
            os: OsKind::current(),
        }
    }

    /// Capabilities of a scan over a virtual (in-memory) root.
    #[must_use]
    pub const fn virtual_root() -> Self {
        Self {
            direct_fs: false,
            os: None,
        }
    }

    #[must_use]
    pub fn satisfies(&self, req: &Requirements) -> bool {
        if req.direct_fs && !self.direct_fs {
            return false;
        }
        match req.os {
            None => true,
            Some(os) => self.os == Some(os),
        }
    }
}

/// Deferred, memoizing stat accessor handed to [`Extractor::file_required`].
///
/// Extractors that only look at the filename never pay the stat cost; the
/// first call to [`LazyStat::get`] computes and caches the result.
pub struct LazyStat<'a> {
    fs: Option<&'a dyn FileSystem>,
    path: &'a Path,
    cached: OnceCell<Option<FileInfo>>,
}

impl<'a> LazyStat<'a> {
    /// Stat lazily through `fs` on first access.
    #[must_use]
    pub const fn deferred(fs: &'a dyn FileSystem, path: &'a Path) -> Self {
        Self {
            fs: Some(fs),
            path,
            cached: OnceCell::new(),
        }
    }

    /// Pre-seeded with an already-known result (the walker has usually
    /// stat'd the entry already).
    #[must_use]
    pub fn seeded(path: &'a Path, info: FileInfo) -> Self {
        let cached = OnceCell::new();
        let _ = cached.set(Some(info));
        Self {
            fs: None,
            path,
            cached,
        }
    }

    /// The stat result, computed at most once. `None` if the stat failed.
    pub fn get(&self) -> Option<&FileInfo> {
        self.cached
            .get_or_init(|| self.fs.and_then(|fs| fs.stat(self.path).ok()))
            .as_ref()
    }
}

/// Error from a single `extract` call. May carry salvaged packages so an
/// extractor can report partial success; the dispatch keeps both the
/// packages and the error.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExtractError {
    pub message: String,
    pub partial: Vec<Package>,
}

impl ExtractError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            partial: Vec::new(),
        }
    }

    /// Attach packages that were successfully parsed before the failure.
    #[must_use]
    pub fn with_partial(mut self, partial: Vec<Package>) -> Self {
        self.partial = partial;
        self
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        Self::new(format!("read failed: {e}"))
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("invalid JSON: {e}"))
    }
}

impl From<toml::de::Error> for ExtractError {
    fn from(e: toml::de::Error) -> Self {
        Self::new(format!("invalid TOML: {e}"))
    }
}

/// Everything an extractor gets for one matched file.
///
/// The reader is opened by the engine, positioned at byte 0, and closed by
/// the engine after `extract` returns. `fs` allows opening sibling or
/// ancestor files relative to the scan root.
pub struct ScanInput<'a> {
    pub path: &'a Path,
    pub info: &'a FileInfo,
    pub reader: &'a mut dyn ReadSeek,
    pub fs: &'a dyn FileSystem,
}

impl ScanInput<'_> {
    /// Read the whole file as UTF-8.
    ///
    /// # Errors
    /// Returns an error if reading fails or the content is not UTF-8.
    pub fn read_to_string(&mut self) -> std::io::Result<String> {
        let mut buf = String::new();
        self.reader.read_to_string(&mut buf)?;
        Ok(buf)
    }
}

/// A pluggable format parser.
pub trait Extractor: Send + Sync {
    /// Stable identifier, used as the key in statuses and package records.
    fn name(&self) -> &'static str;

    /// Environment prerequisites; the default has none.
    fn requirements(&self) -> Requirements {
        Requirements::default()
    }

    /// Cheap, deterministic predicate deciding whether `extract` should run.
    /// Must not read file contents and must not block.
    fn file_required(&self, path: &Path, stat: &LazyStat<'_>) -> bool;

    /// Parse one matched file into packages.
    ///
    /// # Errors
    /// A failure here is recorded against this extractor only; it never
    /// aborts the scan. Use [`ExtractError::with_partial`] to keep records
    /// parsed before the failure.
    fn extract(&self, input: &mut ScanInput<'_>) -> Result<Vec<Package>, ExtractError>;
}

/// True when the path's final component equals `file_name`. The common
/// filename check shared by lockfile extractors.
#[must_use]
pub fn file_name_is(path: &Path, file_name: &str) -> bool {
    path.file_name().is_some_and(|n| n == file_name)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
