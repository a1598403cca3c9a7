//! Optional run-metrics hook.
//!
//! The engine reports into a [`StatsCollector`] passed explicitly through
//! every call; "no collector configured" is the [`NoopStats`] null object,
//! never an `Option` check inside the engine.

use std::path::Path;
use std::time::Duration;

pub trait StatsCollector: Send + Sync {
    /// Called once per filesystem entry the walk visits.
    fn after_inode_visited(&self, _path: &Path) {}

    /// Called after every `extract` invocation.
    fn after_extract(&self, _extractor: &str, _path: &Path, _elapsed: Duration, _ok: bool) {}
}

/// Collector that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStats;

impl StatsCollector for NoopStats {}
