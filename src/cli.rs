use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Color output control
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal capability
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser, Debug)]
#[command(name = "pkgscout")]
#[command(author, version, about = "Filesystem inventory scanner - find packages in lockfiles and manifests")]
#[command(long_about = "Walks a directory tree once and offers every file to a set of \
    pluggable extractors (Cargo.lock, package-lock.json, requirements.txt, ...).\n\n\
    Exit codes:\n  \
    0 - Scan completed, all extractors succeeded\n  \
    1 - Scan completed, at least one extractor reported errors\n  \
    2 - Configuration or runtime error")]
pub struct Cli {
    /// Increase output verbosity (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Control color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan one or more directory trees for package inventory
    Scan(ScanArgs),

    /// List the registered extractors
    ListPlugins,
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Scan roots (directories)
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Extract only these files; no directory walking happens at all
    /// (can be specified multiple times)
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Skip this directory subtree (exact path, can be specified multiple times)
    #[arg(long = "skip-dir", short = 'x')]
    pub skip_dirs: Vec<PathBuf>,

    /// Skip directories whose relative path matches this regex
    #[arg(long)]
    pub skip_regex: Option<String>,

    /// Abort after visiting this many filesystem entries (0 = unlimited)
    #[arg(long)]
    pub max_inodes: Option<u64>,

    /// Offer symlinked files to extractors instead of ignoring them
    #[arg(long)]
    pub read_symlinks: bool,

    /// Honor .gitignore files found in the scanned tree
    #[arg(long)]
    pub gitignore: bool,

    /// Output format [possible values: text, json]
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
