use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PkgscoutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid skip pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Inode budget of {limit} exceeded after visiting {visited} entries")]
    InodeLimit { limit: u64, visited: u64 },

    #[error("Path {path} is not under any configured scan root")]
    PathNotUnderRoot { path: PathBuf },

    #[error("Scan cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, PkgscoutError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
