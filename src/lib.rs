pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extractor;
pub mod gitignore;
pub mod inventory;
pub mod output;
pub mod path_utils;
pub mod scanner;
pub mod stats;
pub mod vfs;
pub mod walker;

pub use error::{PkgscoutError, Result};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_EXTRACTOR_FAILURES: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
