#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Creates an `assert_cmd` Command for the pkgscout binary.
#[macro_export]
macro_rules! pkgscout {
    () => {
        assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("pkgscout"))
    };
}

/// Creates a temporary directory with test fixtures for integration tests.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    /// Creates a new test fixture with an empty temp directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a file with the given content in the temp directory.
    pub fn create_file(&self, relative_path: &str, content: &str) {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    /// Creates a directory in the temp directory.
    pub fn create_dir(&self, relative_path: &str) {
        let path = self.dir.path().join(relative_path);
        fs::create_dir_all(&path).expect("Failed to create directory");
    }

    /// Returns the path to the temp directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates a pkgscout config file in the temp directory.
    pub fn create_config(&self, content: &str) {
        self.create_file("pkgscout.toml", content);
    }

    /// Creates a Cargo.lock with the given (name, version) packages.
    pub fn create_cargo_lock(&self, relative_path: &str, packages: &[(&str, &str)]) {
        let mut content = String::from("version = 3\n");
        for (name, version) in packages {
            content.push_str(&format!(
                "\n[[package]]\nname = \"{name}\"\nversion = \"{version}\"\n"
            ));
        }
        self.create_file(relative_path, &content);
    }

    /// Creates a requirements.txt with `==`-pinned entries.
    pub fn create_requirements(&self, relative_path: &str, packages: &[(&str, &str)]) {
        let content: String = packages
            .iter()
            .map(|(name, version)| format!("{name}=={version}\n"))
            .collect();
        self.create_file(relative_path, &content);
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal valid package-lock.json with one dependency.
pub const PACKAGE_LOCK_SINGLE_DEP: &str = r#"{
  "name": "fixture-app",
  "version": "1.0.0",
  "lockfileVersion": 3,
  "packages": {
    "": {
      "name": "fixture-app",
      "version": "1.0.0"
    },
    "node_modules/left-pad": {
      "version": "1.3.0",
      "integrity": "sha512-fixture"
    }
  }
}
"#;
