use std::path::{Path, PathBuf};

/// Normalize a user-supplied path to be relative to `root`.
///
/// Accepts absolute paths under `root`, paths already relative to `root`,
/// and either `/` or `\` separators. Returns `None` if the path does not
/// fall under the root.
#[must_use]
pub fn relative_to_root(root: &Path, path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        return path.strip_prefix(root).ok().map(Path::to_path_buf);
    }
    Some(normalize_separators(path))
}

/// Rebuild a path with native components, treating both `/` and `\` in any
/// textual component as separators.
#[must_use]
pub fn normalize_separators(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        let text = component.as_os_str().to_string_lossy();
        for segment in text.split(['/', '\\']).filter(|s| !s.is_empty()) {
            out.push(segment);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_stays_relative() {
        let rel = relative_to_root(Path::new("/base"), Path::new("sub/file.lock")).unwrap();
        assert_eq!(rel, PathBuf::from("sub/file.lock"));
    }

    #[test]
    fn absolute_path_under_root_is_stripped() {
        let rel = relative_to_root(Path::new("/base"), Path::new("/base/sub/file.lock")).unwrap();
        assert_eq!(rel, PathBuf::from("sub/file.lock"));
    }

    #[test]
    fn absolute_path_outside_root_is_rejected() {
        assert!(relative_to_root(Path::new("/base"), Path::new("/other/file.lock")).is_none());
    }

    #[test]
    fn backslash_separators_are_normalized() {
        let rel = relative_to_root(Path::new("/base"), Path::new("sub\\file.lock")).unwrap();
        assert_eq!(rel, PathBuf::from("sub/file.lock"));
    }

}
