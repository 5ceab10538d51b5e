//! This module is semver exempt and its contents could change at any time.

use std::path::Path;

/// Whether `path`'s final component is exactly `basename`.
#[must_use]
pub fn has_basename(path: &Path, basename: &str) -> bool {
    path.file_name().is_some_and(|name| name == basename)
}

/// Whether `path`'s final component ends with `suffix`.
///
/// Unlike [`Path::extension`], this matches multi-dot suffixes such as
/// `go.mod` handed in as a full basename, and bare extensions like `.go`.
#[must_use]
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

#[cfg(test)]
mod test {
    use super::{has_basename, has_suffix};
    use std::path::Path;

    #[test]
    fn suffixes() {
        const TESTS: &[(&str, &str, bool)] = &[
            ("a/b/foo.go", ".go", true),
            ("a/b/foo.go.txt", ".go", false),
            ("a/b/go.mod", "go.mod", true),
            ("a/b/no_go.mod", "go.mod", true),
            ("go.mod", "go.mod", true),
            ("a/b/BUILD.bazel", ".bazel", true),
        ];
        for &(path, suffix, expected) in TESTS {
            assert_eq!(expected, has_suffix(Path::new(path), suffix), "{path:?}");
        }
    }

    #[test]
    fn basenames() {
        assert!(has_basename(Path::new("x/BUILD.bazel"), "BUILD.bazel"));
        assert!(!has_basename(Path::new("x/BUILD.bazel.old"), "BUILD.bazel"));
    }
}
