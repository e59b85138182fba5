//! Path normalization utilities.
//!
//! Every path the plugin stores or compares goes through here, so that
//! `C:\site\src\a.hbs` and `C:/site/src/a.hbs` are the same key:
//! - `normalize_slashes` - backslashes to forward slashes
//! - `absolute_slash_path` - absolute + slash-normalized string form
//! - `dirname` / `basename` / `strip_extension` - string-level path splitting

use std::path::Path;

/// Replace every backslash with a forward slash.
///
/// # Example
/// ```ignore
/// assert_eq!(normalize_slashes(r"\Users\a\b.hbs"), "/Users/a/b.hbs");
/// ```
#[inline]
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Normalize a file system path to an absolute, slash-separated string.
///
/// Relative paths are joined with the current directory. No symlinks are
/// resolved, so deleted files keep the same key they had while they existed.
pub fn absolute_slash_path(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    };
    normalize_slashes(&absolute.to_string_lossy())
}

/// Directory part of a slash-separated path (`/a/b/c.hbs` -> `/a/b`).
///
/// Returns `""` for a bare file name and `"/"` for a file in the root.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// File name part of a slash-separated path (`/a/b/c.hbs` -> `c.hbs`).
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Remove the last extension of the file name (`/a/b.tpl.hbs` -> `/a/b.tpl`).
///
/// Dots inside directory names and leading dots of hidden files are kept.
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |pos| pos + 1);
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..name_start + dot],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slashes_windows() {
        assert_eq!(
            normalize_slashes(r"\Users\User\project\a.hbs"),
            "/Users/User/project/a.hbs"
        );
        assert_eq!(normalize_slashes("/already/unix"), "/already/unix");
    }

    #[test]
    fn test_absolute_slash_path_relative() {
        let abs = absolute_slash_path(Path::new("relative/path/file.hbs"));
        assert!(Path::new(&abs).is_absolute());
        assert!(abs.ends_with("relative/path/file.hbs"));
    }

    #[test]
    fn test_absolute_slash_path_keeps_absolute() {
        assert_eq!(absolute_slash_path(Path::new("/abs/file.hbs")), "/abs/file.hbs");
    }

    #[test]
    fn test_dirname_and_basename() {
        assert_eq!(dirname("/a/b/c.hbs"), "/a/b");
        assert_eq!(dirname("/c.hbs"), "/");
        assert_eq!(dirname("c.hbs"), "");
        assert_eq!(basename("/a/b/c.hbs"), "c.hbs");
        assert_eq!(basename("c.hbs"), "c.hbs");
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("/a/b/c.hbs"), "/a/b/c");
        assert_eq!(strip_extension("/a/b.d/c"), "/a/b.d/c");
        assert_eq!(strip_extension("/a/.hidden"), "/a/.hidden");
        assert_eq!(strip_extension("x.tpl.hbs"), "x.tpl");
    }
}
