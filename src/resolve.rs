//! Output path resolution for entry templates.
//!
//! Pure functions, no filesystem access:
//!
//! ```text
//! source:   /site/src/entries/blog/post.hbs
//! entry:    /site/src/entries/**/*.hbs      → root folder "entries"
//! output:   /site/dist/[path]/[name].html
//! target:   /site/dist/blog/post.html
//! ```
//!
//! All inputs are slash-normalized first, so Windows-style paths resolve to
//! the same targets as their unix spelling.

use crate::utils::path::{basename, dirname, normalize_slashes, strip_extension};

/// Token replaced by the entry's folder relative to its root folder.
pub const PATH_TOKEN: &str = "[path]";
/// Token replaced by the entry's file name without extension.
pub const NAME_TOKEN: &str = "[name]";

/// Characters that start a wildcard in glob patterns.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Where an entry file belongs relative to the configured entry pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootFolder {
    /// Logical root folder name (second-to-last segment of the pattern's static prefix).
    Folder(String),
    /// The file lives inside a partials tree and must not be emitted.
    Ignored,
}

/// Compute the output path of an entry template.
///
/// Without an output template the source path is returned with its extension
/// stripped. Otherwise `[path]` is replaced by the part of the source's
/// directory that follows `root_path` (default: the source's own directory)
/// and `[name]` by the source's file name without extension.
pub fn compute_target_path(
    source_path: &str,
    output_template: Option<&str>,
    root_path: Option<&str>,
) -> String {
    let source = normalize_slashes(source_path);

    let Some(template) = output_template else {
        return strip_extension(&source).to_string();
    };

    let template = normalize_slashes(template);
    let directory = dirname(&source);
    let root = root_path
        .map(normalize_slashes)
        .unwrap_or_else(|| directory.to_string());

    let folder = relative_folder(directory, &root);
    let name = strip_extension(basename(&source));

    let target = template.replace(PATH_TOKEN, folder).replace(NAME_TOKEN, name);
    collapse_slashes(&target)
}

/// Infer the logical root folder of an entry file.
///
/// The static prefix of `entry_pattern` (everything before the first wildcard)
/// names the root folder by its second-to-last segment:
/// `src/entries/**/*.hbs` → `entries`.
///
/// A source whose directory holds a partials folder name at the same segment
/// position as that partial pattern's wildcard parent is reported as
/// [`RootFolder::Ignored`].
pub fn infer_root_folder(
    source_path: &str,
    entry_pattern: &str,
    partial_patterns: &[String],
) -> RootFolder {
    let source = normalize_slashes(source_path);
    let source_segments: Vec<&str> = dirname(&source).split('/').collect();

    for pattern in partial_patterns {
        let Some((position, folder)) = wildcard_parent(pattern) else {
            continue;
        };
        if source_segments.get(position) == Some(&folder.as_str()) {
            return RootFolder::Ignored;
        }
    }

    let folder = wildcard_parent(entry_pattern)
        .map(|(_, folder)| folder)
        .unwrap_or_default();
    RootFolder::Folder(folder)
}

/// Static prefix of a glob pattern (everything before the first wildcard).
pub fn static_prefix(pattern: &str) -> &str {
    match pattern.find(GLOB_META) {
        Some(pos) => &pattern[..pos],
        None => pattern,
    }
}

/// Position and name of the folder directly holding a pattern's wildcard part.
fn wildcard_parent(pattern: &str) -> Option<(usize, String)> {
    let pattern = normalize_slashes(pattern);
    let segments: Vec<&str> = static_prefix(&pattern).split('/').collect();
    if segments.len() < 2 {
        return None;
    }

    let position = segments.len() - 2;
    let folder = segments[position];
    (!folder.is_empty()).then(|| (position, folder.to_string()))
}

/// The part of `directory` that follows `root`, aligned on path segments.
///
/// `root` may be a full path (`/a/b`) or a bare folder name (`entries`).
/// Returns `""` when the root does not occur in the directory.
fn relative_folder<'a>(directory: &'a str, root: &str) -> &'a str {
    let root = root.trim_end_matches('/');
    if root.is_empty() || directory == root {
        return "";
    }

    for (index, _) in directory.match_indices(root) {
        let end = index + root.len();
        let starts_segment =
            index == 0 || root.starts_with('/') || directory.as_bytes()[index - 1] == b'/';
        let ends_segment = end == directory.len() || directory.as_bytes()[end] == b'/';
        if starts_segment && ends_segment {
            return &directory[end..];
        }
    }

    ""
}

/// Collapse runs of `/` produced by substituting empty folders.
fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for ch in path.chars() {
        if ch == '/' && previous_slash {
            continue;
        }
        previous_slash = ch == '/';
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "/Users/User/project/app/src/nested/partial.hbs";
    const ROOT: &str = "/Users/User/project/app/src/nested";

    #[test]
    fn test_strips_extension_without_template() {
        assert_eq!(
            compute_target_path(SOURCE, None, Some(ROOT)),
            "/Users/User/project/app/src/nested/partial"
        );
        assert_eq!(compute_target_path("/a/b/c/x.tpl", None, None), "/a/b/c/x");
    }

    #[test]
    fn test_template_without_tokens_is_returned() {
        assert_eq!(
            compute_target_path(SOURCE, Some("/Users/User/project/build/index.html"), Some(ROOT)),
            "/Users/User/project/build/index.html"
        );
    }

    #[test]
    fn test_name_token() {
        assert_eq!(
            compute_target_path(SOURCE, Some("/Users/User/project/build/[name].html"), Some(ROOT)),
            "/Users/User/project/build/partial.html"
        );
    }

    #[test]
    fn test_windows_paths_resolve_to_unix() {
        let result = compute_target_path(
            r"\Users\User\project\app\src\nested\partial.hbs",
            Some("/Users/User/project/build/[name].html"),
            Some(r"\Users\User\project\app\src\nested"),
        );
        assert_eq!(result, "/Users/User/project/build/partial.html");
    }

    #[test]
    fn test_path_token_relative_to_root() {
        assert_eq!(
            compute_target_path("/a/b/c/x.tpl", Some("[path]/[name].html"), Some("/a/b")),
            "/c/x.html"
        );
    }

    #[test]
    fn test_path_token_with_folder_name_root() {
        assert_eq!(
            compute_target_path(
                "/site/src/entries/blog/post.hbs",
                Some("/site/dist/[path]/[name].html"),
                Some("entries"),
            ),
            "/site/dist/blog/post.html"
        );
    }

    #[test]
    fn test_path_token_defaults_to_source_dir() {
        assert_eq!(
            compute_target_path("/site/src/index.hbs", Some("/dist/[path]/[name].html"), None),
            "/dist/index.html"
        );
    }

    #[test]
    fn test_root_matches_whole_segments_only() {
        // "entries" must not match inside "my-entries"
        assert_eq!(
            compute_target_path(
                "/my-entries/entries/a/x.hbs",
                Some("/out/[path]/[name].html"),
                Some("entries"),
            ),
            "/out/a/x.html"
        );
    }

    #[test]
    fn test_infer_root_folder_from_entry_pattern() {
        assert_eq!(
            infer_root_folder("/site/src/entries/a.hbs", "/site/src/entries/**/*.hbs", &[]),
            RootFolder::Folder("entries".into())
        );
    }

    #[test]
    fn test_infer_root_folder_windows_pattern() {
        assert_eq!(
            infer_root_folder(r"C:\site\src\a.hbs", r"C:\site\src\*.hbs", &[]),
            RootFolder::Folder("src".into())
        );
    }

    #[test]
    fn test_infer_root_folder_ignores_partials_tree() {
        let partials = vec!["/site/src/partials/**/*.hbs".to_string()];
        assert_eq!(
            infer_root_folder("/site/src/partials/header.hbs", "/site/src/**/*.hbs", &partials),
            RootFolder::Ignored
        );
        assert_eq!(
            infer_root_folder("/site/src/pages/index.hbs", "/site/src/**/*.hbs", &partials),
            RootFolder::Folder("src".into())
        );
    }

    #[test]
    fn test_static_prefix() {
        assert_eq!(static_prefix("src/entries/**/*.hbs"), "src/entries/");
        assert_eq!(static_prefix("src/page-?.hbs"), "src/page-");
        assert_eq!(static_prefix("src/index.hbs"), "src/index.hbs");
    }
}
