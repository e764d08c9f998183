//! Path utilities
//!
//! Relative paths shown in separators always use '/' as separator.

use std::path::{Component, Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to a base directory.
///
/// A leading `./` on either side is ignored, so `./x.txt` against `.` gives `x.txt`.
pub fn make_relative(path: &Path, base: &Path) -> Option<String> {
    let path = strip_cur_dir(path);
    let base = strip_cur_dir(base);
    path.strip_prefix(base).ok().map(normalize_path)
}

fn strip_cur_dir(path: &Path) -> &Path {
    path.strip_prefix(".").unwrap_or(path)
}

/// Directory that pattern-mode matches are made relative to
pub fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Directory below which a glob pattern's matches are checked for hidden names.
///
/// Relative patterns are scoped to the working directory, so `.hidden/*.txt`
/// still counts as hidden. Absolute patterns are scoped to their leading
/// wildcard-free directories, which keeps a dot-named parent the user typed
/// (a temp dir, `~/.config`) from hiding every match.
pub fn pattern_scope(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    if !path.is_absolute() {
        return PathBuf::from(".");
    }

    let components: Vec<Component> = path.components().collect();
    let literal = components
        .iter()
        .take(components.len().saturating_sub(1))
        .take_while(|c| !c.as_os_str().to_string_lossy().contains(['*', '?', '[']))
        .count();
    components[..literal].iter().collect()
}

/// True when any named component of the path starts with '.'.
///
/// `.` and `..` components are not names and never count as hidden.
pub fn has_hidden_component(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Final path segment as a string, if any
pub fn file_name_str(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
