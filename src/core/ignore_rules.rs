//! .gitignore matching for directory traversal
//!
//! Every `.gitignore` under the root is compiled against its own directory.
//! Queries consult the matchers of all ancestor directories, shallowest
//! first, so deeper rules override shallower ones like git does.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::error::MergeError;

const GITIGNORE_FILE: &str = ".gitignore";

/// One compiled `.gitignore`, scoped to the directory that contains it
#[derive(Debug)]
struct ScopedRules {
    /// Directory of the `.gitignore`, relative to the traversal root
    dir: PathBuf,
    rules: Gitignore,
}

/// Answers "is this path ignored?" for paths relative to a traversal root
#[derive(Debug)]
pub struct IgnoreMatcher {
    scopes: Vec<ScopedRules>,
}

impl IgnoreMatcher {
    /// Collect and compile all `.gitignore` files under `root`.
    ///
    /// Returns `Ok(None)` when the tree has no `.gitignore` at all.
    pub fn from_root(root: &Path) -> Result<Option<Self>, MergeError> {
        let mut scopes = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git");

        for entry in walker {
            let entry = entry?;
            if entry.file_name() != GITIGNORE_FILE || !entry.file_type().is_file() {
                continue;
            }

            let file = entry.path();
            let dir = file.parent().unwrap_or(root);
            let mut builder = GitignoreBuilder::new(dir);
            if let Some(source) = builder.add(file) {
                return Err(MergeError::IgnoreRules {
                    path: file.to_path_buf(),
                    source,
                });
            }
            let rules = builder.build().map_err(|source| MergeError::IgnoreRules {
                path: file.to_path_buf(),
                source,
            })?;

            let relative_dir = dir.strip_prefix(root).unwrap_or(Path::new("")).to_path_buf();
            scopes.push(ScopedRules {
                dir: relative_dir,
                rules,
            });
        }

        if scopes.is_empty() {
            return Ok(None);
        }

        // Shallow scopes first so that deeper rules get the final word
        scopes.sort_by_key(|s| s.dir.components().count());
        Ok(Some(Self { scopes }))
    }

    /// Check a path relative to the traversal root
    pub fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        let mut ignored = false;
        for scope in &self.scopes {
            let sub = match relative.strip_prefix(&scope.dir) {
                Ok(sub) if !sub.as_os_str().is_empty() => sub,
                _ => continue,
            };
            let matched = scope.rules.matched_path_or_any_parents(sub, is_dir);
            if matched.is_ignore() {
                ignored = true;
            } else if matched.is_whitelist() {
                ignored = false;
            }
        }
        ignored
    }
}

/// Query helper that treats an absent matcher as "nothing is ignored"
pub fn is_ignored(matcher: Option<&IgnoreMatcher>, relative: &Path, is_dir: bool) -> bool {
    matcher
        .map(|m| m.is_ignored(relative, is_dir))
        .unwrap_or(false)
}
