//! Traversal engine
//!
//! Two ways of enumerating candidate files, each with its own error policy:
//! - directory mode walks a root with walkdir and aborts on the first error
//! - pattern mode expands a glob and skips entries it cannot stat or read
//!
//! Both feed every candidate through the same [`FileFilter`] before handing
//! survivors to a [`Visitor`], in traversal order.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::classify::ExtensionClassifier;
use crate::core::error::MergeError;
use crate::core::ignore_rules::{is_ignored, IgnoreMatcher};
use crate::core::paths::{
    file_name_str, has_hidden_component, make_relative, normalize_path, parent_or_current,
    pattern_scope,
};

/// How the positional input is interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// An existing directory, walked recursively
    Directory(PathBuf),
    /// Anything else, expanded as a glob pattern
    Pattern(String),
}

impl InputMode {
    pub fn detect(input: &str) -> Self {
        let path = Path::new(input);
        if path.is_dir() {
            InputMode::Directory(path.to_path_buf())
        } else {
            InputMode::Pattern(input.to_string())
        }
    }
}

/// A visited filesystem node before filtering
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    /// Directory the relative path is computed against
    pub base: PathBuf,
    /// Only components below this directory are checked for hidden names
    pub hidden_scope: PathBuf,
    pub is_dir: bool,
}

/// A file that passed every filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedFile {
    pub path: PathBuf,
    /// Path relative to the candidate base, '/'-separated
    pub relative: String,
}

/// Why a candidate was not merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutputFile,
    Directory,
    Ignored,
    NonText,
    Hidden,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::OutputFile => "output file",
            SkipReason::Directory => "directory",
            SkipReason::Ignored => "gitignored",
            SkipReason::NonText => "non-text extension",
            SkipReason::Hidden => "hidden path",
        };
        write!(f, "{}", reason)
    }
}

/// Outcome of filtering one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept(AcceptedFile),
    Skip { relative: String, reason: SkipReason },
}

/// Receives filtered files and diagnostics from a traversal
pub trait Visitor {
    /// Called once per accepted file, in traversal order. An error aborts
    /// directory mode; pattern mode only continues past per-item errors.
    fn accept(&mut self, file: &AcceptedFile) -> Result<(), MergeError>;

    fn skipped(&mut self, _relative: &str, _reason: SkipReason) {}

    /// A per-item error that pattern mode recovered from
    fn warn(&mut self, _error: &MergeError) {}
}

/// Ordered filter chain applied to every candidate
#[derive(Debug)]
pub struct FileFilter {
    output_name: Option<String>,
    ignore: Option<IgnoreMatcher>,
    classifier: ExtensionClassifier,
}

impl FileFilter {
    /// `output` is the configured output path; only its file name is compared
    pub fn new(
        output: &Path,
        ignore: Option<IgnoreMatcher>,
        classifier: ExtensionClassifier,
    ) -> Self {
        Self {
            output_name: file_name_str(output),
            ignore,
            classifier,
        }
    }

    /// Run the filter chain: output name, directory, ignore rules, extension, hidden
    pub fn check(&self, candidate: &Candidate) -> Result<Verdict, MergeError> {
        let name = file_name_str(&candidate.path);
        if name.is_some() && name == self.output_name {
            let relative = make_relative(&candidate.path, &candidate.base)
                .unwrap_or_else(|| normalize_path(&candidate.path));
            return Ok(Verdict::Skip {
                relative,
                reason: SkipReason::OutputFile,
            });
        }

        let relative = make_relative(&candidate.path, &candidate.base).ok_or_else(|| {
            MergeError::RelativePath {
                path: candidate.path.clone(),
                base: candidate.base.clone(),
            }
        })?;
        let skip = |reason: SkipReason| -> Result<Verdict, MergeError> {
            Ok(Verdict::Skip {
                relative: relative.clone(),
                reason,
            })
        };

        if candidate.is_dir {
            return skip(SkipReason::Directory);
        }
        if is_ignored(self.ignore.as_ref(), Path::new(&relative), false) {
            return skip(SkipReason::Ignored);
        }
        if !self.classifier.is_text_path(&candidate.path) {
            return skip(SkipReason::NonText);
        }
        let scoped = make_relative(&candidate.path, &candidate.hidden_scope)
            .unwrap_or_else(|| normalize_path(&candidate.path));
        if has_hidden_component(Path::new(&scoped)) {
            return skip(SkipReason::Hidden);
        }

        Ok(Verdict::Accept(AcceptedFile {
            path: candidate.path.clone(),
            relative,
        }))
    }
}

fn dispatch<V: Visitor>(
    filter: &FileFilter,
    candidate: &Candidate,
    visitor: &mut V,
) -> Result<(), MergeError> {
    match filter.check(candidate)? {
        Verdict::Accept(file) => visitor.accept(&file),
        Verdict::Skip { relative, reason } => {
            visitor.skipped(&relative, reason);
            Ok(())
        }
    }
}

/// Recursive pre-order walk of `root`, sorted by file name.
///
/// Any walk, read or write error stops the traversal.
pub fn walk_directory<V: Visitor>(
    root: &Path,
    filter: &FileFilter,
    visitor: &mut V,
) -> Result<(), MergeError> {
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let candidate = Candidate {
            path: entry.path().to_path_buf(),
            base: root.to_path_buf(),
            hidden_scope: root.to_path_buf(),
            is_dir: entry.file_type().is_dir(),
        };
        dispatch(filter, &candidate, visitor)?;
    }
    Ok(())
}

/// Expand `pattern` (with `**` support) and visit each match.
///
/// Each match is made relative to its own parent directory, but hidden names
/// are looked for along the whole matched path below [`pattern_scope`]. Entries that
/// cannot be listed, stat'ed or read are reported to the visitor and skipped;
/// any other error stops the traversal.
pub fn walk_pattern<V: Visitor>(
    pattern: &str,
    filter: &FileFilter,
    visitor: &mut V,
) -> Result<(), MergeError> {
    let scope = pattern_scope(pattern);
    for entry in glob::glob(pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                let path = e.path().to_path_buf();
                visitor.warn(&MergeError::Stat {
                    path,
                    source: e.into_error(),
                });
                continue;
            }
        };

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(source) => {
                visitor.warn(&MergeError::Stat { path, source });
                continue;
            }
        };

        let candidate = Candidate {
            base: parent_or_current(&path).to_path_buf(),
            hidden_scope: scope.clone(),
            is_dir: metadata.is_dir(),
            path,
        };

        match dispatch(filter, &candidate, visitor) {
            Ok(()) => {}
            Err(e) if e.is_per_item() => visitor.warn(&e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
