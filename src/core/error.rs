//! Error taxonomy for a merge run

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while merging files
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("cannot create output file {}: {source}", path.display())]
    CreateOutput { path: PathBuf, source: io::Error },

    #[error("unknown model: {model}. Available: {available}")]
    UnknownModel { model: String, available: String },

    #[error("cannot load .gitignore rules from {}: {source}", path.display())]
    IgnoreRules { path: PathBuf, source: ignore::Error },

    #[error("invalid glob pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("cannot walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("cannot access {}: {source}", path.display())]
    Stat { path: PathBuf, source: io::Error },

    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot compute relative path of {} against {}", path.display(), base.display())]
    RelativePath { path: PathBuf, base: PathBuf },

    #[error("cannot write to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl MergeError {
    /// Errors tied to a single input file. Pattern mode logs these and moves on;
    /// directory mode still aborts on them.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            MergeError::Stat { .. } | MergeError::Read { .. } | MergeError::RelativePath { .. }
        )
    }
}
