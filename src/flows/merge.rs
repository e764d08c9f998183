//! Merge flow - Concatenate accepted files into one output with token totals
//!
//! Wires the traversal engine, the ignore rules, the extension classifier and
//! the tokenizer together. Files are read whole, counted, and appended to the
//! output behind a `>>>>>> path <<<<<<` separator, strictly in traversal order.

use colored::Colorize;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::backends::walk::{
    walk_directory, walk_pattern, AcceptedFile, FileFilter, InputMode, SkipReason, Visitor,
};
use crate::core::classify::ExtensionClassifier;
use crate::core::error::MergeError;
use crate::core::ignore_rules::IgnoreMatcher;
use crate::core::tokenizer::Tokenizer;
use crate::core::util::format_thousands;

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "file-for-ai.txt";

/// Default tokenizer model
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Separator line written before each file's content
pub fn separator(relative: &str) -> String {
    format!("\n\n>>>>>> {} <<<<<<\n\n", relative)
}

/// Console verbosity for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Console {
    /// Suppress progress lines and the per-file echo
    pub quiet: bool,
    /// Report every skipped path on stderr
    pub verbose: bool,
}

/// Settings for a single merge run
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Directory path or glob pattern
    pub input: String,
    pub output: PathBuf,
    pub model: String,
    /// Do not apply .gitignore rules
    pub ignore_gitignore: bool,
    /// Merge files regardless of extension
    pub process_non_text: bool,
    pub console: Console,
}

impl MergeOptions {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            model: DEFAULT_MODEL.to_string(),
            ignore_gitignore: false,
            process_non_text: false,
            console: Console::default(),
        }
    }
}

/// What a completed run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub output: String,
    pub model: String,
    pub files: usize,
    pub tokens: usize,
}

/// Appends accepted files to the output stream and keeps the running total
pub struct Merger<W: Write> {
    writer: W,
    output_path: PathBuf,
    tokenizer: Tokenizer,
    console: Console,
    files: usize,
    tokens: usize,
}

impl<W: Write> Merger<W> {
    pub fn new(
        writer: W,
        output_path: impl Into<PathBuf>,
        tokenizer: Tokenizer,
        console: Console,
    ) -> Self {
        Self {
            writer,
            output_path: output_path.into(),
            tokenizer,
            console,
            files: 0,
            tokens: 0,
        }
    }

    pub fn files(&self) -> usize {
        self.files
    }

    pub fn tokens(&self) -> usize {
        self.tokens
    }

    /// Append one file's separator and raw bytes; returns its token count
    pub fn append(&mut self, relative: &str, content: &[u8]) -> Result<usize, MergeError> {
        let tokens = self.tokenizer.count_bytes(content);
        self.tokens += tokens;

        self.write_all(separator(relative).as_bytes())?;
        self.write_all(content)?;
        self.files += 1;
        Ok(tokens)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), MergeError> {
        self.writer.write_all(bytes).map_err(|source| MergeError::Write {
            path: self.output_path.clone(),
            source,
        })
    }

    /// Flush the output and hand back the writer
    pub fn finish(mut self) -> Result<W, MergeError> {
        self.writer.flush().map_err(|source| MergeError::Write {
            path: self.output_path.clone(),
            source,
        })?;
        Ok(self.writer)
    }
}

impl<W: Write> Visitor for Merger<W> {
    fn accept(&mut self, file: &AcceptedFile) -> Result<(), MergeError> {
        let content = fs::read(&file.path).map_err(|source| MergeError::Read {
            path: file.path.clone(),
            source,
        })?;
        if !self.console.quiet {
            println!("{}", file.relative);
        }
        self.append(&file.relative, &content)?;
        Ok(())
    }

    fn skipped(&mut self, relative: &str, reason: SkipReason) {
        if self.console.verbose && reason != SkipReason::Directory {
            eprintln!("{} {} ({})", "skip:".dimmed(), relative, reason);
        }
    }

    fn warn(&mut self, error: &MergeError) {
        eprintln!("{} {}", "warning:".yellow().bold(), error);
    }
}

/// Build the ignore matcher for directory mode, unless disabled
fn load_ignore_rules(
    root: &Path,
    options: &MergeOptions,
) -> Result<Option<IgnoreMatcher>, MergeError> {
    if options.ignore_gitignore {
        return Ok(None);
    }
    let matcher = IgnoreMatcher::from_root(root)?;
    if matcher.is_some() && !options.console.quiet {
        println!("Filtering files using .gitignore...");
    }
    Ok(matcher)
}

/// Run a full merge: truncate the output, traverse, append, and summarize
pub fn run_merge(options: &MergeOptions) -> Result<MergeSummary, MergeError> {
    let file = File::create(&options.output).map_err(|source| MergeError::CreateOutput {
        path: options.output.clone(),
        source,
    })?;
    let tokenizer = Tokenizer::for_model(&options.model)?;
    if options.console.verbose {
        eprintln!(
            "{} {} uses {}",
            "model:".dimmed(),
            tokenizer.model(),
            tokenizer.encoding()
        );
    }
    let classifier = ExtensionClassifier::new(options.process_non_text);

    let mut merger = Merger::new(
        BufWriter::new(file),
        options.output.clone(),
        tokenizer,
        options.console,
    );

    if !options.console.quiet {
        println!("Merging files:");
    }

    match InputMode::detect(&options.input) {
        InputMode::Directory(root) => {
            let ignore = load_ignore_rules(&root, options)?;
            let filter = FileFilter::new(&options.output, ignore, classifier);
            walk_directory(&root, &filter, &mut merger)?;
        }
        InputMode::Pattern(pattern) => {
            let filter = FileFilter::new(&options.output, None, classifier);
            walk_pattern(&pattern, &filter, &mut merger)?;
        }
    }

    let summary = MergeSummary {
        output: options.output.to_string_lossy().into_owned(),
        model: options.model.clone(),
        files: merger.files(),
        tokens: merger.tokens(),
    };
    merger.finish()?;
    Ok(summary)
}

/// Human-readable completion lines
pub fn render_summary(summary: &MergeSummary) -> String {
    format!(
        "Files merged successfully into {}\nTotal tokens for model {}: {}",
        summary.output.bold(),
        summary.model,
        format_thousands(summary.tokens).green().bold()
    )
}
