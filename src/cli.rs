//! CLI module - Command-line interface definition and handler

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::core::tokenizer::TokenModel;
use crate::flows::merge::{
    render_summary, run_merge, Console, MergeOptions, DEFAULT_MODEL, DEFAULT_OUTPUT,
};

/// file-for-ai - merge a directory tree or glob match into one file for AI chats.
#[derive(Parser, Debug)]
#[command(name = "file-for-ai")]
#[command(
    author,
    version,
    about,
    long_about = r#"file-for-ai concatenates every text file under a directory (or matching a
glob pattern) into a single output file. Each file is preceded by a separator:

    >>>>>> relative/path.ext <<<<<<

Files ignored by .gitignore, files with binary extensions, hidden paths and the
output file itself are skipped. A token estimate for the chosen model is
printed at the end.
"#,
    after_help = r#"Examples:
  file-for-ai /path/to/directory
  file-for-ai './*.txt'
  file-for-ai './src/**/*.rs' --model gpt-4o
  file-for-ai /path/to/directory --output custom-output.txt"#
)]
pub struct Cli {
    /// Directory path or glob pattern to merge.
    #[arg(
        value_name = "DIRECTORY|PATTERN",
        required_unless_present = "list_models",
        long_help = "Directory path or glob pattern to merge.\n\n\
An existing directory is walked recursively and its .gitignore rules apply.\n\
Anything else is expanded as a glob pattern (quote it so the shell does not);\n\
'**' matches any number of directories. In pattern mode each match is shown\n\
relative to its own parent directory."
    )]
    pub input: Option<String>,

    /// Model whose tokenizer is used for the token estimate.
    #[arg(
        short,
        long,
        env = "FILE_FOR_AI_MODEL",
        default_value = DEFAULT_MODEL,
        value_name = "MODEL",
        long_help = "Model whose tokenizer is used for the token estimate.\n\n\
Accepts OpenAI model names (gpt-4, gpt-4o, gpt-3.5-turbo, text-davinci-003, ...),\n\
encoding names (cl100k_base, o200k_base, ...), 'claude' (approximated with\n\
cl100k_base) and 'heuristic' for a fast estimate without BPE."
    )]
    pub model: String,

    /// Output file (overwritten if it exists).
    #[arg(
        short,
        long,
        env = "FILE_FOR_AI_OUTPUT",
        default_value = DEFAULT_OUTPUT,
        value_name = "FILE",
        long_help = "Output file. It is created or truncated before merging starts.\n\n\
A file with the same name inside the merged tree is never read as input."
    )]
    pub output: PathBuf,

    /// Do not filter files using .gitignore.
    #[arg(
        long,
        env = "FILE_FOR_AI_IGNORE_GITIGNORE",
        long_help = "Do not apply .gitignore rules. Extension and hidden-path filtering\n\
still apply."
    )]
    pub ignore_gitignore: bool,

    /// Merge files regardless of their extension.
    #[arg(
        long,
        env = "FILE_FOR_AI_PROCESS_NON_TEXT",
        long_help = "Merge files regardless of their extension, including images, archives\n\
and files without an extension. Their bytes are copied verbatim."
    )]
    pub process_non_text: bool,

    /// Print the summary as a single JSON object.
    #[arg(long)]
    pub json: bool,

    /// List accepted model names and exit.
    #[arg(long)]
    pub list_models: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Quiet mode (only warnings and the summary).
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (report every skipped path on stderr).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.list_models {
        for model in TokenModel::available_models() {
            println!("{}", model);
        }
        return Ok(());
    }

    let input = match cli.input {
        Some(input) => input,
        None => anyhow::bail!("directory path or glob pattern is required"),
    };

    let mut options = MergeOptions::new(input);
    options.output = cli.output;
    options.model = cli.model;
    options.ignore_gitignore = cli.ignore_gitignore;
    options.process_non_text = cli.process_non_text;
    options.console = Console {
        quiet: cli.quiet || cli.json,
        verbose: cli.verbose,
    };

    let summary = run_merge(&options)?;

    if cli.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        if !options.console.quiet {
            println!();
        }
        println!("{}", render_summary(&summary));
    }

    Ok(())
}
