//! file-for-ai - Merge files into a single document for AI chats
//!
//! file-for-ai provides:
//! - Directory walking with .gitignore filtering
//! - Glob pattern expansion (including `**`)
//! - Extension-based binary file exclusion
//! - Token estimates via tiktoken

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod core;
mod flows;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
