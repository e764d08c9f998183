//! Core module - Building blocks of the merge pipeline
//!
//! This module provides:
//! - Extension-based text/binary classification
//! - .gitignore matching
//! - Token counting for LLM context budgeting
//! - Path helpers and number formatting
//! - The error taxonomy

pub mod classify;
pub mod error;
pub mod ignore_rules;
pub mod paths;
pub mod tokenizer;
pub mod util;
