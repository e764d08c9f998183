//! Flows module - End-to-end operations
//!
//! Provides:
//! - merge: concatenate filtered files into one output with a token total

pub mod merge;
