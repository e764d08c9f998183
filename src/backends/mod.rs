//! Backends module - File system traversal
//!
//! Provides:
//! - walk: directory walking and glob expansion feeding the filter chain

pub mod walk;
