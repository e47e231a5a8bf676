//! Language-specific tree-sitter configuration modules

pub mod python;
pub mod typescript;
