//! Trace utilities

/// Trace category for variable expansion.
pub(crate) const EXPANSION: &str = "expansion";
/// Trace category for parsing.
pub(crate) const PARSE: &str = "parse";
