//! Implements a parser for dotenv files: `NAME=value` declarations with quoting, comments,
//! and `$NAME` / `${NAME:-default}` interpolation.
//!
//! Parsing never touches the file system or mutates the process environment. Values that
//! references may resolve to are supplied explicitly through a [`ParseContext`].

pub mod context;
pub mod format;
pub mod parser;

mod cursor;
mod error;
mod resolver;
mod scanner;
mod source;
mod trace_categories;

#[cfg(test)]
mod tests;

pub use context::{
    DEFAULT_RESERVED_PREFIX, LoadedVars, NoVariables, ParseContext, ProcessEnvironment,
    VariableSource,
};
pub use error::{ErrorCategory, FormatErrorKind, ParseError};
pub use format::{SerializeError, is_valid_name};
pub use parser::{Parser, Variables, parse, parse_with_context};
pub use source::{SourceInfo, SourcePosition};
