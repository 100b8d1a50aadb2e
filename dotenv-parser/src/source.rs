use std::fmt::Display;

/// Represents a position in source text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePosition {
    /// The 0-based byte offset into the (newline-normalized) input.
    pub index: usize,
    /// The 1-based line number.
    pub line: usize,
    /// The 1-based column number, counted in characters.
    pub column: usize,
}

impl Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{},{}", self.line, self.column))
    }
}

/// Information about where the parsed text came from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceInfo {
    /// The name of the source (typically a file path).
    pub source: String,
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self {
            source: String::from(".env"),
        }
    }
}

impl From<&str> for SourceInfo {
    fn from(source: &str) -> Self {
        Self {
            source: source.to_owned(),
        }
    }
}

impl From<String> for SourceInfo {
    fn from(source: String) -> Self {
        Self { source }
    }
}

impl Display for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}
