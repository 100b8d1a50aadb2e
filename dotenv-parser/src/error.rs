use crate::{SourceInfo, SourcePosition};

/// Broad classification of a format error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The declaration itself is malformed (bad name, missing `=`, misplaced whitespace).
    Grammar,
    /// A quoted, braced, or parenthesized construct was left open.
    Quoting,
    /// The text is well-formed but its content is not acceptable.
    Semantic,
}

/// Describes what went wrong while parsing dotenv text.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// No valid variable name could be found at the start of a declaration.
    #[error("invalid character in variable name")]
    InvalidVariableName,

    /// An `export`-prefixed name was not followed by `=`.
    #[error("cannot unset a variable")]
    UnsetVariable,

    /// A name was not followed by `=`.
    #[error("missing `=` in declaration")]
    MissingEquals,

    /// A name was followed by whitespace.
    #[error("whitespace not supported after variable name")]
    WhitespaceAfterName,

    /// The `=` was followed by whitespace and then a value.
    #[error("whitespace not supported before value")]
    WhitespaceBeforeValue,

    /// A single- or double-quoted value was never closed.
    #[error("missing quote to end the value")]
    UnterminatedQuote,

    /// A `$(` was never balanced by a matching `)` on the same line.
    #[error("missing closing parenthesis")]
    UnterminatedNestedExpression,

    /// A `$(` nests more deeply than the parser is willing to follow.
    #[error("too many nested parentheses")]
    NestingTooDeep,

    /// A `${` reference was not closed by `}`.
    #[error("unclosed braces on variable expansion")]
    UnclosedBraces,

    /// An unquoted value contained literal whitespace.
    #[error("a value containing spaces must be surrounded by quotes")]
    UnquotedWhitespace,

    /// The default text of a `:-` or `:=` reference contained a forbidden character.
    #[error("unsupported character in the default value of variable \"${name}\"")]
    UnsupportedDefaultCharacter {
        /// Name of the referenced variable.
        name: String,
        /// The first forbidden character found.
        character: char,
    },
}

impl FormatErrorKind {
    /// Returns the category this error belongs to.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidVariableName
            | Self::UnsetVariable
            | Self::MissingEquals
            | Self::WhitespaceAfterName
            | Self::WhitespaceBeforeValue => ErrorCategory::Grammar,
            Self::UnterminatedQuote
            | Self::UnterminatedNestedExpression
            | Self::NestingTooDeep
            | Self::UnclosedBraces => ErrorCategory::Quoting,
            Self::UnquotedWhitespace | Self::UnsupportedDefaultCharacter { .. } => {
                ErrorCategory::Semantic
            }
        }
    }
}

/// Represents an error that occurred while parsing dotenv text.
///
/// Every error is fatal to the parse call that produced it.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("{kind} in \"{}\" at line {}", .source_info.source, .position.line)]
pub struct ParseError {
    /// What went wrong.
    pub kind: FormatErrorKind,
    /// Where it went wrong.
    pub position: SourcePosition,
    /// The source being parsed.
    pub source_info: SourceInfo,
}

impl ParseError {
    /// Returns the 1-based line number at which the error was detected.
    pub const fn line(&self) -> usize {
        self.position.line
    }

    /// Renders the offending line of `input` with a caret under the failure column.
    ///
    /// # Arguments
    ///
    /// * `input` - The text that was passed to the parser.
    pub fn details(&self, input: &str) -> String {
        let normalized = crate::parser::normalize_line_endings(input);
        let line_text = normalized
            .split('\n')
            .nth(self.position.line.saturating_sub(1))
            .unwrap_or_default();

        let gutter = self.position.line.to_string();
        let padding = " ".repeat(gutter.len());
        let caret_offset = " ".repeat(self.position.column.saturating_sub(1));

        format!("{gutter} | {line_text}\n{padding} | {caret_offset}^")
    }
}
