//! Parser for dotenv text.

use std::borrow::Cow;

use bon::Builder;
use indexmap::IndexMap;

use crate::context::ParseContext;
use crate::error::ParseError;
use crate::scanner::Scanner;
use crate::{SourceInfo, trace_categories};

/// Variables produced by a parse call, in the order their names were first assigned.
pub type Variables = IndexMap<String, String>;

/// Converts `\r\n` and lone `\r` line endings to `\n`.
pub(crate) fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if input.contains('\r') {
        Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Implements parsing of dotenv text.
///
/// A parser holds only configuration; each call to [`Parser::parse`] scans with its own
/// state, so a single parser may be shared freely.
#[derive(Builder, Clone, Debug, Default)]
pub struct Parser<'a> {
    /// Context consulted when resolving variable references.
    #[builder(default)]
    context: ParseContext<'a>,
    /// Information about the source of the text.
    #[builder(default, into)]
    source_info: SourceInfo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Name,
    Value,
}

impl Parser<'_> {
    /// Returns the context used for variable resolution.
    pub const fn context(&self) -> &ParseContext<'_> {
        &self.context
    }

    /// Returns information about the source of the text.
    pub const fn source_info(&self) -> &SourceInfo {
        &self.source_info
    }

    /// Parses dotenv text into its variables.
    ///
    /// # Arguments
    ///
    /// * `input` - The text to parse.
    pub fn parse(&self, input: &str) -> Result<Variables, ParseError> {
        tracing::debug!(target: trace_categories::PARSE, source = %self.source_info, "parsing");

        let input = normalize_line_endings(input);
        let result = self.parse_normalized(&input);

        match &result {
            Ok(variables) => tracing::debug!(
                target: trace_categories::PARSE,
                source = %self.source_info,
                count = variables.len(),
                "parsed variables"
            ),
            Err(err) => tracing::debug!(target: trace_categories::PARSE, "parse failed: {err}"),
        }

        result
    }

    fn parse_normalized(&self, input: &str) -> Result<Variables, ParseError> {
        let mut scanner = Scanner::new(input, &self.context, &self.source_info);
        let mut state = State::Name;
        let mut name = "";

        scanner.skip_blanks_and_comments();

        while !scanner.is_at_end() {
            state = match state {
                State::Name => {
                    name = scanner.scan_name()?;
                    State::Value
                }
                State::Value => {
                    let value = scanner.scan_value()?;
                    tracing::trace!(target: trace_categories::PARSE, "{name}={value:?}");
                    scanner.assign(name, value);
                    State::Name
                }
            };
        }

        if state == State::Value {
            scanner.assign(name, String::new());
        }

        Ok(scanner.into_values())
    }
}

/// Parses dotenv text with an empty context.
///
/// # Arguments
///
/// * `input` - The text to parse.
pub fn parse(input: &str) -> Result<Variables, ParseError> {
    Parser::default().parse(input)
}

/// Parses dotenv text, resolving references against the given context.
///
/// # Arguments
///
/// * `input` - The text to parse.
/// * `context` - The context consulted when resolving variable references.
pub fn parse_with_context(
    input: &str,
    context: &ParseContext<'_>,
) -> Result<Variables, ParseError> {
    Parser::builder().context(context.clone()).build().parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatErrorKind;
    use anyhow::Result;
    use pretty_assertions::{assert_eq, assert_matches};

    const fn assert_sync<T: Sync>() {}

    #[test]
    fn parser_is_sync() {
        assert_sync::<Parser<'static>>();
    }

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert!(matches!(normalize_line_endings("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn parse_simple_assignments() -> Result<()> {
        let variables = parse("FOO=bar\nBAZ=qux\n")?;
        assert_eq!(
            variables.into_iter().collect::<Vec<_>>(),
            vec![
                ("FOO".to_owned(), "bar".to_owned()),
                ("BAZ".to_owned(), "qux".to_owned())
            ]
        );
        Ok(())
    }

    #[test]
    fn parse_empty_input() -> Result<()> {
        assert!(parse("")?.is_empty());
        assert!(parse("\n\n  # nothing here\n")?.is_empty());
        Ok(())
    }

    #[test]
    fn trailing_name_without_value() -> Result<()> {
        let variables = parse("FOO=")?;
        assert_eq!(variables.get("FOO").map(String::as_str), Some(""));
        Ok(())
    }

    #[test]
    fn crlf_input() -> Result<()> {
        let variables = parse("FOO=bar\r\nBAZ=\"a\r\nb\"\r\n")?;
        assert_eq!(variables["FOO"], "bar");
        assert_eq!(variables["BAZ"], "a\nb");
        Ok(())
    }

    #[test]
    fn repeated_name_keeps_first_position() -> Result<()> {
        let variables = parse("A=1\nB=2\nA=3\n")?;
        assert_eq!(
            variables.into_iter().collect::<Vec<_>>(),
            vec![
                ("A".to_owned(), "3".to_owned()),
                ("B".to_owned(), "2".to_owned())
            ]
        );
        Ok(())
    }

    #[test]
    fn source_info_appears_in_errors() {
        let parser = Parser::builder().source_info("config/.env.local").build();
        let err = parser.parse("FOO").err();
        assert_matches!(
            err,
            Some(ParseError {
                kind: FormatErrorKind::MissingEquals,
                ..
            })
        );
        assert_eq!(
            parser.parse("FOO").map_err(|e| e.to_string()),
            Err("missing `=` in declaration in \"config/.env.local\" at line 1".to_owned())
        );
    }

    #[test]
    fn concurrent_parses_share_a_parser() -> Result<()> {
        let parser = &Parser::default();
        let inputs = ["A=1\nB=$A", "C='x'\nD=\"$C$C\"", "E=${F:=5}\nG=$F"];

        let results = std::thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|input| scope.spawn(move || parser.parse(input)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().map_err(|_| anyhow::anyhow!("thread panicked")))
                .collect::<Result<Vec<_>>>()
        })?;

        let results = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        assert_eq!(results[0]["B"], "1");
        assert_eq!(results[1]["D"], "xx");
        assert_eq!(results[2]["G"], "5");
        Ok(())
    }
}
