//! Scanners for the pieces of a declaration: names, values, and nested `$(...)` text.

use crate::context::ParseContext;
use crate::cursor::{Cursor, is_blank, is_whitespace};
use crate::error::{FormatErrorKind, ParseError};
use crate::resolver::{resolve_variables, variable_name_len};
use crate::{SourceInfo, SourcePosition, Variables};

/// Deepest `$(` nesting that will be followed before giving up.
const MAX_NESTING_DEPTH: usize = 64;

const EXPORT_KEYWORD: &str = "export";

/// Characters trimmed from the end of an unquoted fragment.
const TRAILING_TRIM_CHARS: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Scanning state for one parse call.
pub(crate) struct Scanner<'a, 'c> {
    cursor: Cursor<'a>,
    context: &'c ParseContext<'c>,
    source_info: &'c SourceInfo,
    values: Variables,
}

impl<'a, 'c> Scanner<'a, 'c> {
    pub fn new(
        input: &'a str,
        context: &'c ParseContext<'c>,
        source_info: &'c SourceInfo,
    ) -> Self {
        Self {
            cursor: Cursor::new(input),
            context,
            source_info,
            values: Variables::new(),
        }
    }

    pub const fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    pub fn skip_blanks_and_comments(&mut self) {
        self.cursor.skip_blanks_and_comments();
    }

    /// Records an assignment; a repeated name keeps its original position.
    pub fn assign(&mut self, name: &str, value: String) {
        self.values.insert(name.to_owned(), value);
    }

    pub fn into_values(self) -> Variables {
        self.values
    }

    fn error(&self, kind: FormatErrorKind) -> ParseError {
        self.error_at(kind, self.cursor.position())
    }

    fn error_at(&self, kind: FormatErrorKind, position: SourcePosition) -> ParseError {
        ParseError {
            kind,
            position,
            source_info: self.source_info.clone(),
        }
    }

    fn resolve(&mut self, fragment: &str) -> Result<String, ParseError> {
        resolve_variables(fragment, self.context, &mut self.values)
            .map_err(|kind| self.error(kind))
    }

    /// Scans an optional `export` marker, a variable name, and the `=` that must follow.
    ///
    /// Returns the name without the marker.
    pub fn scan_name(&mut self) -> Result<&'a str, ParseError> {
        let rest = self.cursor.rest();
        let Some((exported, name_start, name_end)) = match_declaration_start(rest) else {
            return Err(self.error(FormatErrorKind::InvalidVariableName));
        };

        let name = &rest[name_start..name_end];
        self.cursor.advance(name_end);

        match self.cursor.peek() {
            None | Some(b'\n' | b'#') => {
                if exported {
                    Err(self.error(FormatErrorKind::UnsetVariable))
                } else {
                    Err(self.error(FormatErrorKind::MissingEquals))
                }
            }
            Some(b' ' | b'\t') => Err(self.error(FormatErrorKind::WhitespaceAfterName)),
            Some(b'=') => {
                self.cursor.advance(1);
                Ok(name)
            }
            Some(_) => Err(self.error(FormatErrorKind::MissingEquals)),
        }
    }

    /// Scans the value that follows an `=`, concatenating adjacent quoted and unquoted
    /// fragments until the end of the line.
    pub fn scan_value(&mut self) -> Result<String, ParseError> {
        if let Some(end) = self.blank_rest_of_line() {
            self.cursor.advance_to(end);
            self.cursor.skip_blanks_and_comments();
            return Ok(String::new());
        }

        if self.cursor.peek().is_some_and(is_blank) {
            return Err(self.error(FormatErrorKind::WhitespaceBeforeValue));
        }

        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                Some(b'\'') => value.push_str(self.scan_single_quoted()?),
                Some(b'"') => {
                    let fragment = self.scan_double_quoted()?;
                    value.push_str(&fragment);
                }
                _ => {
                    if self.scan_unquoted(&mut value)? {
                        break;
                    }
                }
            }

            if matches!(self.cursor.peek(), None | Some(b'\n')) {
                break;
            }
        }

        self.cursor.skip_blanks_and_comments();

        Ok(value)
    }

    /// If the rest of the line holds only blanks and an optional comment, returns the
    /// offset of the end of the line.
    fn blank_rest_of_line(&self) -> Option<usize> {
        let mut end = self.cursor.offset();
        while self.cursor.byte_at(end).is_some_and(is_blank) {
            end += 1;
        }

        if self.cursor.byte_at(end) == Some(b'#') {
            while self.cursor.byte_at(end).is_some_and(|b| b != b'\n') {
                end += 1;
            }
        }

        matches!(self.cursor.byte_at(end), None | Some(b'\n')).then_some(end)
    }

    /// Scans a single-quoted fragment; its content is taken verbatim.
    fn scan_single_quoted(&mut self) -> Result<&'a str, ParseError> {
        let start = self.cursor.position();
        let content_start = self.cursor.offset() + 1;

        match self.cursor.rest()[1..].find('\'') {
            Some(length) => {
                let content = self.cursor.slice(content_start, content_start + length);
                self.cursor.advance_to(content_start + length + 1);
                Ok(content)
            }
            None => Err(self.error_at(FormatErrorKind::UnterminatedQuote, start)),
        }
    }

    /// Scans a double-quoted fragment, applying escapes and expanding references.
    fn scan_double_quoted(&mut self) -> Result<String, ParseError> {
        let start = self.cursor.position();
        let content_start = self.cursor.offset() + 1;

        let mut index = content_start;
        loop {
            match self.cursor.byte_at(index) {
                None => return Err(self.error_at(FormatErrorKind::UnterminatedQuote, start)),
                Some(b'"') if !self.is_escaped_quote(index) => break,
                Some(_) => index += 1,
            }
        }

        let raw = self.cursor.slice(content_start, index);
        self.cursor.advance_to(index + 1);

        let unescaped = raw
            .replace("\\\"", "\"")
            .replace("\\r", "\r")
            .replace("\\n", "\n");
        let resolved = self.resolve(&unescaped)?;

        Ok(resolved.replace("\\\\", "\\"))
    }

    /// A `"` is escaped when preceded by a backslash that is not itself preceded by one.
    fn is_escaped_quote(&self, index: usize) -> bool {
        let before = |distance: usize| {
            index
                .checked_sub(distance)
                .and_then(|i| self.cursor.byte_at(i))
        };

        before(1) == Some(b'\\') && before(2) != Some(b'\\')
    }

    /// Scans an unquoted fragment and appends its expansion to `value`.
    ///
    /// Returns `true` if scanning stopped at a comment, which ends the value.
    fn scan_unquoted(&mut self, value: &mut String) -> Result<bool, ParseError> {
        let mut raw = String::new();
        let mut previous = self.cursor.previous();
        let mut run_start = self.cursor.offset();
        let mut index = run_start;

        while let Some(b) = self.cursor.byte_at(index) {
            if matches!(b, b'\n' | b'"' | b'\'') || (b == b'#' && previous.is_some_and(is_blank)) {
                break;
            }

            let next = self.cursor.byte_at(index + 1);
            if b == b'\\' && matches!(next, Some(b'"' | b'\'')) {
                previous = next;
                index += 2;
            } else if b == b'$' && next == Some(b'(') {
                raw.push_str(self.cursor.slice(run_start, index + 1));
                self.cursor.advance_to(index + 1);

                let inner = self.scan_nested_expression(0)?;
                raw.push('(');
                raw.push_str(&inner);
                raw.push(')');

                previous = Some(b'$');
                index = self.cursor.offset() + 1;
                run_start = index;
            } else {
                previous = Some(b);
                index += 1;
            }
        }

        raw.push_str(self.cursor.slice(run_start, index));
        self.cursor.advance_to(index);

        let trimmed = raw.trim_end_matches(TRAILING_TRIM_CHARS);
        let resolved = self.resolve(trimmed)?.replace("\\\\", "\\");

        if resolved == trimmed && trimmed.bytes().any(is_whitespace) {
            return Err(self.error(FormatErrorKind::UnquotedWhitespace));
        }

        value.push_str(&resolved);

        Ok(self.cursor.peek() == Some(b'#'))
    }

    /// Scans the parenthesized text of a `$(...)` placeholder. The cursor must be on the
    /// opening `(`; it is left on the matching `)`.
    ///
    /// Returns the text between the parentheses, which is never executed.
    fn scan_nested_expression(&mut self, depth: usize) -> Result<String, ParseError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(self.error(FormatErrorKind::NestingTooDeep));
        }

        self.cursor.advance(1);

        let mut inner = String::new();
        loop {
            match self.cursor.peek() {
                None | Some(b'\n') => {
                    return Err(self.error(FormatErrorKind::UnterminatedNestedExpression));
                }
                Some(b')') => return Ok(inner),
                Some(b'(') => {
                    let nested = self.scan_nested_expression(depth + 1)?;
                    inner.push('(');
                    inner.push_str(&nested);
                    inner.push(')');
                    self.cursor.advance(1);
                }
                Some(_) => {
                    let rest = self.cursor.rest();
                    let length = rest.find(['(', ')', '\n']).unwrap_or(rest.len());
                    inner.push_str(&rest[..length]);
                    self.cursor.advance(length);
                }
            }
        }
    }
}

/// Matches `(export[ \t]+)?NAME` at the start of `text`.
///
/// Returns whether the export marker was present and the byte range of the name.
fn match_declaration_start(text: &str) -> Option<(bool, usize, usize)> {
    if let Some(after_keyword) = text.strip_prefix(EXPORT_KEYWORD) {
        let blanks = after_keyword.bytes().take_while(|b| is_blank(*b)).count();
        if blanks > 0 {
            let name_start = EXPORT_KEYWORD.len() + blanks;
            let name_len = variable_name_len(&text[name_start..]);
            if name_len > 0 {
                return Some((true, name_start, name_start + name_len));
            }
        }
    }

    let name_len = variable_name_len(text);
    (name_len > 0).then_some((false, 0, name_len))
}
