use crate::SourcePosition;

/// Returns whether `b` is whitespace for the purposes of skipping and value checks.
pub(crate) const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// Returns whether `b` is a space or tab.
pub(crate) const fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

/// Tracks the current byte offset and 1-based line number over an input buffer.
///
/// The line counter always equals one plus the number of `\n` bytes before the offset.
#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn is_at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Returns the byte under the cursor.
    pub fn peek(&self) -> Option<u8> {
        self.byte_at(self.offset)
    }

    /// Returns the byte at an absolute offset.
    pub fn byte_at(&self, index: usize) -> Option<u8> {
        self.input.as_bytes().get(index).copied()
    }

    /// Returns the byte immediately before the cursor.
    pub fn previous(&self) -> Option<u8> {
        self.offset.checked_sub(1).and_then(|index| self.byte_at(index))
    }

    /// Returns the unconsumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// Returns the text between two absolute offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Moves the cursor forward by `count` bytes, counting any line breaks passed over.
    pub fn advance(&mut self, count: usize) {
        self.advance_to(self.offset + count);
    }

    /// Moves the cursor forward to an absolute offset, counting any line breaks passed over.
    pub fn advance_to(&mut self, offset: usize) {
        let offset = offset.min(self.input.len());
        if offset <= self.offset {
            return;
        }

        self.line += self.input.as_bytes()[self.offset..offset]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.offset = offset;
    }

    /// Returns the full position of the cursor, including its column.
    pub fn position(&self) -> SourcePosition {
        let line_start = self.input[..self.offset]
            .rfind('\n')
            .map_or(0, |index| index + 1);

        SourcePosition {
            index: self.offset,
            line: self.line,
            column: self.input[line_start..self.offset].chars().count() + 1,
        }
    }

    /// Consumes the maximal run of whitespace and `#` comments at the cursor.
    pub fn skip_blanks_and_comments(&mut self) {
        let bytes = self.input.as_bytes();
        let mut end = self.offset;

        loop {
            while end < bytes.len() && is_whitespace(bytes[end]) {
                end += 1;
            }

            if end < bytes.len() && bytes[end] == b'#' {
                while end < bytes.len() && bytes[end] != b'\n' {
                    end += 1;
                }
            } else {
                break;
            }
        }

        self.advance_to(end);
    }
}
