//! Serialization of variables back into dotenv text.

use crate::Variables;
use crate::resolver::variable_name_len;

/// Represents an error that occurred while serializing variables.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum SerializeError {
    /// A name that the parser would not accept as a variable name.
    #[error("invalid variable name: {0:?}")]
    InvalidName(String),
}

/// Returns whether `name` is accepted by the parser as a variable name.
///
/// # Arguments
///
/// * `name` - The candidate name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && variable_name_len(name) == name.len()
}

/// Serializes variables into dotenv text that parses back to the same variables.
///
/// Each variable is written on its own line, in order. Values made only of ASCII
/// alphanumerics and `_-./:@,+%=` are written bare; all others are single-quoted.
///
/// # Arguments
///
/// * `variables` - The variables to serialize.
pub fn to_string(variables: &Variables) -> Result<String, SerializeError> {
    let mut output = String::new();

    for (name, value) in variables {
        if !is_valid_name(name) {
            return Err(SerializeError::InvalidName(name.clone()));
        }

        output.push_str(name);
        output.push('=');
        write_value(&mut output, value);
        output.push('\n');
    }

    Ok(output)
}

const fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | ',' | '+' | '%' | '=')
}

fn write_value(output: &mut String, value: &str) {
    if value.chars().all(is_bare_char) {
        output.push_str(value);
        return;
    }

    // Quotes and carriage returns cannot appear inside single quotes; splice them in.
    let mut segment_start = 0;
    for (index, c) in value.char_indices() {
        let spliced = match c {
            '\'' => "\"'\"",
            '\r' => "\"\\r\"",
            _ => continue,
        };

        write_single_quoted(output, &value[segment_start..index]);
        output.push_str(spliced);
        segment_start = index + c.len_utf8();
    }

    write_single_quoted(output, &value[segment_start..]);
}

fn write_single_quoted(output: &mut String, segment: &str) {
    if !segment.is_empty() {
        output.push('\'');
        output.push_str(segment);
        output.push('\'');
    }
}
